use rf_results::*;

fn temp_root(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("rf_results_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn manifest(run_id: &str, project: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        project_name: project.to_string(),
        timestamp: timestamp.to_string(),
        optimizer: "run_once".to_string(),
        evaluations: 3,
        simulator_launches: 1,
        iterations: 1,
        converged: true,
        message: "done".to_string(),
    }
}

fn best() -> BestCaseRecord {
    BestCaseRecord {
        objective: 42.0,
        infeasibility: 0.0,
        real_variables: vec![NamedValue {
            name: "W1_bhp_1".to_string(),
            value: 120.0,
        }],
        binary_variables: vec![],
        constraints: vec![NamedValue {
            name: "W1_routing".to_string(),
            value: 1.0,
        }],
    }
}

#[test]
fn save_and_load_run() {
    let root = temp_root("save_load");
    let store = RunStore::for_output(&root).unwrap();
    assert!(store.root().ends_with("runs"));

    let m = manifest("abc", "demo", &timestamp_now());
    assert!(!store.has_run("abc"));
    store.save_run(&m, &best()).unwrap();
    assert!(store.has_run("abc"));

    assert_eq!(store.load_manifest("abc").unwrap(), m);
    assert_eq!(store.load_best_case("abc").unwrap(), best());

    store.delete_run("abc").unwrap();
    assert!(!store.has_run("abc"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn missing_run_is_reported() {
    let root = temp_root("missing");
    let store = RunStore::for_output(&root).unwrap();
    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn list_runs_filters_by_project_and_sorts_by_time() {
    let root = temp_root("list");
    let store = RunStore::for_output(&root).unwrap();
    store
        .save_run(&manifest("r2", "demo", "2026-01-02T00:00:00+00:00"), &best())
        .unwrap();
    store
        .save_run(&manifest("r1", "demo", "2026-01-01T00:00:00+00:00"), &best())
        .unwrap();
    store
        .save_run(&manifest("r3", "other", "2026-01-03T00:00:00+00:00"), &best())
        .unwrap();

    let runs = store.list_runs("demo").unwrap();
    let ids: Vec<_> = runs.iter().map(|m| m.run_id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2"]);
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn summary_file_is_truncated_on_create() {
    let root = temp_root("summary");
    let path = root.join("summary.txt");
    let problem = ProblemDescription::default();

    let mut first = SummaryWriter::create(&path, &problem).unwrap();
    for i in 1..=3 {
        first
            .write_row(&SummaryRow {
                iteration: i,
                objective: i as f64,
                ..SummaryRow::default()
            })
            .unwrap();
    }
    drop(first);

    let _second = SummaryWriter::create(&path, &problem).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("#\tOBJ\t\n"));
    assert!(!text.contains("3\t3\t"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn skipped_best_case_keeps_infinite_infeasibility() {
    let root = temp_root("infinite");
    let store = RunStore::for_output(&root).unwrap();
    let mut skipped = best();
    skipped.infeasibility = f64::INFINITY;
    skipped.constraints.clear();

    store.save_run(&manifest("inf", "demo", &timestamp_now()), &skipped).unwrap();
    let loaded = store.load_best_case("inf").unwrap();
    assert!(loaded.infeasibility.is_infinite());
    let _ = std::fs::remove_dir_all(root);
}
