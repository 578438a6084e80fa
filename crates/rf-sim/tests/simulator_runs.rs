use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rf_components::{
    Component, ControlMode, Pipe, PipeConnection, PipeOutlet, QuadraticDrop, RealVariable, VarRole,
    Well, WellControl, WellKind,
};
use rf_model::{Coupling, Model, ObjectiveKind};
use rf_sim::{ExternalSimulator, ProxySimulator, ReservoirSimulator, SimError};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn one_well_model() -> Model {
    let mut model = Model::new(
        "sim",
        Coupling::Coupled,
        vec![30.0, 60.0],
        ObjectiveKind::CumulativeOil,
    );
    let id = model.next_component_id();
    let vars = model.variables_mut().unwrap();
    let bhp = vars.add_real(
        RealVariable::new("W1_bhp", 150.0, 50.0, 250.0, VarRole::WellControl).owned_by(id),
    );
    let frac =
        vars.add_real(RealVariable::new("W1_P1", 1.0, 0.0, 1.0, VarRole::Routing).owned_by(id));

    let mut well = Well::new("W1", WellKind::Production);
    well.controls.push(WellControl {
        end_time: 60.0,
        mode: ControlMode::Bhp,
        var: bhp,
    });
    well.connections.push(PipeConnection {
        target: "P1".into(),
        fraction: frac,
    });
    model.add_component(Component::Well(well)).unwrap();
    model
        .add_component(Component::Pipe(Pipe::new(
            "P1",
            PipeOutlet::Boundary { pressure: 20.0 },
            Box::new(QuadraticDrop::new(1e-4, 0.0, 0.0)),
        )))
        .unwrap();
    model.initialize().unwrap();
    model
}

#[test]
fn proxy_run_fills_well_streams() {
    let folder = unique_temp_dir("rf_sim_proxy");
    let mut model = one_well_model();
    let mut sim = ProxySimulator::new(&folder, 200.0, 0.0);
    sim.run(&mut model).unwrap();
    assert_eq!(sim.launches(), 1);
    assert!(folder.join("proxy_input.json").exists());

    let (_, well) = model.wells().next().unwrap();
    assert_eq!(well.streams().len(), 2);
    assert!((well.streams()[0].liquid_rate() - 500.0).abs() < 1e-9);

    assert!(model.evaluate_network().unwrap());
    let _ = std::fs::remove_dir_all(&folder);
}

#[cfg(unix)]
#[test]
fn external_run_reads_streams_back() {
    let folder = unique_temp_dir("rf_sim_external");
    let mut model = one_well_model();
    let script = r#"test -f well_controls.json && cat > well_streams.json <<'JSON'
{"wells":[{"name":"W1","streams":[
 {"time":30.0,"oil_rate":100.0,"gas_rate":1000.0,"water_rate":10.0,"pressure":90.0},
 {"time":60.0,"oil_rate":90.0,"gas_rate":900.0,"water_rate":12.0,"pressure":85.0}]}]}
JSON"#;
    let mut sim = ExternalSimulator::new(&folder, "sh", vec!["-c".into(), script.into()])
        .with_timeout(Duration::from_secs(10));
    sim.run(&mut model).unwrap();
    assert_eq!(sim.launches(), 1);

    let (_, well) = model.wells().next().unwrap();
    assert_eq!(well.streams()[1].oil_rate, 90.0);
    let _ = std::fs::remove_dir_all(&folder);
}

#[cfg(unix)]
#[test]
fn external_failures_are_recoverable() {
    let folder = unique_temp_dir("rf_sim_fail");
    let model = one_well_model();

    let mut failing = ExternalSimulator::new(&folder, "sh", vec!["-c".into(), "exit 3".into()]);
    failing.generate_input_files(&model).unwrap();
    let err = failing.launch_simulator().unwrap_err();
    assert!(matches!(err, SimError::ExitStatus { code: Some(3), .. }));
    assert!(err.is_recoverable());

    let mut slow = ExternalSimulator::new(&folder, "sh", vec!["-c".into(), "sleep 5".into()])
        .with_timeout(Duration::from_millis(100));
    let err = slow.launch_simulator().unwrap_err();
    assert!(matches!(err, SimError::Timeout { .. }));
    assert!(err.is_recoverable());
    assert_eq!(slow.launches(), 0);
    let _ = std::fs::remove_dir_all(&folder);
}

#[test]
fn missing_output_is_fatal() {
    let folder = unique_temp_dir("rf_sim_missing");
    let mut model = one_well_model();
    let mut sim = ExternalSimulator::new(&folder, "true", Vec::new());
    sim.generate_input_files(&model).unwrap();
    let err = sim.read_output(&mut model).unwrap_err();
    assert!(matches!(err, SimError::Io { .. }));
    assert!(!err.is_recoverable());
    let _ = std::fs::remove_dir_all(&folder);
}
