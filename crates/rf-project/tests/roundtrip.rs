use rf_project::schema::*;
use rf_project::{from_yaml_str, load_json, load_yaml, save_json, save_yaml, validate_project};
use std::path::PathBuf;

fn demo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/two_wells.yaml")
}

#[test]
fn demo_project_loads_and_validates() {
    let project = load_yaml(&demo_path()).unwrap();
    assert_eq!(project.version, 1);
    assert_eq!(project.wells.len(), 3);
    assert_eq!(project.pipes.len(), 3);
    assert_eq!(project.model.schedule, vec![90.0, 180.0, 365.0]);
    assert!(matches!(project.objective, ObjectiveDef::Npv { .. }));
    assert!(matches!(
        project.optimizer,
        OptimizerDef::CompassSearch { .. }
    ));
    assert_eq!(project.on_simulator_failure, FailurePolicy::SkipCase);

    let w1 = &project.wells[0];
    assert_eq!(w1.connections[0].target, "flowline_a");
    // Connection bounds default to [0, 1].
    assert_eq!(w1.connections[0].min, 0.0);
    assert_eq!(w1.connections[0].max, 1.0);
    assert_eq!(project.wells[2].kind, WellKindDef::Injection);
}

#[test]
fn defaults_fill_optional_sections() {
    let yaml = r#"
version: 1
name: Defaults
model:
  schedule: [30.0]
objective: { type: cumulative_oil }
simulator: { type: external, folder: run, command: ./simulate }
wells:
  - name: W1
    controls: [{ value: 100.0, min: 50.0, max: 150.0 }]
    connections: [{ target: P1, fraction: 1.0 }]
pipes:
  - name: P1
    outlet: { type: end, pressure: 15.0 }
    calculator: { type: quadratic, oil_coeff: 1.0e-4, gas_coeff: 0.0, water_coeff: 1.0e-4 }
"#;
    let project = from_yaml_str(yaml).unwrap();
    assert_eq!(project.model.coupling, CouplingDef::Coupled);
    assert_eq!(project.model.pressure_mixing, MixingDef::Maximum);
    assert_eq!(project.model.units, rf_core::PressureUnit::Bar);
    assert_eq!(project.model.max_input_rate, 1.0e8);
    assert_eq!(project.wells[0].controls[0].mode, ControlModeDef::Bhp);
    assert_eq!(project.optimizer, OptimizerDef::default());
    assert_eq!(project.output, OutputDef::default());
    assert_eq!(project.on_simulator_failure, FailurePolicy::Abort);
}

#[test]
fn invalid_project_is_rejected_on_load() {
    let yaml = r#"
version: 1
name: Broken
model:
  schedule: [30.0, 60.0]
objective: { type: cumulative_oil }
simulator: { type: proxy, folder: sim, initial_pressure: 200.0, depletion: 0.0 }
wells:
  - name: W1
    controls: [{ value: 100.0, min: 50.0, max: 150.0 }]
    connections: [{ target: P1, fraction: 1.0 }]
pipes:
  - name: P1
    outlet: { type: end, pressure: 15.0 }
    calculator: { type: quadratic, oil_coeff: 1.0e-4, gas_coeff: 0.0, water_coeff: 1.0e-4 }
"#;
    let err = from_yaml_str(yaml).unwrap_err();
    assert!(err.to_string().contains("Validation error"));
}

#[test]
fn roundtrip_yaml_and_json() {
    let project = load_yaml(&demo_path()).unwrap();
    validate_project(&project).unwrap();

    let dir = std::env::temp_dir();
    let yaml_path = dir.join("rf_project_roundtrip.yaml");
    save_yaml(&yaml_path, &project).unwrap();
    assert_eq!(load_yaml(&yaml_path).unwrap(), project);

    let json_path = dir.join("rf_project_roundtrip.json");
    save_json(&json_path, &project).unwrap();
    assert_eq!(load_json(&json_path).unwrap(), project);
}

#[test]
fn format_follows_extension() {
    use rf_project::Format;
    assert_eq!(Format::from_path(std::path::Path::new("a/b.json")), Format::Json);
    assert_eq!(Format::from_path(std::path::Path::new("a/b.yaml")), Format::Yaml);
    assert_eq!(Format::from_path(std::path::Path::new("driver")), Format::Yaml);

    let project = load_yaml(&demo_path()).unwrap();
    let json = rf_project::render(&project, Format::Json).unwrap();
    assert_eq!(rf_project::parse(&json, Format::Json).unwrap(), project);
}
