//! Integration tests for rf-components: a well feeding a boosted pipe.

use rf_components::{
    BinaryVariable, Component, Constraint, ConstraintKind, Pipe, PipeConnection, PipeOutlet,
    PressureBooster, QuadraticDrop, RealVariable, Stream, VarRole, VariableStore, Well, WellKind,
};

#[test]
fn well_against_boosted_end_pipe() {
    let mut store = VariableStore::new();

    let frac = store.add_real(RealVariable::new("W1_P1", 1.0, 0.0, 1.0, VarRole::Routing));
    let mut well = Well::new("W1", WellKind::Production);
    well.connections.push(PipeConnection {
        target: "P1".into(),
        fraction: frac,
    });
    let bhp = store.add_constraint(Constraint::new(
        "W1_bhp_0",
        0.0,
        1.0,
        ConstraintKind::BottomholePressure,
    ));
    well.bhp_constraints.push(bhp);
    well.set_streams(vec![Stream::new(30.0, 500.0, 50_000.0, 100.0, 60.0)]);

    let mut pipe = Pipe::new(
        "P1",
        PipeOutlet::Boundary { pressure: 20.0 },
        Box::new(QuadraticDrop::new(1e-4, 1e-9, 1e-4)),
    );
    pipe.set_streams(well.streams().to_vec());
    pipe.calculate_inlet_pressures(&[20.0]).unwrap();
    let p_in = pipe.streams()[0].pressure;
    assert!(p_in > 20.0);

    let install = store.add_binary(BinaryVariable::new("B_install", 1.0, VarRole::Install));
    let cap = store.add_real(RealVariable::new(
        "B_cap",
        1000.0,
        0.0,
        2000.0,
        VarRole::BoosterCapacity,
    ));
    let boost = store.add_real(RealVariable::new("B_dp", 10.0, 0.0, 30.0, VarRole::BoostPressure));
    let booster = PressureBooster::new("B", "P1", install, cap, boost);
    let boosted = booster.inlet_pressure(p_in, &store);
    assert!((p_in - boosted - 10.0).abs() < 1e-12);

    let mut boosted_streams = pipe.streams().to_vec();
    boosted_streams[0].pressure = boosted;
    let worst = well
        .update_bhp_constraints(&mut store, "B", &boosted_streams)
        .unwrap();
    assert!(worst > 0.0, "boosted pipe should sit below the well's BHP");
    assert!(store.constraint(bhp).is_satisfied(1e-9));
    assert_eq!(store.infeasibility(), 0.0);

    let component = Component::Well(well);
    assert_eq!(component.outlets()[0].target, "P1");
}
