//! Integration tests for rf-model: routing, propagation, pressures and
//! constraints on small networks.

use proptest::prelude::*;
use rf_components::{
    BinaryVariable, Component, ConstraintKind, Pipe, PipeConnection, PipeOutlet, QuadraticDrop,
    RealVariable, Separator, Stream, VarRole, Well, WellKind,
};
use rf_model::{Coupling, Model, ModelError, ObjectiveKind};

fn connection(model: &mut Model, owner_name: &str, target: &str, fraction: f64) -> PipeConnection {
    let owner = model.next_component_id();
    let var = model
        .variables_mut()
        .unwrap()
        .add_real(
            RealVariable::new(
                format!("{owner_name}_{target}"),
                fraction,
                0.0,
                1.0,
                VarRole::Routing,
            )
            .owned_by(owner),
        );
    PipeConnection {
        target: target.to_string(),
        fraction: var,
    }
}

fn add_well(model: &mut Model, name: &str, targets: &[(&str, f64)]) {
    let mut well = Well::new(name, WellKind::Production);
    for (target, f) in targets {
        let conn = connection(model, name, target, *f);
        well.connections.push(conn);
    }
    model.add_component(Component::Well(well)).unwrap();
}

fn add_mid_pipe(model: &mut Model, name: &str, targets: &[(&str, f64)], oil_coeff: f64) {
    let conns = targets
        .iter()
        .map(|(t, f)| connection(model, name, t, *f))
        .collect();
    model
        .add_component(Component::Pipe(Pipe::new(
            name,
            PipeOutlet::Routed(conns),
            Box::new(QuadraticDrop::new(oil_coeff, 0.0, 0.0)),
        )))
        .unwrap();
}

fn add_end_pipe(model: &mut Model, name: &str, pressure: f64, oil_coeff: f64) {
    model
        .add_component(Component::Pipe(Pipe::new(
            name,
            PipeOutlet::Boundary { pressure },
            Box::new(QuadraticDrop::new(oil_coeff, 0.0, 0.0)),
        )))
        .unwrap();
}

fn well_streams(model: &Model, oil: f64, bhp: f64) -> Vec<Stream> {
    model
        .schedule()
        .iter()
        .map(|t| Stream::new(*t, oil, oil * 100.0, oil * 0.5, bhp))
        .collect()
}

#[test]
fn split_well_fractions_and_routing_constraint() {
    let mut model = Model::new(
        "split",
        Coupling::Coupled,
        vec![30.0],
        ObjectiveKind::CumulativeOil,
    );
    add_well(&mut model, "W1", &[("P1", 0.7), ("P2", 0.3)]);
    add_end_pipe(&mut model, "P1", 10.0, 0.0);
    add_end_pipe(&mut model, "P2", 10.0, 0.0);
    model.initialize().unwrap();

    assert!((model.flow_fraction_by_name("W1", "P1").unwrap() - 0.7).abs() < 1e-12);
    assert!((model.flow_fraction_by_name("W1", "P2").unwrap() - 0.3).abs() < 1e-12);

    let w1 = model.component_by_name("W1").unwrap();
    let streams = well_streams(&model, 100.0, 50.0);
    model.set_well_streams(w1, streams).unwrap();
    assert!(model.evaluate_network().unwrap());

    let routing = model
        .constraints()
        .iter()
        .find(|c| c.kind == ConstraintKind::WellRouting)
        .unwrap();
    assert!((routing.value - 1.0).abs() < 1e-12);

    let p1 = model.component_by_name("P1").unwrap();
    let p1_stream = model.component(p1).unwrap().streams()[0];
    assert!((p1_stream.oil_rate - 70.0).abs() < 1e-9);
}

#[test]
fn fractions_compose_through_mid_pipes() {
    let mut model = Model::new(
        "chain",
        Coupling::Coupled,
        vec![30.0],
        ObjectiveKind::CumulativeOil,
    );
    add_well(&mut model, "W", &[("A", 0.6), ("C", 0.4)]);
    add_mid_pipe(&mut model, "A", &[("B", 1.0)], 0.0);
    add_end_pipe(&mut model, "B", 10.0, 0.0);
    add_end_pipe(&mut model, "C", 10.0, 0.0);
    model.initialize().unwrap();

    let a_to_b = model.flow_fraction_by_name("A", "B").unwrap();
    let w_to_b = model.flow_fraction_by_name("W", "B").unwrap();
    assert!((w_to_b - 0.6 * a_to_b).abs() < 1e-12);
    assert_eq!(model.flow_fraction_by_name("C", "B").unwrap(), 0.0);
}

#[test]
fn pressures_propagate_upstream_from_boundary() {
    let mut model = Model::new(
        "pressure",
        Coupling::Coupled,
        vec![30.0, 60.0],
        ObjectiveKind::CumulativeOil,
    );
    add_well(&mut model, "W1", &[("P1", 1.0)]);
    add_mid_pipe(&mut model, "P1", &[("P2", 1.0)], 1e-3);
    add_end_pipe(&mut model, "P2", 20.0, 1e-3);
    model.initialize().unwrap();

    let w1 = model.component_by_name("W1").unwrap();
    let streams = well_streams(&model, 100.0, 100.0);
    model.set_well_streams(w1, streams).unwrap();
    assert!(model.evaluate_network().unwrap());

    let p1 = model.component_by_name("P1").unwrap();
    let p2 = model.component_by_name("P2").unwrap();
    assert!((model.component(p2).unwrap().streams()[0].pressure - 30.0).abs() < 1e-9);
    assert!((model.component(p1).unwrap().streams()[1].pressure - 40.0).abs() < 1e-9);

    let bhp: Vec<f64> = model
        .constraints()
        .iter()
        .filter(|c| c.kind == ConstraintKind::BottomholePressure)
        .map(|c| c.value)
        .collect();
    assert_eq!(bhp.len(), 2);
    assert!(bhp.iter().all(|v| (v - 0.6).abs() < 1e-9));

    // 100 Sm3/day over 60 days
    assert!((model.objective_value() - 6000.0).abs() < 1e-9);
}

#[test]
fn low_bhp_is_a_violation_not_an_error() {
    let mut model = Model::new("low", Coupling::Coupled, vec![30.0], ObjectiveKind::CumulativeOil);
    add_well(&mut model, "W1", &[("P1", 1.0)]);
    add_end_pipe(&mut model, "P1", 20.0, 1e-3);
    model.initialize().unwrap();

    let w1 = model.component_by_name("W1").unwrap();
    let streams = well_streams(&model, 100.0, 15.0);
    model.set_well_streams(w1, streams).unwrap();
    assert!(!model.evaluate_network().unwrap());
    assert!(model.infeasibility() > 0.0);
}

#[test]
fn separator_removes_water_before_outlet() {
    let mut model = Model::new("sep", Coupling::Coupled, vec![30.0], ObjectiveKind::CumulativeOil);
    add_well(&mut model, "W1", &[("SEP", 1.0)]);
    let vars = model.variables_mut().unwrap();
    let install = vars.add_binary(BinaryVariable::new("SEP_install", 1.0, VarRole::Install));
    let removal = vars.add_real(RealVariable::new(
        "SEP_removal",
        1.0,
        0.0,
        1.0,
        VarRole::SeparatorRemoval,
    ));
    model
        .add_component(Component::Separator(Separator::new(
            "SEP", "P1", install, removal, 20.0,
        )))
        .unwrap();
    add_end_pipe(&mut model, "P1", 20.0, 1e-3);
    model.initialize().unwrap();

    let w1 = model.component_by_name("W1").unwrap();
    let streams = well_streams(&model, 100.0, 80.0);
    model.set_well_streams(w1, streams).unwrap();
    model.evaluate_network().unwrap();

    let sep = model.component_by_name("SEP").unwrap();
    let p1 = model.component_by_name("P1").unwrap();
    let sep_stream = model.component(sep).unwrap().streams()[0];
    let p1_stream = model.component(p1).unwrap().streams()[0];
    assert!((sep_stream.water_rate - 50.0).abs() < 1e-9);
    assert!((p1_stream.water_rate - 30.0).abs() < 1e-9);
    assert!((sep_stream.pressure - p1_stream.pressure).abs() < 1e-12);
}

#[test]
fn wells_without_streams_are_a_mismatch() {
    let mut model = Model::new("m", Coupling::Coupled, vec![30.0], ObjectiveKind::CumulativeOil);
    add_well(&mut model, "W1", &[("P1", 1.0)]);
    add_end_pipe(&mut model, "P1", 20.0, 0.0);
    model.initialize().unwrap();
    assert!(matches!(
        model.evaluate_network(),
        Err(ModelError::TimeStepMismatch { .. })
    ));
}

#[test]
fn decoupled_material_balance() {
    let mut model = Model::new(
        "decoupled",
        Coupling::Decoupled,
        vec![30.0],
        ObjectiveKind::CumulativeOil,
    );
    add_well(&mut model, "W1", &[("P1", 1.0)]);
    add_end_pipe(&mut model, "P1", 20.0, 0.0);
    model.initialize().unwrap();

    let w1 = model.component_by_name("W1").unwrap();
    let streams = well_streams(&model, 100.0, 80.0);
    model.set_well_streams(w1, streams).unwrap();

    let point = model.input_points()[0].clone();
    let [qo, qg, qw] = point.rates[0];
    model.set_real_variable_value(qo.index(), 100.0).unwrap();
    model.set_real_variable_value(qg.index(), 10_000.0).unwrap();
    model.set_real_variable_value(qw.index(), 50.0).unwrap();
    assert!(model.evaluate_network().unwrap());
    for con in point.balance[0] {
        assert!(model.variables().constraint(con).value.abs() < 1e-9);
    }

    model.set_real_variable_value(qo.index(), 90.0).unwrap();
    assert!(!model.evaluate_network().unwrap());
    let oil_balance = model.variables().constraint(point.balance[0][0]).value;
    assert!((oil_balance + 10.0).abs() < 1e-9);
}

fn input_point(model: &Model, name: &str) -> rf_model::InputPoint {
    let id = model.component_by_name(name).unwrap();
    model
        .input_points()
        .iter()
        .find(|p| p.node == id)
        .cloned()
        .unwrap()
}

fn declare(model: &mut Model, point: &rf_model::InputPoint, rates: [f64; 3]) {
    for (var, q) in point.rates[0].iter().zip(rates) {
        model.set_real_variable_value(var.index(), q).unwrap();
    }
}

fn balance(model: &Model, point: &rf_model::InputPoint) -> [f64; 3] {
    point.balance[0].map(|con| model.variables().constraint(con).value)
}

#[test]
fn material_balance_counts_well_streams_through_mid_pipes() {
    let mut model = Model::new(
        "chain",
        Coupling::Decoupled,
        vec![30.0],
        ObjectiveKind::CumulativeOil,
    );
    add_well(&mut model, "W", &[("A", 1.0)]);
    add_mid_pipe(&mut model, "A", &[("B", 1.0)], 0.0);
    add_end_pipe(&mut model, "B", 20.0, 0.0);
    model.initialize().unwrap();

    let w = model.component_by_name("W").unwrap();
    let streams = well_streams(&model, 100.0, 80.0);
    model.set_well_streams(w, streams).unwrap();

    // B balances against the well stream itself, whatever A declares.
    let a = input_point(&model, "A");
    let b = input_point(&model, "B");
    declare(&mut model, &a, [0.0, 0.0, 0.0]);
    declare(&mut model, &b, [100.0, 10_000.0, 50.0]);
    model.evaluate_network().unwrap();

    assert_eq!(model.flow_fraction_by_name("W", "B").unwrap(), 1.0);
    for value in balance(&model, &b) {
        assert!(value.abs() < 1e-9);
    }
    let [oil_a, gas_a, water_a] = balance(&model, &a);
    assert!((oil_a + 100.0).abs() < 1e-9);
    assert!((gas_a + 10_000.0).abs() < 1e-9);
    assert!((water_a + 50.0).abs() < 1e-9);
}

#[test]
fn material_balance_scales_by_composed_fraction() {
    let mut model = Model::new(
        "split chain",
        Coupling::Decoupled,
        vec![30.0],
        ObjectiveKind::CumulativeOil,
    );
    add_well(&mut model, "W", &[("A", 0.6), ("C", 0.4)]);
    add_mid_pipe(&mut model, "A", &[("B", 0.5), ("C", 0.5)], 0.0);
    add_end_pipe(&mut model, "B", 20.0, 0.0);
    add_end_pipe(&mut model, "C", 20.0, 0.0);
    model.initialize().unwrap();

    let w = model.component_by_name("W").unwrap();
    let streams = well_streams(&model, 100.0, 80.0);
    model.set_well_streams(w, streams).unwrap();

    let b = input_point(&model, "B");
    let c = input_point(&model, "C");
    // flowFraction(W, B) = 0.3, flowFraction(W, C) = 0.4 + 0.6 * 0.5 = 0.7
    declare(&mut model, &b, [30.0, 3_000.0, 15.0]);
    declare(&mut model, &c, [70.0, 7_000.0, 15.0]);
    model.evaluate_network().unwrap();

    for value in balance(&model, &b) {
        assert!(value.abs() < 1e-9);
    }
    let [oil_c, _, water_c] = balance(&model, &c);
    assert!(oil_c.abs() < 1e-9);
    assert!((water_c - (15.0 - 35.0)).abs() < 1e-9);
}

#[test]
fn material_balance_applies_separator_water_removal() {
    let mut model = Model::new(
        "decoupled sep",
        Coupling::Decoupled,
        vec![30.0],
        ObjectiveKind::CumulativeOil,
    );
    add_well(&mut model, "W1", &[("SEP", 1.0)]);
    let vars = model.variables_mut().unwrap();
    let install = vars.add_binary(BinaryVariable::new("SEP_install", 1.0, VarRole::Install));
    let removal = vars.add_real(RealVariable::new(
        "SEP_removal",
        1.0,
        0.0,
        1.0,
        VarRole::SeparatorRemoval,
    ));
    model
        .add_component(Component::Separator(Separator::new(
            "SEP", "P1", install, removal, 20.0,
        )))
        .unwrap();
    add_end_pipe(&mut model, "P1", 20.0, 0.0);
    model.initialize().unwrap();

    let w1 = model.component_by_name("W1").unwrap();
    let streams = well_streams(&model, 100.0, 80.0);
    model.set_well_streams(w1, streams).unwrap();

    let sep = input_point(&model, "SEP");
    let p1 = input_point(&model, "P1");
    declare(&mut model, &sep, [100.0, 10_000.0, 50.0]);
    // 20 of the 50 water is removed, capped by the separator capacity.
    declare(&mut model, &p1, [100.0, 10_000.0, 30.0]);
    model.evaluate_network().unwrap();

    for value in balance(&model, &sep).into_iter().chain(balance(&model, &p1)) {
        assert!(value.abs() < 1e-9);
    }
}

#[test]
fn changing_a_variable_marks_model_stale() {
    let mut model = Model::new("m", Coupling::Coupled, vec![30.0], ObjectiveKind::CumulativeOil);
    add_well(&mut model, "W1", &[("P1", 1.0)]);
    add_end_pipe(&mut model, "P1", 20.0, 0.0);
    model.initialize().unwrap();
    assert!(!model.is_up_to_date());

    model.set_up_to_date(true);
    model.set_real_variable_value(0, 1.0).unwrap();
    assert!(model.is_up_to_date(), "unchanged value keeps the model fresh");
    model.set_real_variable_value(0, 0.5).unwrap();
    assert!(!model.is_up_to_date());

    assert!(matches!(
        model.set_real_variable_value(99, 0.5),
        Err(ModelError::IndexOob { .. })
    ));
}

proptest! {
    #[test]
    fn flow_fraction_is_product_along_chain(f1 in 0.0f64..=1.0, f2 in 0.0f64..=1.0) {
        let mut model = Model::new("p", Coupling::Coupled, vec![1.0], ObjectiveKind::CumulativeOil);
        add_well(&mut model, "W", &[("A", f1), ("C", 1.0 - f1)]);
        add_mid_pipe(&mut model, "A", &[("B", f2), ("C", 1.0 - f2)], 0.0);
        add_end_pipe(&mut model, "B", 10.0, 0.0);
        add_end_pipe(&mut model, "C", 10.0, 0.0);
        model.initialize().unwrap();

        let w_b = model.flow_fraction_by_name("W", "B").unwrap();
        prop_assert!((w_b - f1 * f2).abs() < 1e-12);
        let w_c = model.flow_fraction_by_name("W", "C").unwrap();
        prop_assert!((w_b + w_c - 1.0).abs() < 1e-12);
    }
}
