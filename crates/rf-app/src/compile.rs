//! Project → model, simulator and optimizer compilation.

use std::path::Path;
use std::time::Duration;

use rf_components::{
    BinaryVariable, Capacity, CapacityLimit, Component, ControlMode, DarcyWeisbachDrop,
    GasLiftControl, Phase, Pipe, PipeConnection, PipeOutlet, PressureBooster,
    PressureDropCalculator, PressureMixing, QuadraticDrop, RealVariable, Separator, VarRole,
    VariableStore, Well, WellControl, WellKind,
};
use rf_core::units::{kg_per_m3, m, pa_s};
use rf_core::{ComponentId, PressureUnit};
use rf_model::{Coupling, Model, ObjectiveKind};
use rf_opt::{
    CompassSearchOptimizer, CompassSettings, FiniteDifference, Optimizer, RunOnceOptimizer,
};
use rf_project::schema::{
    BoosterDef, CalculatorDef, CapacityDef, ConnectionDef, ControlModeDef, CouplingDef, MixingDef,
    ObjectiveDef, OptimizerDef, PipeDef, PipeOutletDef, Project, ReservoirParamsDef, SeparatorDef,
    SimulatorDef, WellDef, WellKindDef,
};
use rf_sim::{ExternalSimulator, ProxySimulator, ProxyWellParams, ReservoirSimulator};
use tracing::info;

use crate::error::AppResult;

/// Everything a run needs, built from one project.
pub struct CompiledProject {
    pub model: Model,
    pub simulator: Box<dyn ReservoirSimulator>,
    pub optimizer: Box<dyn Optimizer>,
}

/// Compile `project`; relative folders resolve against `base_dir`.
pub fn compile_project(project: &Project, base_dir: &Path) -> AppResult<CompiledProject> {
    let model = build_model(project)?;
    let simulator = build_simulator(project, base_dir);
    let optimizer = build_optimizer(&project.optimizer);
    info!(
        model = %model.name(),
        components = model.components().len(),
        simulator = %simulator.name(),
        optimizer = %optimizer.name(),
        "Compiled project"
    );
    Ok(CompiledProject {
        model,
        simulator,
        optimizer,
    })
}

/// Build an unresolved model: components, variables and capacities.
pub fn build_model(project: &Project) -> AppResult<Model> {
    let def = &project.model;
    let coupling = match def.coupling {
        CouplingDef::Coupled => Coupling::Coupled,
        CouplingDef::Decoupled => Coupling::Decoupled,
    };
    let mixing = match def.pressure_mixing {
        MixingDef::Maximum => PressureMixing::Maximum,
        MixingDef::Minimum => PressureMixing::Minimum,
        MixingDef::FlowWeighted => PressureMixing::FlowWeighted,
    };

    let mut model = Model::new(
        &project.name,
        coupling,
        def.schedule.clone(),
        objective_kind(&project.objective),
    )
    .with_mixing(mixing)
    .with_max_input_rate(def.max_input_rate);

    let unit = def.units;
    for well in &project.wells {
        add_well(&mut model, well, unit)?;
    }
    for pipe in &project.pipes {
        add_pipe(&mut model, pipe, unit)?;
    }
    for sep in &project.separators {
        add_separator(&mut model, sep)?;
    }
    for booster in &project.boosters {
        add_booster(&mut model, booster, unit)?;
    }
    for cap in &project.capacities {
        model.add_capacity(capacity(cap))?;
    }
    Ok(model)
}

fn objective_kind(def: &ObjectiveDef) -> ObjectiveKind {
    match def {
        ObjectiveDef::CumulativeOil => ObjectiveKind::CumulativeOil,
        ObjectiveDef::CumulativeGas => ObjectiveKind::CumulativeGas,
        ObjectiveDef::CumulativeWater => ObjectiveKind::CumulativeWater,
        ObjectiveDef::Npv {
            oil_price,
            gas_price,
            water_cost,
            discount_rate,
        } => ObjectiveKind::Npv {
            oil_price: *oil_price,
            gas_price: *gas_price,
            water_cost: *water_cost,
            discount_rate: *discount_rate,
        },
    }
}

fn control_mode(def: ControlModeDef) -> ControlMode {
    match def {
        ControlModeDef::Bhp => ControlMode::Bhp,
        ControlModeDef::OilRate => ControlMode::OilRate,
        ControlModeDef::GasRate => ControlMode::GasRate,
        ControlModeDef::WaterRate => ControlMode::WaterRate,
        ControlModeDef::LiquidRate => ControlMode::LiquidRate,
    }
}

fn routing_connections(
    vars: &mut VariableStore,
    owner: ComponentId,
    owner_name: &str,
    defs: &[ConnectionDef],
) -> Vec<PipeConnection> {
    defs.iter()
        .map(|c| {
            let fraction = vars.add_real(
                RealVariable::new(
                    format!("{owner_name}_to_{}", c.target),
                    c.fraction,
                    c.min,
                    c.max,
                    VarRole::Routing,
                )
                .owned_by(owner),
            );
            PipeConnection {
                target: c.target.clone(),
                fraction,
            }
        })
        .collect()
}

fn add_well(model: &mut Model, def: &WellDef, unit: PressureUnit) -> AppResult<ComponentId> {
    let id = model.next_component_id();
    let schedule = model.schedule().to_vec();
    let kind = match def.kind {
        WellKindDef::Production => WellKind::Production,
        WellKindDef::Injection => WellKind::Injection,
    };
    let mut well = Well::new(&def.name, kind);

    let vars = model.variables_mut()?;
    for (k, (control, end_time)) in def.controls.iter().zip(&schedule).enumerate() {
        let mode = control_mode(control.mode);
        // Only pressure targets carry a unit.
        let scale = |v: f64| match mode {
            ControlMode::Bhp => unit.to_bar(v),
            _ => v,
        };
        let var = vars.add_real(
            RealVariable::new(
                format!("{}_{}_{}", def.name, mode_label(mode), k + 1),
                scale(control.value),
                scale(control.min),
                scale(control.max),
                VarRole::WellControl,
            )
            .owned_by(id),
        );
        well.controls.push(WellControl {
            end_time: *end_time,
            mode,
            var,
        });
    }

    for (k, (gl, end_time)) in def.gas_lift.iter().zip(&schedule).enumerate() {
        let var = vars.add_real(
            RealVariable::new(
                format!("{}_gaslift_{}", def.name, k + 1),
                gl.value,
                gl.min,
                gl.max,
                VarRole::GasLift,
            )
            .owned_by(id),
        );
        well.gas_lift.push(GasLiftControl {
            end_time: *end_time,
            var,
        });
    }

    well.connections = routing_connections(vars, id, &def.name, &def.connections);
    Ok(model.add_component(Component::Well(well))?)
}

fn mode_label(mode: ControlMode) -> &'static str {
    match mode {
        ControlMode::Bhp => "bhp",
        ControlMode::OilRate => "qo",
        ControlMode::GasRate => "qg",
        ControlMode::WaterRate => "qw",
        ControlMode::LiquidRate => "ql",
    }
}

fn calculator(def: &CalculatorDef) -> Box<dyn PressureDropCalculator> {
    match def {
        CalculatorDef::Quadratic {
            oil_coeff,
            gas_coeff,
            water_coeff,
        } => Box::new(QuadraticDrop::new(*oil_coeff, *gas_coeff, *water_coeff)),
        CalculatorDef::DarcyWeisbach {
            length,
            diameter,
            roughness,
            elevation,
            density,
            viscosity,
            gas_volume_factor,
        } => Box::new(DarcyWeisbachDrop {
            length: m(*length),
            diameter: m(*diameter),
            roughness: m(*roughness),
            elevation: m(*elevation),
            density: kg_per_m3(*density),
            viscosity: pa_s(*viscosity),
            gas_volume_factor: *gas_volume_factor,
        }),
    }
}

fn add_pipe(model: &mut Model, def: &PipeDef, unit: PressureUnit) -> AppResult<ComponentId> {
    let id = model.next_component_id();
    let outlet = match &def.outlet {
        PipeOutletDef::End { pressure } => PipeOutlet::Boundary {
            pressure: unit.to_bar(*pressure),
        },
        PipeOutletDef::Mid { connections } => {
            let vars = model.variables_mut()?;
            PipeOutlet::Routed(routing_connections(vars, id, &def.name, connections))
        }
    };
    let pipe = Pipe::new(&def.name, outlet, calculator(&def.calculator));
    Ok(model.add_component(Component::Pipe(pipe))?)
}

fn add_separator(model: &mut Model, def: &SeparatorDef) -> AppResult<ComponentId> {
    let id = model.next_component_id();
    let vars = model.variables_mut()?;
    let install = vars.add_binary(
        BinaryVariable::new(
            format!("{}_install", def.name),
            if def.installed { 1.0 } else { 0.0 },
            VarRole::Install,
        )
        .owned_by(id),
    );
    let r = def.removal_fraction;
    let removal = vars.add_real(
        RealVariable::new(
            format!("{}_water_removal", def.name),
            r.value,
            r.min,
            r.max,
            VarRole::SeparatorRemoval,
        )
        .owned_by(id),
    );
    let sep = Separator::new(
        &def.name,
        &def.outlet,
        install,
        removal,
        def.removal_capacity,
    );
    Ok(model.add_component(Component::Separator(sep))?)
}

fn add_booster(model: &mut Model, def: &BoosterDef, unit: PressureUnit) -> AppResult<ComponentId> {
    let id = model.next_component_id();
    let vars = model.variables_mut()?;
    let install = vars.add_binary(
        BinaryVariable::new(
            format!("{}_install", def.name),
            if def.installed { 1.0 } else { 0.0 },
            VarRole::Install,
        )
        .owned_by(id),
    );
    let c = def.capacity;
    let capacity = vars.add_real(
        RealVariable::new(
            format!("{}_capacity", def.name),
            c.value,
            c.min,
            c.max,
            VarRole::BoosterCapacity,
        )
        .owned_by(id),
    );
    let b = def.boost;
    let boost = vars.add_real(
        RealVariable::new(
            format!("{}_boost", def.name),
            unit.to_bar(b.value),
            unit.to_bar(b.min),
            unit.to_bar(b.max),
            VarRole::BoostPressure,
        )
        .owned_by(id),
    );
    let booster = PressureBooster::new(&def.name, &def.outlet, install, capacity, boost);
    Ok(model.add_component(Component::Booster(booster))?)
}

fn capacity(def: &CapacityDef) -> Capacity {
    let mut cap = Capacity::new(&def.name, def.feeds.clone());
    for (phase, max) in [
        (Phase::Oil, def.max_oil),
        (Phase::Gas, def.max_gas),
        (Phase::Water, def.max_water),
        (Phase::Liquid, def.max_liquid),
    ] {
        if let Some(max) = max {
            cap.limits.push(CapacityLimit {
                phase,
                max,
                constraints: Vec::new(),
            });
        }
    }
    cap
}

fn proxy_params(base: &ProxyWellParams, def: &ReservoirParamsDef) -> ProxyWellParams {
    ProxyWellParams {
        productivity_index: def.productivity_index.unwrap_or(base.productivity_index),
        gas_oil_ratio: def.gas_oil_ratio.unwrap_or(base.gas_oil_ratio),
        water_cut: def.water_cut.unwrap_or(base.water_cut),
        lift_gain: def.lift_gain.unwrap_or(base.lift_gain),
    }
}

pub fn build_simulator(project: &Project, base_dir: &Path) -> Box<dyn ReservoirSimulator> {
    let unit = project.model.units;
    match &project.simulator {
        SimulatorDef::Proxy {
            folder,
            initial_pressure,
            depletion,
            min_bhp,
            defaults,
        } => {
            let defaults = proxy_params(&ProxyWellParams::default(), defaults);
            let mut sim = ProxySimulator::new(
                base_dir.join(folder),
                unit.to_bar(*initial_pressure),
                unit.to_bar(*depletion),
            )
            .with_defaults(defaults.clone());
            if let Some(p) = min_bhp {
                sim = sim.with_min_bhp(unit.to_bar(*p));
            }
            for well in &project.wells {
                if let Some(params) = &well.reservoir {
                    sim = sim.with_well(&well.name, proxy_params(&defaults, params));
                }
            }
            Box::new(sim)
        }
        SimulatorDef::External {
            folder,
            command,
            args,
            timeout_s,
        } => {
            let mut sim = ExternalSimulator::new(base_dir.join(folder), command, args.clone());
            if let Some(t) = timeout_s {
                sim = sim.with_timeout(Duration::from_secs_f64(*t));
            }
            Box::new(sim)
        }
    }
}

pub fn build_optimizer(def: &OptimizerDef) -> Box<dyn Optimizer> {
    match def {
        OptimizerDef::RunOnce { sensitivities } => {
            let mut opt = RunOnceOptimizer::new();
            if let Some(s) = sensitivities {
                let scheme = match s.scheme {
                    rf_project::DifferenceScheme::Forward => {
                        FiniteDifference::Forward { step: s.step }
                    }
                    rf_project::DifferenceScheme::Central => {
                        FiniteDifference::Central { step: s.step }
                    }
                };
                opt = opt.with_sensitivities(scheme);
            }
            Box::new(opt)
        }
        OptimizerDef::CompassSearch { settings } => {
            let d = CompassSettings::default();
            Box::new(CompassSearchOptimizer::new(CompassSettings {
                initial_step: settings.initial_step.unwrap_or(d.initial_step),
                min_step: settings.min_step.unwrap_or(d.min_step),
                contraction: settings.contraction.unwrap_or(d.contraction),
                max_iterations: settings.max_iterations.unwrap_or(d.max_iterations),
                penalty: settings.penalty.unwrap_or(d.penalty),
            }))
        }
    }
}
