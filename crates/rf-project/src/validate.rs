//! Project validation logic.

use crate::schema::{
    BoundedValue, ConnectionDef, OptimizerDef, PipeOutletDef, Project, SimulatorDef, WellDef,
    WellKindDef,
};
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

// False for NaN.
fn is_positive(v: f64) -> bool {
    v > 0.0
}

fn is_non_negative(v: f64) -> bool {
    v >= 0.0
}

/// Network element kinds a connection or outlet may point at.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Target {
    Well,
    Pipe,
    Separator,
    Booster,
}

struct Names<'a> {
    wells: HashSet<&'a str>,
    pipes: HashSet<&'a str>,
    separators: HashSet<&'a str>,
    boosters: HashSet<&'a str>,
}

impl Names<'_> {
    fn kind(&self, name: &str) -> Option<Target> {
        if self.wells.contains(name) {
            Some(Target::Well)
        } else if self.pipes.contains(name) {
            Some(Target::Pipe)
        } else if self.separators.contains(name) {
            Some(Target::Separator)
        } else if self.boosters.contains(name) {
            Some(Target::Booster)
        } else {
            None
        }
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_schedule(&project.model.schedule)?;
    if !is_positive(project.model.max_input_rate) {
        return Err(invalid(
            "model.max_input_rate",
            project.model.max_input_rate,
            "must be positive",
        ));
    }

    // Wells, pipes, separators and boosters share one namespace.
    let mut all_names = HashSet::new();
    let element_names = project
        .wells
        .iter()
        .map(|w| (&w.name, "wells"))
        .chain(project.pipes.iter().map(|p| (&p.name, "pipes")))
        .chain(project.separators.iter().map(|s| (&s.name, "separators")))
        .chain(project.boosters.iter().map(|b| (&b.name, "boosters")));
    for (name, context) in element_names {
        if !all_names.insert(name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: name.clone(),
                context: context.to_string(),
            });
        }
    }

    let names = Names {
        wells: project.wells.iter().map(|w| w.name.as_str()).collect(),
        pipes: project.pipes.iter().map(|p| p.name.as_str()).collect(),
        separators: project.separators.iter().map(|s| s.name.as_str()).collect(),
        boosters: project.boosters.iter().map(|b| b.name.as_str()).collect(),
    };

    let steps = project.model.schedule.len();
    for well in &project.wells {
        validate_well(well, steps, &names)?;
    }

    let mut has_end_pipe = false;
    for pipe in &project.pipes {
        match &pipe.outlet {
            PipeOutletDef::End { pressure } => {
                has_end_pipe = true;
                if !is_positive(*pressure) {
                    return Err(invalid(
                        format!("pipes.{}.outlet.pressure", pipe.name),
                        pressure,
                        "boundary pressure must be positive",
                    ));
                }
            }
            PipeOutletDef::Mid { connections } => {
                if connections.is_empty() {
                    return Err(invalid(
                        format!("pipes.{}.outlet.connections", pipe.name),
                        "[]",
                        "a mid pipe needs at least one connection",
                    ));
                }
                validate_connections(&pipe.name, connections, &names)?;
                if connections.iter().any(|c| c.target == pipe.name) {
                    return Err(invalid(
                        format!("pipes.{}.outlet.connections", pipe.name),
                        &pipe.name,
                        "a pipe cannot route into itself",
                    ));
                }
            }
        }
    }
    if !project.wells.is_empty() && !has_end_pipe {
        return Err(invalid(
            "pipes",
            project.pipes.len(),
            "the network needs at least one end pipe",
        ));
    }

    for sep in &project.separators {
        require_pipe(&sep.outlet, &format!("separators.{}.outlet", sep.name), &names)?;
        check_bounds(
            &format!("separators.{}.removal_fraction", sep.name),
            &sep.removal_fraction,
        )?;
        if sep.removal_fraction.min < 0.0 || sep.removal_fraction.max > 1.0 {
            return Err(invalid(
                format!("separators.{}.removal_fraction", sep.name),
                sep.removal_fraction.max,
                "fraction bounds must lie in [0, 1]",
            ));
        }
        if !is_non_negative(sep.removal_capacity) {
            return Err(invalid(
                format!("separators.{}.removal_capacity", sep.name),
                sep.removal_capacity,
                "must be non-negative",
            ));
        }
    }

    for booster in &project.boosters {
        require_pipe(
            &booster.outlet,
            &format!("boosters.{}.outlet", booster.name),
            &names,
        )?;
        check_bounds(&format!("boosters.{}.capacity", booster.name), &booster.capacity)?;
        check_bounds(&format!("boosters.{}.boost", booster.name), &booster.boost)?;
        if !is_positive(booster.capacity.min) {
            return Err(invalid(
                format!("boosters.{}.capacity.min", booster.name),
                booster.capacity.min,
                "capacity must stay positive",
            ));
        }
    }

    let mut capacity_names = HashSet::new();
    for cap in &project.capacities {
        if !capacity_names.insert(cap.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: cap.name.clone(),
                context: "capacities".to_string(),
            });
        }
        for feed in &cap.feeds {
            require_pipe(feed, &format!("capacities.{}.feeds", cap.name), &names)?;
        }
        let limits = cap.limits();
        if limits.is_empty() {
            return Err(invalid(
                format!("capacities.{}", cap.name),
                "none",
                "at least one rate limit is required",
            ));
        }
        for (phase, max) in limits {
            if !is_positive(max) {
                return Err(invalid(
                    format!("capacities.{}.max_{phase}", cap.name),
                    max,
                    "must be positive",
                ));
            }
        }
    }

    validate_simulator(&project.simulator)?;
    validate_optimizer(&project.optimizer)?;

    if project.output.summary_file.trim().is_empty() {
        return Err(invalid("output.summary_file", "\"\"", "must not be empty"));
    }

    Ok(())
}

fn validate_schedule(schedule: &[f64]) -> Result<(), ValidationError> {
    if schedule.is_empty() {
        return Err(invalid("model.schedule", "[]", "at least one time step is required"));
    }
    let mut previous = 0.0;
    for (k, &t) in schedule.iter().enumerate() {
        if !t.is_finite() || t <= previous {
            return Err(invalid(
                format!("model.schedule[{k}]"),
                t,
                "end times must be positive and strictly increasing",
            ));
        }
        previous = t;
    }
    Ok(())
}

fn validate_well(well: &WellDef, steps: usize, names: &Names<'_>) -> Result<(), ValidationError> {
    if well.controls.len() != steps {
        return Err(invalid(
            format!("wells.{}.controls", well.name),
            well.controls.len(),
            &format!("expected one control per time step ({steps})"),
        ));
    }
    for (k, control) in well.controls.iter().enumerate() {
        check_bounds(
            &format!("wells.{}.controls[{k}]", well.name),
            &BoundedValue {
                value: control.value,
                min: control.min,
                max: control.max,
            },
        )?;
    }

    if !well.gas_lift.is_empty() {
        if well.kind == WellKindDef::Injection {
            return Err(ValidationError::Unsupported {
                feature: format!("wells.{}.gas_lift", well.name),
                reason: "gas lift applies to production wells only".to_string(),
            });
        }
        if well.gas_lift.len() != steps {
            return Err(invalid(
                format!("wells.{}.gas_lift", well.name),
                well.gas_lift.len(),
                &format!("expected one gas-lift rate per time step ({steps})"),
            ));
        }
        for (k, gl) in well.gas_lift.iter().enumerate() {
            check_bounds(&format!("wells.{}.gas_lift[{k}]", well.name), gl)?;
        }
    }

    match well.kind {
        WellKindDef::Injection if !well.connections.is_empty() => {
            Err(ValidationError::Unsupported {
                feature: format!("wells.{}.connections", well.name),
                reason: "injection wells are not part of the production network".to_string(),
            })
        }
        WellKindDef::Production if well.connections.is_empty() => Err(invalid(
            format!("wells.{}.connections", well.name),
            "[]",
            "a production well needs at least one pipe connection",
        )),
        _ => validate_connections(&well.name, &well.connections, names),
    }
}

fn validate_connections(
    owner: &str,
    connections: &[ConnectionDef],
    names: &Names<'_>,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for conn in connections {
        let context = format!("{owner}.connections");
        match names.kind(&conn.target) {
            None => {
                return Err(ValidationError::MissingReference {
                    id: conn.target.clone(),
                    context,
                });
            }
            Some(Target::Well) => {
                return Err(invalid(context, &conn.target, "cannot route into a well"));
            }
            Some(_) => {}
        }
        if !seen.insert(conn.target.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: conn.target.clone(),
                context,
            });
        }
        let field = format!("{owner}.connections.{}", conn.target);
        check_bounds(
            &field,
            &BoundedValue {
                value: conn.fraction,
                min: conn.min,
                max: conn.max,
            },
        )?;
        if conn.min < 0.0 || conn.max > 1.0 {
            return Err(invalid(field, conn.max, "fraction bounds must lie in [0, 1]"));
        }
    }
    Ok(())
}

fn require_pipe(name: &str, context: &str, names: &Names<'_>) -> Result<(), ValidationError> {
    match names.kind(name) {
        Some(Target::Pipe) => Ok(()),
        Some(_) => Err(invalid(context, name, "must name a pipe")),
        None => Err(ValidationError::MissingReference {
            id: name.to_string(),
            context: context.to_string(),
        }),
    }
}

fn check_bounds(field: &str, v: &BoundedValue) -> Result<(), ValidationError> {
    if !(v.min.is_finite() && v.max.is_finite() && v.value.is_finite()) {
        return Err(invalid(field, v.value, "bounds and value must be finite"));
    }
    if v.min > v.max {
        return Err(invalid(field, v.min, "min exceeds max"));
    }
    if v.value < v.min || v.value > v.max {
        return Err(invalid(
            field,
            v.value,
            &format!("outside bounds [{}, {}]", v.min, v.max),
        ));
    }
    Ok(())
}

fn validate_simulator(sim: &SimulatorDef) -> Result<(), ValidationError> {
    match sim {
        SimulatorDef::Proxy {
            initial_pressure,
            depletion,
            min_bhp,
            defaults,
            ..
        } => {
            if !is_positive(*initial_pressure) {
                return Err(invalid(
                    "simulator.initial_pressure",
                    initial_pressure,
                    "must be positive",
                ));
            }
            if !is_non_negative(*depletion) {
                return Err(invalid("simulator.depletion", depletion, "must be non-negative"));
            }
            if let Some(p) = min_bhp
                && !is_non_negative(*p)
            {
                return Err(invalid("simulator.min_bhp", p, "must be non-negative"));
            }
            if let Some(wc) = defaults.water_cut
                && !(0.0..1.0).contains(&wc)
            {
                return Err(invalid("simulator.defaults.water_cut", wc, "must lie in [0, 1)"));
            }
            Ok(())
        }
        SimulatorDef::External {
            command, timeout_s, ..
        } => {
            if command.trim().is_empty() {
                return Err(invalid("simulator.command", "\"\"", "must not be empty"));
            }
            if let Some(t) = timeout_s
                && !is_positive(*t)
            {
                return Err(invalid("simulator.timeout_s", t, "must be positive"));
            }
            Ok(())
        }
    }
}

fn validate_optimizer(opt: &OptimizerDef) -> Result<(), ValidationError> {
    match opt {
        OptimizerDef::RunOnce {
            sensitivities: Some(s),
        } if !is_positive(s.step) => Err(invalid(
            "optimizer.sensitivities.step",
            s.step,
            "must be positive",
        )),
        OptimizerDef::CompassSearch { settings } => {
            if let Some(c) = settings.contraction
                && !(is_positive(c) && c < 1.0)
            {
                return Err(invalid(
                    "optimizer.settings.contraction",
                    c,
                    "must lie in (0, 1)",
                ));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
