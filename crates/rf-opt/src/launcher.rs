//! The evaluation function: case in, constraint and objective values out.

use std::fmt;

use rf_components::{Component, Stream};
use rf_core::ComponentId;
use rf_model::Model;
use rf_sim::ReservoirSimulator;
use tracing::{debug, info};

use crate::case::Case;
use crate::error::{OptError, OptResult};

/// What a case is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalTarget {
    WholeModel,
    /// A single pipe or well in isolation.
    Component(ComponentId),
}

impl fmt::Display for EvalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalTarget::WholeModel => write!(f, "model"),
            EvalTarget::Component(id) => write!(f, "component {id}"),
        }
    }
}

/// Progress notifications emitted while evaluating.
#[derive(Debug)]
pub enum LaunchEvent<'a> {
    /// Sent right before every reservoir-simulator invocation.
    RunningReservoirSimulator,
    /// Sent after a case has been evaluated.
    Finished { target: EvalTarget, case: &'a Case },
}

type Observer = Box<dyn FnMut(&LaunchEvent<'_>)>;

/// Maps cases onto a model and a reservoir simulator.
pub struct Launcher {
    simulator: Box<dyn ReservoirSimulator>,
    observer: Option<Observer>,
}

impl fmt::Debug for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("simulator", &self.simulator.name())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Launcher {
    pub fn new(simulator: Box<dyn ReservoirSimulator>) -> Self {
        Self {
            simulator,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl FnMut(&LaunchEvent<'_>) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn simulator(&self) -> &dyn ReservoirSimulator {
        self.simulator.as_ref()
    }

    fn emit(&mut self, event: LaunchEvent<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }

    /// Whether evaluating `case` needs a fresh reservoir simulation.
    ///
    /// A stale model always reruns. Otherwise only a changed value of a real
    /// variable that drives a well (control or gas lift) forces a rerun.
    pub fn rerun_reservoir_simulator(model: &Model, case: &Case) -> bool {
        if !model.is_up_to_date() {
            return true;
        }
        model
            .real_variables()
            .iter()
            .zip(case.real_variables())
            .any(|(var, value)| var.role.forces_reservoir_rerun() && var.value != *value)
    }

    /// Evaluate `case` against `target`, writing the outputs into the case.
    pub fn evaluate(
        &mut self,
        model: &mut Model,
        case: &mut Case,
        target: EvalTarget,
    ) -> OptResult<()> {
        match target {
            EvalTarget::WholeModel => self.evaluate_model(model, case)?,
            EvalTarget::Component(id) => match model.component(id) {
                Some(Component::Pipe(_)) => Self::evaluate_pipe(model, id, case)?,
                Some(Component::Well(_)) => self.evaluate_well(model, id, case)?,
                Some(other) => {
                    return Err(OptError::UnsupportedTarget {
                        name: other.name().to_string(),
                    });
                }
                None => {
                    return Err(OptError::UnknownComponent { id: id.to_string() });
                }
            },
        }
        self.emit(LaunchEvent::Finished {
            target,
            case: &*case,
        });
        Ok(())
    }

    fn evaluate_model(&mut self, model: &mut Model, case: &mut Case) -> OptResult<()> {
        let expected = model.real_variables().len();
        if case.number_of_real_variables() != expected {
            return Err(OptError::VariableCount {
                target: model.name().to_string(),
                expected,
                found: case.number_of_real_variables(),
            });
        }
        for (kind, expected, found) in [
            (
                "binary",
                model.binary_variables().len(),
                case.number_of_binary_variables(),
            ),
            (
                "integer",
                model.integer_variables().len(),
                case.number_of_integer_variables(),
            ),
        ] {
            if expected != found {
                return Err(OptError::DiscreteCount {
                    kind,
                    expected,
                    found,
                });
            }
        }

        // Decided before the case is written, against the previous values.
        let rerun = Self::rerun_reservoir_simulator(model, case);

        for (i, v) in case.real_variables().iter().enumerate() {
            model.set_real_variable_value(i, *v)?;
        }
        for (i, v) in case.binary_variables().iter().enumerate() {
            model.set_binary_variable_value(i, *v)?;
        }
        for (i, v) in case.integer_variables().iter().enumerate() {
            model.set_integer_variable_value(i, *v)?;
        }
        model.set_up_to_date(false);

        if rerun {
            self.emit(LaunchEvent::RunningReservoirSimulator);
            info!(simulator = %self.simulator.name(), "Running reservoir simulator");
            self.simulator.run(model)?;
        } else {
            debug!("No need to run reservoir simulator");
        }

        model.evaluate_network()?;
        model.set_up_to_date(true);

        case.clear_constraints();
        for c in model.constraints() {
            case.add_constraint_value(c.value);
        }
        case.set_objective_value(model.objective_value());
        case.set_infeasibility(model.infeasibility());
        Ok(())
    }

    /// Pressure drop of one pipe for (oil rate, gas rate, water rate,
    /// outlet pressure). Leaves the model untouched.
    fn evaluate_pipe(model: &Model, id: ComponentId, case: &mut Case) -> OptResult<()> {
        let Some(Component::Pipe(pipe)) = model.component(id) else {
            return Err(OptError::UnknownComponent { id: id.to_string() });
        };
        if case.number_of_real_variables() != 4 {
            return Err(OptError::VariableCount {
                target: pipe.name.clone(),
                expected: 4,
                found: case.number_of_real_variables(),
            });
        }

        let v = case.real_variables();
        let stream = Stream::new(0.0, v[0], v[1], v[2], 0.0);
        let dp = pipe.pressure_drop(&stream, v[3])?;
        case.set_objective_value(dp);
        Ok(())
    }

    /// Reservoir response of one well; the objective is its bottomhole
    /// pressure at the first time step.
    fn evaluate_well(
        &mut self,
        model: &mut Model,
        id: ComponentId,
        case: &mut Case,
    ) -> OptResult<()> {
        let indices = model.well_control_indices(id);
        if case.number_of_real_variables() != indices.len() {
            let name = model.component(id).map(|c| c.name().to_string());
            return Err(OptError::VariableCount {
                target: name.unwrap_or_else(|| id.to_string()),
                expected: indices.len(),
                found: case.number_of_real_variables(),
            });
        }

        for (index, value) in indices.iter().zip(case.real_variables()) {
            model.set_real_variable_value(*index, *value)?;
        }
        // The network is not recomputed, so the model stays stale.
        model.set_up_to_date(false);

        self.emit(LaunchEvent::RunningReservoirSimulator);
        self.simulator.run(model)?;

        let well = model
            .component(id)
            .and_then(Component::as_well)
            .ok_or_else(|| OptError::UnknownComponent { id: id.to_string() })?;
        let bhp = well
            .streams()
            .first()
            .map(|s| s.pressure)
            .ok_or_else(|| OptError::NoWellStreams {
                name: well.name.clone(),
            })?;
        case.set_objective_value(bhp);
        Ok(())
    }
}
