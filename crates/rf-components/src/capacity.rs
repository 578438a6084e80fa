//! Capacity groups: rate limits over a set of feed pipes.

use rf_core::ComponentId;
use serde::{Deserialize, Serialize};

use crate::error::{ComponentError, ComponentResult};
use crate::stream::Stream;
use crate::variables::{ConId, VariableStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Oil,
    Gas,
    Water,
    Liquid,
}

impl Phase {
    pub fn rate(self, stream: &Stream) -> f64 {
        match self {
            Phase::Oil => stream.oil_rate,
            Phase::Gas => stream.gas_rate,
            Phase::Water => stream.water_rate,
            Phase::Liquid => stream.liquid_rate(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Oil => "oil",
            Phase::Gas => "gas",
            Phase::Water => "water",
            Phase::Liquid => "liquid",
        }
    }
}

/// Maximum rate of one phase, with one constraint per time step.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityLimit {
    pub phase: Phase,
    pub max: f64,
    pub constraints: Vec<ConId>,
}

#[derive(Debug, Clone)]
pub struct Capacity {
    pub name: String,
    /// Declared feed pipe names.
    pub feed_names: Vec<String>,
    /// Feed components, filled in when the model resolves capacity connections.
    pub feeds: Vec<ComponentId>,
    pub limits: Vec<CapacityLimit>,
}

impl Capacity {
    pub fn new(name: impl Into<String>, feed_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            feed_names,
            feeds: Vec::new(),
            limits: Vec::new(),
        }
    }

    /// Total rate through all feeds per time step, `c = (max - q) / max`.
    pub fn update_constraints(
        &self,
        store: &mut VariableStore,
        feed_streams: &[&[Stream]],
    ) -> ComponentResult<()> {
        for limit in &self.limits {
            if limit.max <= 0.0 {
                return Err(ComponentError::NonPhysical {
                    component: self.name.clone(),
                    what: "capacity limit must be positive",
                });
            }
            for (step, con) in limit.constraints.iter().enumerate() {
                let mut total = 0.0;
                for streams in feed_streams {
                    let stream = streams.get(step).ok_or_else(|| ComponentError::TimeStepMismatch {
                        component: self.name.clone(),
                        component_steps: limit.constraints.len(),
                        other: "feed".to_string(),
                        other_steps: streams.len(),
                    })?;
                    total += limit.phase.rate(stream);
                }
                store.set_constraint_value(*con, (limit.max - total) / limit.max);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{Constraint, ConstraintKind};

    #[test]
    fn sums_feeds_per_step() {
        let mut store = VariableStore::new();
        let mut cap = Capacity::new("PLATFORM", vec!["P1".into(), "P2".into()]);
        cap.limits.push(CapacityLimit {
            phase: Phase::Water,
            max: 100.0,
            constraints: vec![store.add_constraint(Constraint::new(
                "water0",
                0.0,
                1.0,
                ConstraintKind::Capacity,
            ))],
        });
        let a = [Stream::new(30.0, 10.0, 0.0, 40.0, 0.0)];
        let b = [Stream::new(30.0, 10.0, 0.0, 80.0, 0.0)];
        cap.update_constraints(&mut store, &[&a, &b]).unwrap();
        let con = store.constraint(cap.limits[0].constraints[0]);
        assert!((con.value + 0.2).abs() < 1e-12);

        let err = cap.update_constraints(&mut store, &[&a, &[]]).unwrap_err();
        assert!(matches!(err, ComponentError::TimeStepMismatch { .. }));
    }
}
