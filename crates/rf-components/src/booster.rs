//! Pressure boosters (subsea pumps/compressors).

use crate::calculator::EPSILON_RATE;
use crate::error::{ComponentError, ComponentResult};
use crate::stream::Stream;
use crate::variables::{BinVarId, ConId, RealVarId, VariableStore};

/// Lowers the pressure the upstream network has to deliver against.
///
/// When installed, the booster's inlet pressure is the inlet pressure of its
/// outlet pipe minus the boost, floored at zero. Flow passes through.
#[derive(Debug, Clone)]
pub struct PressureBooster {
    pub name: String,
    pub outlet: String,
    pub install: BinVarId,
    /// Liquid-rate capacity (Sm3/day).
    pub capacity: RealVarId,
    /// Pressure increase (bar).
    pub boost: RealVarId,
    /// One per time step.
    pub capacity_constraints: Vec<ConId>,
    streams: Vec<Stream>,
}

impl PressureBooster {
    pub fn new(
        name: impl Into<String>,
        outlet: impl Into<String>,
        install: BinVarId,
        capacity: RealVarId,
        boost: RealVarId,
    ) -> Self {
        Self {
            name: name.into(),
            outlet: outlet.into(),
            install,
            capacity,
            boost,
            capacity_constraints: Vec::new(),
            streams: Vec::new(),
        }
    }

    pub fn is_installed(&self, store: &VariableStore) -> bool {
        store.binary(self.install).is_on()
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn set_streams(&mut self, streams: Vec<Stream>) {
        self.streams = streams;
    }

    /// Inlet pressure for a given outlet pipe inlet pressure.
    pub fn inlet_pressure(&self, outlet_pressure: f64, store: &VariableStore) -> f64 {
        if self.is_installed(store) {
            (outlet_pressure - store.real_value(self.boost)).max(0.0)
        } else {
            outlet_pressure
        }
    }

    /// `c = (capacity - q_liquid) / capacity` per time step; 1.0 when not installed.
    pub fn update_capacity_constraints(&self, store: &mut VariableStore) -> ComponentResult<()> {
        if self.capacity_constraints.len() != self.streams.len() {
            return Err(ComponentError::TimeStepMismatch {
                component: self.name.clone(),
                component_steps: self.capacity_constraints.len(),
                other: "streams".to_string(),
                other_steps: self.streams.len(),
            });
        }

        let installed = self.is_installed(store);
        let capacity = store.real_value(self.capacity);
        for (stream, con) in self.streams.iter().zip(&self.capacity_constraints) {
            let q = stream.liquid_rate();
            let c = if !installed {
                1.0
            } else if capacity > EPSILON_RATE {
                (capacity - q) / capacity
            } else if q > EPSILON_RATE {
                -1.0
            } else {
                1.0
            };
            store.set_constraint_value(*con, c);
        }
        Ok(())
    }
}
