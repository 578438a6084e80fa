//! Water separators.

use crate::calculator::EPSILON_RATE;
use crate::stream::Stream;
use crate::variables::{BinVarId, RealVarId, VariableStore};

/// Removes water from the stream before passing it on to a single outlet pipe.
///
/// Pressure passes through unchanged: the separator's inlet pressure is the
/// inlet pressure of its outlet pipe.
#[derive(Debug, Clone)]
pub struct Separator {
    pub name: String,
    pub outlet: String,
    pub install: BinVarId,
    /// Fraction of the incoming water the separator tries to remove.
    pub removal_fraction: RealVarId,
    /// Maximum removed water rate (Sm3/day).
    pub removal_capacity: f64,
    streams: Vec<Stream>,
}

impl Separator {
    pub fn new(
        name: impl Into<String>,
        outlet: impl Into<String>,
        install: BinVarId,
        removal_fraction: RealVarId,
        removal_capacity: f64,
    ) -> Self {
        Self {
            name: name.into(),
            outlet: outlet.into(),
            install,
            removal_fraction,
            removal_capacity,
            streams: Vec::new(),
        }
    }

    pub fn is_installed(&self, store: &VariableStore) -> bool {
        store.binary(self.install).is_on()
    }

    /// Inlet streams, one per time step.
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn set_streams(&mut self, streams: Vec<Stream>) {
        self.streams = streams;
    }

    /// Water removed at each time step.
    pub fn removed_water(&self, store: &VariableStore) -> Vec<f64> {
        if !self.is_installed(store) {
            return vec![0.0; self.streams.len()];
        }
        let frac = store.real_value(self.removal_fraction).clamp(0.0, 1.0);
        self.streams
            .iter()
            .map(|s| (frac * s.water_rate).min(self.removal_capacity).max(0.0))
            .collect()
    }

    /// Streams leaving towards the outlet pipe.
    pub fn outflow(&self, store: &VariableStore) -> Vec<Stream> {
        self.streams
            .iter()
            .zip(self.removed_water(store))
            .map(|(s, removed)| {
                let mut out = *s;
                out.water_rate = (s.water_rate - removed).max(0.0);
                if out.water_rate < EPSILON_RATE {
                    out.water_rate = 0.0;
                }
                out
            })
            .collect()
    }
}
