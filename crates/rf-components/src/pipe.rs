//! Pipe segments.

use crate::calculator::PressureDropCalculator;
use crate::error::{ComponentError, ComponentResult};
use crate::stream::Stream;
use crate::variables::{ConId, VariableStore};
use crate::well::PipeConnection;

/// What sits at the downstream end of a pipe.
#[derive(Debug, Clone, PartialEq)]
pub enum PipeOutlet {
    /// Mid pipe: flow is split over further network elements.
    Routed(Vec<PipeConnection>),
    /// End pipe: delivers at a fixed boundary pressure (bar), e.g. a platform.
    Boundary { pressure: f64 },
}

#[derive(Debug)]
pub struct Pipe {
    pub name: String,
    pub outlet: PipeOutlet,
    pub calculator: Box<dyn PressureDropCalculator>,
    /// Mid pipes only.
    pub routing_constraint: Option<ConId>,
    streams: Vec<Stream>,
}

impl Pipe {
    pub fn new(
        name: impl Into<String>,
        outlet: PipeOutlet,
        calculator: Box<dyn PressureDropCalculator>,
    ) -> Self {
        Self {
            name: name.into(),
            outlet,
            calculator,
            routing_constraint: None,
            streams: Vec::new(),
        }
    }

    pub fn is_end_pipe(&self) -> bool {
        matches!(self.outlet, PipeOutlet::Boundary { .. })
    }

    /// Declared downstream connections; empty for end pipes.
    pub fn connections(&self) -> &[PipeConnection] {
        match &self.outlet {
            PipeOutlet::Routed(conns) => conns,
            PipeOutlet::Boundary { .. } => &[],
        }
    }

    /// Inlet streams, one per time step.
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn set_streams(&mut self, streams: Vec<Stream>) {
        self.streams = streams;
    }

    pub fn pressure_drop(&self, stream: &Stream, outlet_pressure: f64) -> ComponentResult<f64> {
        self.calculator.pressure_drop(stream, outlet_pressure)
    }

    /// Set each inlet stream's pressure to `outlet + drop` for its time step.
    pub fn calculate_inlet_pressures(&mut self, outlet_pressures: &[f64]) -> ComponentResult<()> {
        if outlet_pressures.len() != self.streams.len() {
            return Err(ComponentError::TimeStepMismatch {
                component: self.name.clone(),
                component_steps: self.streams.len(),
                other: "outlet".to_string(),
                other_steps: outlet_pressures.len(),
            });
        }

        for (i, p_out) in outlet_pressures.iter().enumerate() {
            let dp = self.calculator.pressure_drop(&self.streams[i], *p_out)?;
            self.streams[i].pressure = p_out + dp;
        }
        Ok(())
    }

    /// Routing constraint value: the sum of outgoing fractions.
    pub fn update_routing_constraint(&self, store: &mut VariableStore) {
        if let Some(con) = self.routing_constraint {
            let sum = self
                .connections()
                .iter()
                .map(|c| store.real_value(c.fraction))
                .sum();
            store.set_constraint_value(con, sum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::QuadraticDrop;

    #[test]
    fn inlet_pressure_adds_drop() {
        let mut pipe = Pipe::new(
            "P1",
            PipeOutlet::Boundary { pressure: 20.0 },
            Box::new(QuadraticDrop::new(1e-4, 0.0, 0.0)),
        );
        pipe.set_streams(vec![
            Stream::new(30.0, 100.0, 0.0, 0.0, 0.0),
            Stream::new(60.0, 0.0, 0.0, 0.0, 0.0),
        ]);
        pipe.calculate_inlet_pressures(&[20.0, 20.0]).unwrap();
        assert!((pipe.streams()[0].pressure - 21.0).abs() < 1e-12);
        assert!((pipe.streams()[1].pressure - 20.0).abs() < 1e-12);
        assert!(pipe.is_end_pipe());
        assert!(pipe.connections().is_empty());
    }

    #[test]
    fn outlet_length_must_match_steps() {
        let mut pipe = Pipe::new(
            "P1",
            PipeOutlet::Boundary { pressure: 20.0 },
            Box::new(QuadraticDrop::new(1e-4, 0.0, 0.0)),
        );
        pipe.set_streams(vec![Stream::at(30.0)]);
        let err = pipe.calculate_inlet_pressures(&[20.0, 20.0]).unwrap_err();
        assert!(matches!(err, ComponentError::TimeStepMismatch { .. }));
    }
}
