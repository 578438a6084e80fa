//! Production and injection wells.

use serde::{Deserialize, Serialize};

use crate::error::{ComponentError, ComponentResult};
use crate::stream::Stream;
use crate::variables::{ConId, RealVarId, VariableStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellKind {
    Production,
    Injection,
}

/// Quantity a well control variable sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Bottomhole pressure (bar)
    Bhp,
    OilRate,
    GasRate,
    WaterRate,
    LiquidRate,
}

/// Control for the interval ending at `end_time` (days).
#[derive(Debug, Clone, PartialEq)]
pub struct WellControl {
    pub end_time: f64,
    pub mode: ControlMode,
    pub var: RealVarId,
}

/// Gas-lift injection rate (Sm3/day) for the interval ending at `end_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct GasLiftControl {
    pub end_time: f64,
    pub var: RealVarId,
}

/// Declared routing from a well or pipe into a named downstream element.
///
/// The target is resolved to a component when the model resolves its pipe
/// routing; the fraction variable scales the flow sent along this connection.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeConnection {
    pub target: String,
    pub fraction: RealVarId,
}

#[derive(Debug, Clone)]
pub struct Well {
    pub name: String,
    pub kind: WellKind,
    pub controls: Vec<WellControl>,
    pub gas_lift: Vec<GasLiftControl>,
    pub connections: Vec<PipeConnection>,
    /// One per time step (production wells only).
    pub bhp_constraints: Vec<ConId>,
    pub routing_constraint: Option<ConId>,
    streams: Vec<Stream>,
}

impl Well {
    pub fn new(name: impl Into<String>, kind: WellKind) -> Self {
        Self {
            name: name.into(),
            kind,
            controls: Vec::new(),
            gas_lift: Vec::new(),
            connections: Vec::new(),
            bhp_constraints: Vec::new(),
            routing_constraint: None,
            streams: Vec::new(),
        }
    }

    pub fn is_producer(&self) -> bool {
        self.kind == WellKind::Production
    }

    /// Streams as last reported by the reservoir simulator.
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn set_streams(&mut self, streams: Vec<Stream>) {
        self.streams = streams;
    }

    /// Control active at `time`: the first whose interval ends at or after it.
    pub fn control_at(&self, time: f64) -> Option<&WellControl> {
        self.controls
            .iter()
            .find(|c| c.end_time >= time)
            .or_else(|| self.controls.last())
    }

    /// Gas-lift rate active at `time`, zero without gas lift.
    pub fn gas_lift_at(&self, time: f64, store: &VariableStore) -> f64 {
        self.gas_lift
            .iter()
            .find(|g| g.end_time >= time)
            .or_else(|| self.gas_lift.last())
            .map_or(0.0, |g| store.real_value(g.var))
    }

    /// The connection currently carrying the largest fraction (first wins ties).
    pub fn dominant_connection(&self, store: &VariableStore) -> ComponentResult<&PipeConnection> {
        let mut best: Option<&PipeConnection> = None;
        for conn in &self.connections {
            match best {
                Some(b) if store.real_value(b.fraction) >= store.real_value(conn.fraction) => {}
                _ => best = Some(conn),
            }
        }
        best.ok_or_else(|| ComponentError::NoConnections {
            component: self.name.clone(),
        })
    }

    /// Routing constraint value: the sum of all connection fractions.
    pub fn update_routing_constraint(&self, store: &mut VariableStore) {
        if let Some(con) = self.routing_constraint {
            let sum = self
                .connections
                .iter()
                .map(|c| store.real_value(c.fraction))
                .sum();
            store.set_constraint_value(con, sum);
        }
    }

    /// Update the per-time-step BHP constraints against the inlet pressures of
    /// the pipe this well mainly produces into.
    ///
    /// `c = (p_wf - p_pipe) / p_wf`; c < 0 means the pipe pressure exceeds the
    /// bottomhole pressure and the well cannot flow. Returns the smallest value.
    pub fn update_bhp_constraints(
        &self,
        store: &mut VariableStore,
        pipe_name: &str,
        pipe_streams: &[Stream],
    ) -> ComponentResult<f64> {
        if self.streams.len() != pipe_streams.len()
            || self.streams.len() != self.bhp_constraints.len()
        {
            return Err(ComponentError::TimeStepMismatch {
                component: self.name.clone(),
                component_steps: self.streams.len(),
                other: pipe_name.to_string(),
                other_steps: pipe_streams.len(),
            });
        }

        let mut worst = f64::INFINITY;
        for ((own, pipe), con) in self
            .streams
            .iter()
            .zip(pipe_streams)
            .zip(&self.bhp_constraints)
        {
            if own.pressure <= 0.0 {
                return Err(ComponentError::NonPhysical {
                    component: self.name.clone(),
                    what: "bottomhole pressure must be positive",
                });
            }
            let c = (own.pressure - pipe.pressure) / own.pressure;
            store.set_constraint_value(*con, c);
            worst = worst.min(c);
        }

        Ok(worst)
    }
}
