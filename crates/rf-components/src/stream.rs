//! Time-indexed flow records.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// How pressure is reconciled when two streams merge.
///
/// Rates always add linearly; pressures of merging streams generally differ.
/// A stream that carries no flow never influences the merged pressure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureMixing {
    /// Highest contributing pressure.
    #[default]
    Maximum,
    /// Lowest contributing pressure.
    Minimum,
    /// Average weighted by liquid rate (falls back to maximum without liquid).
    FlowWeighted,
}

impl PressureMixing {
    fn mix(self, a: &Stream, b: &Stream) -> f64 {
        match (a.has_flow(), b.has_flow()) {
            (false, false) => a.pressure.max(b.pressure),
            (true, false) => a.pressure,
            (false, true) => b.pressure,
            (true, true) => match self {
                PressureMixing::Maximum => a.pressure.max(b.pressure),
                PressureMixing::Minimum => a.pressure.min(b.pressure),
                PressureMixing::FlowWeighted => {
                    let (wa, wb) = (a.liquid_rate(), b.liquid_rate());
                    if wa + wb > 0.0 {
                        (a.pressure * wa + b.pressure * wb) / (wa + wb)
                    } else {
                        a.pressure.max(b.pressure)
                    }
                }
            },
        }
    }
}

/// Rates (Sm3/day) and pressure (bar) at the end of one time step (days).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub time: f64,
    pub oil_rate: f64,
    pub gas_rate: f64,
    pub water_rate: f64,
    pub pressure: f64,
}

impl Stream {
    pub fn new(time: f64, oil_rate: f64, gas_rate: f64, water_rate: f64, pressure: f64) -> Self {
        Self {
            time,
            oil_rate,
            gas_rate,
            water_rate,
            pressure,
        }
    }

    /// Empty stream at `time`.
    pub fn at(time: f64) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    pub fn liquid_rate(&self) -> f64 {
        self.oil_rate + self.water_rate
    }

    pub fn has_flow(&self) -> bool {
        self.oil_rate != 0.0 || self.gas_rate != 0.0 || self.water_rate != 0.0
    }

    /// Merge two streams: rates add, pressure follows `policy`.
    pub fn merge(&self, other: &Stream, policy: PressureMixing) -> Stream {
        Stream {
            time: self.time,
            oil_rate: self.oil_rate + other.oil_rate,
            gas_rate: self.gas_rate + other.gas_rate,
            water_rate: self.water_rate + other.water_rate,
            pressure: policy.mix(self, other),
        }
    }

}

/// Scales the rates; time and pressure are kept.
impl Mul<f64> for Stream {
    type Output = Stream;

    fn mul(self, fraction: f64) -> Stream {
        Stream {
            oil_rate: self.oil_rate * fraction,
            gas_rate: self.gas_rate * fraction,
            water_rate: self.water_rate * fraction,
            ..self
        }
    }
}

/// Merge using the default `PressureMixing::Maximum` policy.
impl Add for Stream {
    type Output = Stream;

    fn add(self, rhs: Stream) -> Stream {
        self.merge(&rhs, PressureMixing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_scales_rates_only() {
        let s = Stream::new(10.0, 1000.0, 10_000.0, 1.0, 14.7);
        let r = s * 0.23;
        assert_eq!(r.time, 10.0);
        assert_eq!(r.pressure, 14.7);
        assert!((r.oil_rate - 230.0).abs() < 1e-9);
        assert!((r.gas_rate - 2300.0).abs() < 1e-9);
        assert!((r.water_rate - 0.23).abs() < 1e-12);
    }

    #[test]
    fn addition_sums_rates_and_takes_max_pressure() {
        let a = Stream::new(30.0, 100.0, 50.0, 10.0, 20.0);
        let b = Stream::new(30.0, 50.0, 25.0, 5.0, 25.0);
        let c = a + b;
        assert_eq!(c.oil_rate, 150.0);
        assert_eq!(c.gas_rate, 75.0);
        assert_eq!(c.water_rate, 15.0);
        assert_eq!(c.pressure, 25.0);
    }

    #[test]
    fn mixing_policies() {
        let a = Stream::new(0.0, 100.0, 0.0, 0.0, 20.0);
        let b = Stream::new(0.0, 300.0, 0.0, 0.0, 40.0);
        assert_eq!(a.merge(&b, PressureMixing::Minimum).pressure, 20.0);
        assert_eq!(a.merge(&b, PressureMixing::Maximum).pressure, 40.0);
        assert!((a.merge(&b, PressureMixing::FlowWeighted).pressure - 35.0).abs() < 1e-12);
    }

    #[test]
    fn empty_stream_does_not_drag_pressure() {
        let empty = Stream::at(5.0);
        let s = Stream::new(5.0, 10.0, 0.0, 0.0, 30.0);
        assert_eq!(empty.merge(&s, PressureMixing::Minimum).pressure, 30.0);
    }
}
