//! Pressure-drop strategies for pipe segments.

use std::fmt;

use rf_core::units::{Area, Density, DynVisc, Length, Pressure, Velocity, g0, sm3_per_day};
use rf_core::{as_bar, ensure_finite};

use crate::error::{ComponentError, ComponentResult};
use crate::stream::Stream;

/// Below this mixture rate (Sm3/day) a pipe is treated as having no flow.
pub const EPSILON_RATE: f64 = 1e-9;

/// Computes the pressure drop across a pipe for a given flow.
///
/// Calculators are pure functions of the stream and the known downstream
/// (outlet) pressure; the pipe's inlet pressure is `outlet + drop`.
pub trait PressureDropCalculator: Send + Sync + fmt::Debug {
    /// Correlation name for reports and diagnostics.
    fn name(&self) -> &str;

    /// Pressure drop in bar for `stream` flowing towards `outlet_pressure` (bar).
    fn pressure_drop(&self, stream: &Stream, outlet_pressure: f64) -> ComponentResult<f64>;
}

fn check(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::InvalidArg { what })
}

/// Empirical quadratic correlation:
///
/// `dp = c_o q_o^2 + c_w q_w^2 + c_g q_g^2 / p_out`
///
/// The gas term shrinks with outlet pressure as the gas compresses.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticDrop {
    pub oil_coeff: f64,
    pub gas_coeff: f64,
    pub water_coeff: f64,
}

impl QuadraticDrop {
    pub fn new(oil_coeff: f64, gas_coeff: f64, water_coeff: f64) -> Self {
        Self {
            oil_coeff,
            gas_coeff,
            water_coeff,
        }
    }
}

impl PressureDropCalculator for QuadraticDrop {
    fn name(&self) -> &str {
        "quadratic"
    }

    fn pressure_drop(&self, stream: &Stream, outlet_pressure: f64) -> ComponentResult<f64> {
        if outlet_pressure <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "outlet pressure must be positive",
            });
        }
        let dp = self.oil_coeff * stream.oil_rate.powi(2)
            + self.water_coeff * stream.water_rate.powi(2)
            + self.gas_coeff * stream.gas_rate.powi(2) / outlet_pressure;
        check(dp, "pressure drop")
    }
}

/// Single-phase Darcy-Weisbach friction on a homogeneous mixture.
///
/// Gas is converted to in-situ volume with `gas_volume_factor / p_out`
/// (reservoir m3 per Sm3 at 1 bar), then friction uses the Swamee-Jain
/// explicit approximation of Colebrook-White. Elevation adds a hydrostatic
/// term.
#[derive(Debug, Clone, PartialEq)]
pub struct DarcyWeisbachDrop {
    pub length: Length,
    /// Inner diameter
    pub diameter: Length,
    /// Absolute roughness
    pub roughness: Length,
    /// Outlet minus inlet height
    pub elevation: Length,
    /// Mixture density
    pub density: Density,
    /// Mixture viscosity
    pub viscosity: DynVisc,
    pub gas_volume_factor: f64,
}

impl DarcyWeisbachDrop {
    /// Friction factor: laminar below Re 2300, Swamee-Jain above.
    fn friction_factor(&self, reynolds: f64) -> f64 {
        if reynolds < 2300.0 {
            64.0 / reynolds
        } else {
            let e_d = (self.roughness / self.diameter).value;
            let a = e_d / 3.7;
            let b = 5.74 / reynolds.powf(0.9);
            let f = 0.25 / (a + b).log10().powi(2);
            f.max(0.0001)
        }
    }
}

impl PressureDropCalculator for DarcyWeisbachDrop {
    fn name(&self) -> &str {
        "darcy_weisbach"
    }

    fn pressure_drop(&self, stream: &Stream, outlet_pressure: f64) -> ComponentResult<f64> {
        if outlet_pressure <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "outlet pressure must be positive",
            });
        }
        if self.diameter.value <= 0.0 || self.density.value <= 0.0 || self.viscosity.value <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "pipe geometry and fluid properties must be positive",
            });
        }

        let hydrostatic: Pressure = self.density * g0() * self.elevation;

        let q_mix =
            stream.liquid_rate() + stream.gas_rate * self.gas_volume_factor / outlet_pressure;
        if q_mix.abs() < EPSILON_RATE {
            return check(as_bar(hydrostatic), "pressure drop");
        }

        let area: Area = self.diameter * self.diameter * (std::f64::consts::PI / 4.0);
        let velocity: Velocity = sm3_per_day(q_mix.abs()) / area;
        let reynolds = check(
            (self.density * velocity * self.diameter / self.viscosity).value,
            "Reynolds number",
        )?;

        let f = self.friction_factor(reynolds);
        let l_d = (self.length / self.diameter).value;

        // dP = f*L/D * 0.5 * rho * v^2 + rho g dz
        let friction: Pressure = self.density * velocity * velocity * (f * l_d * 0.5);

        check(as_bar(friction + hydrostatic), "pressure drop")
    }
}
