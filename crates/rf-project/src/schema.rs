//! Driver file schema definitions.
//!
//! Pressures are in `model.units`; rates in Sm3/day; times in days.

use rf_core::PressureUnit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub model: ModelDef,
    pub objective: ObjectiveDef,
    pub simulator: SimulatorDef,
    #[serde(default)]
    pub wells: Vec<WellDef>,
    #[serde(default)]
    pub pipes: Vec<PipeDef>,
    #[serde(default)]
    pub separators: Vec<SeparatorDef>,
    #[serde(default)]
    pub boosters: Vec<BoosterDef>,
    #[serde(default)]
    pub capacities: Vec<CapacityDef>,
    #[serde(default)]
    pub optimizer: OptimizerDef,
    #[serde(default)]
    pub output: OutputDef,
    #[serde(default)]
    pub on_simulator_failure: FailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    #[serde(default)]
    pub coupling: CouplingDef,
    /// End time of every time step.
    pub schedule: Vec<f64>,
    #[serde(default)]
    pub pressure_mixing: MixingDef,
    #[serde(default)]
    pub units: PressureUnit,
    #[serde(default = "default_max_input_rate")]
    pub max_input_rate: f64,
}

fn default_max_input_rate() -> f64 {
    1.0e8
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CouplingDef {
    #[default]
    Coupled,
    Decoupled,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MixingDef {
    #[default]
    Maximum,
    Minimum,
    FlowWeighted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectiveDef {
    CumulativeOil,
    CumulativeGas,
    CumulativeWater,
    Npv {
        oil_price: f64,
        gas_price: f64,
        water_cost: f64,
        #[serde(default)]
        discount_rate: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimulatorDef {
    Proxy {
        folder: String,
        initial_pressure: f64,
        /// Pressure loss per Sm3 of net voidage.
        depletion: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_bhp: Option<f64>,
        #[serde(default)]
        defaults: ReservoirParamsDef,
    },
    External {
        folder: String,
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_s: Option<f64>,
    },
}

/// Proxy inflow parameters; unset fields keep the simulator defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReservoirParamsDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub productivity_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_oil_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_cut: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lift_gain: Option<f64>,
}

/// A decision variable's start value and bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundedValue {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WellKindDef {
    #[default]
    Production,
    Injection,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ControlModeDef {
    #[default]
    Bhp,
    OilRate,
    GasRate,
    WaterRate,
    LiquidRate,
}

/// Control for one schedule interval, in schedule order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlDef {
    #[serde(default)]
    pub mode: ControlModeDef,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    pub target: String,
    pub fraction: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default = "default_fraction_max")]
    pub max: f64,
}

fn default_fraction_max() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WellDef {
    pub name: String,
    #[serde(default)]
    pub kind: WellKindDef,
    pub controls: Vec<ControlDef>,
    /// Empty, or one injection rate per schedule interval.
    #[serde(default)]
    pub gas_lift: Vec<BoundedValue>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservoir: Option<ReservoirParamsDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipeOutletDef {
    Mid { connections: Vec<ConnectionDef> },
    End { pressure: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculatorDef {
    Quadratic {
        oil_coeff: f64,
        gas_coeff: f64,
        water_coeff: f64,
    },
    DarcyWeisbach {
        length: f64,
        diameter: f64,
        roughness: f64,
        #[serde(default)]
        elevation: f64,
        density: f64,
        viscosity: f64,
        #[serde(default = "default_gas_volume_factor")]
        gas_volume_factor: f64,
    },
}

fn default_gas_volume_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeDef {
    pub name: String,
    pub outlet: PipeOutletDef,
    pub calculator: CalculatorDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeparatorDef {
    pub name: String,
    pub outlet: String,
    #[serde(default)]
    pub installed: bool,
    pub removal_fraction: BoundedValue,
    pub removal_capacity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoosterDef {
    pub name: String,
    pub outlet: String,
    #[serde(default)]
    pub installed: bool,
    /// Liquid capacity (Sm3/day).
    pub capacity: BoundedValue,
    /// Pressure added (model units).
    pub boost: BoundedValue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapacityDef {
    pub name: String,
    pub feeds: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_oil: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_gas: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_water: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_liquid: Option<f64>,
}

impl CapacityDef {
    /// Declared limits as `(phase, max)` in oil, gas, water, liquid order.
    pub fn limits(&self) -> Vec<(&'static str, f64)> {
        [
            ("oil", self.max_oil),
            ("gas", self.max_gas),
            ("water", self.max_water),
            ("liquid", self.max_liquid),
        ]
        .into_iter()
        .filter_map(|(phase, max)| max.map(|m| (phase, m)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceScheme {
    Forward,
    Central,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensitivityDef {
    pub scheme: DifferenceScheme,
    #[serde(default = "default_fd_step")]
    pub step: f64,
}

fn default_fd_step() -> f64 {
    1e-4
}

/// Compass search settings; unset fields keep the optimizer defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompassDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerDef {
    RunOnce {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sensitivities: Option<SensitivityDef>,
    },
    CompassSearch {
        #[serde(default)]
        settings: CompassDef,
    },
}

impl Default for OptimizerDef {
    fn default() -> Self {
        OptimizerDef::RunOnce {
            sensitivities: None,
        }
    }
}

/// Output locations, relative to the driver file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDef {
    #[serde(default = "default_output_folder")]
    pub folder: String,
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_summary_file() -> String {
    "summary.txt".to_string()
}

impl Default for OutputDef {
    fn default() -> Self {
        Self {
            folder: default_output_folder(),
            summary_file: default_summary_file(),
        }
    }
}

/// What the run does when the reservoir simulator fails recoverably.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Abort,
    /// Report the case infeasible and continue.
    SkipCase,
}
