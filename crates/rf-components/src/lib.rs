//! rf-components: building blocks of a production network.
//!
//! Provides:
//! - `Stream`: time-indexed oil/gas/water rates and pressure
//! - decision variables and constraints, stored in a `VariableStore` arena and
//!   tagged with the role they play (well control, routing, ...)
//! - network elements: `Well`, `Pipe`, `Separator`, `PressureBooster`,
//!   plus `Capacity` groups that limit what a set of pipes may carry
//! - the `PressureDropCalculator` strategy consumed by every pipe
//!
//! Components never own variable values; they hold typed indices into the
//! store, so the model can expose one flat variable vector to optimizers.

pub mod booster;
pub mod calculator;
pub mod capacity;
pub mod component;
pub mod error;
pub mod pipe;
pub mod separator;
pub mod stream;
pub mod variables;
pub mod well;

pub use booster::PressureBooster;
pub use calculator::{DarcyWeisbachDrop, EPSILON_RATE, PressureDropCalculator, QuadraticDrop};
pub use capacity::{Capacity, CapacityLimit, Phase};
pub use component::{Component, Outlet, Share};
pub use error::{ComponentError, ComponentResult};
pub use pipe::{Pipe, PipeOutlet};
pub use separator::Separator;
pub use stream::{PressureMixing, Stream};
pub use variables::{
    BinVarId, BinaryVariable, ConId, Constraint, ConstraintKind, IntVarId, IntVariable,
    RealVarId, RealVariable, VarRole, VariableStore,
};
pub use well::{ControlMode, GasLiftControl, PipeConnection, Well, WellControl, WellKind};
