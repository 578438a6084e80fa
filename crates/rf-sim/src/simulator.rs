//! The reservoir-simulator contract.

use std::path::Path;

use rf_model::Model;

use crate::error::SimResult;

/// An opaque reservoir simulator driven through three blocking calls.
///
/// Implementations must be called in order: `generate_input_files`,
/// `launch_simulator`, `read_output`. Runs never overlap.
pub trait ReservoirSimulator {
    fn name(&self) -> &str;

    /// Working folder the simulator reads and writes its files in.
    fn folder(&self) -> &Path;

    /// Write the current well controls of `model` for the next run.
    fn generate_input_files(&mut self, model: &Model) -> SimResult<()>;

    /// Run the simulator to completion.
    fn launch_simulator(&mut self) -> SimResult<()>;

    /// Copy the resulting well streams into `model`.
    fn read_output(&mut self, model: &mut Model) -> SimResult<()>;

    /// Number of completed launches.
    fn launches(&self) -> usize;

    /// The full three-call sequence.
    fn run(&mut self, model: &mut Model) -> SimResult<()> {
        self.generate_input_files(model)?;
        self.launch_simulator()?;
        self.read_output(model)
    }
}
