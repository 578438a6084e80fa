#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Initializing,
    Optimizing,
    /// One whole-model evaluation finished.
    Evaluated,
    /// A case was skipped after a recoverable simulator failure.
    SkippedCase,
    SavingResults,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::Initializing => "initializing",
            RunStage::Optimizing => "optimizing",
            RunStage::Evaluated => "evaluated",
            RunStage::SkippedCase => "skipped case",
            RunStage::SavingResults => "saving results",
            RunStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub evaluations: usize,
    pub simulator_launches: usize,
    pub objective: Option<f64>,
    pub infeasibility: Option<f64>,
    pub message: Option<String>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            evaluations: 0,
            simulator_launches: 0,
            objective: None,
            infeasibility: None,
            message,
        }
    }
}
