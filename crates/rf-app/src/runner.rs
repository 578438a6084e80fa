//! The control loop: one model, one simulator, one optimizer.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rf_model::Model;
use rf_opt::{
    Case, CaseQueue, CopyMode, EvalTarget, Evaluator, LaunchEvent, Launcher, OptError, OptResult,
    Optimizer, OptimizerOutcome,
};
use rf_project::{FailurePolicy, Project};
use rf_results::{
    BestCaseRecord, RunManifest, RunStore, SummaryRow, SummaryWriter, compute_run_id,
    timestamp_now,
};
use tracing::{debug, info, warn};

use crate::compile::{CompiledProject, compile_project};
use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage};
use crate::query::{best_case_record, problem_description};

type ProgressCallback = Box<dyn FnMut(&RunProgressEvent)>;

/// Outcome of [`Runner::run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub optimizer: String,
    pub outcome: OptimizerOutcome,
    pub best: BestCaseRecord,
    pub evaluations: usize,
    pub skipped_cases: usize,
    pub simulator_launches: usize,
    pub summary_path: PathBuf,
}

/// Drives an optimizer over the model and logs every evaluation.
///
/// Every whole-model evaluation goes through the launcher, bumps the
/// evaluation counter and appends one row to the summary file. A recoverable
/// simulator failure either aborts the run or, with
/// [`FailurePolicy::SkipCase`], marks the case infeasible and carries on.
pub struct Runner {
    project: Project,
    output_dir: PathBuf,
    model: Model,
    launcher: Launcher,
    optimizer: Option<Box<dyn Optimizer>>,
    summary: Option<SummaryWriter<BufWriter<File>>>,
    policy: FailurePolicy,
    evaluations: usize,
    skipped: usize,
    started: Instant,
    progress: Option<ProgressCallback>,
}

impl Runner {
    /// Compile `project`; relative paths resolve against `base_dir`.
    pub fn new(project: Project, base_dir: &Path) -> AppResult<Self> {
        let CompiledProject {
            model,
            simulator,
            optimizer,
        } = compile_project(&project, base_dir)?;

        let launcher = Launcher::new(simulator).with_observer(|event| match event {
            LaunchEvent::RunningReservoirSimulator => debug!("About to run reservoir simulator"),
            LaunchEvent::Finished { target, case } => debug!(
                %target,
                objective = case.objective_value(),
                infeasibility = case.infeasibility(),
                "Evaluation finished"
            ),
        });

        Ok(Self {
            output_dir: base_dir.join(&project.output.folder),
            policy: project.on_simulator_failure,
            project,
            model,
            launcher,
            optimizer: Some(optimizer),
            summary: None,
            evaluations: 0,
            skipped: 0,
            started: Instant::now(),
            progress: None,
        })
    }

    pub fn with_progress(mut self, callback: impl FnMut(&RunProgressEvent) + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn skipped_cases(&self) -> usize {
        self.skipped
    }

    pub fn simulator_launches(&self) -> usize {
        self.launcher.simulator().launches()
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.project.output.summary_file)
    }

    fn resolve(&mut self) -> AppResult<()> {
        if !self.model.is_resolved() {
            self.model.initialize()?;
        }
        Ok(())
    }

    /// Resolve the model, reset the optimizer and open the summary file.
    pub fn initialize(&mut self) -> AppResult<()> {
        self.resolve()?;
        if let Some(opt) = self.optimizer.as_mut() {
            opt.initialize();
        }
        let path = self.summary_path();
        self.summary = Some(SummaryWriter::create(
            &path,
            &problem_description(&self.model),
        )?);
        self.evaluations = 0;
        self.skipped = 0;
        self.started = Instant::now();
        info!(summary = %path.display(), "Runner initialized");
        self.emit(RunStage::Initializing, None);
        Ok(())
    }

    /// Run the optimizer to completion and store the best case.
    pub fn run(&mut self) -> AppResult<RunReport> {
        if self.summary.is_none() {
            self.initialize()?;
        }
        let mut optimizer = self
            .optimizer
            .take()
            .ok_or_else(|| AppError::InvalidInput("optimizer already running".to_string()))?;
        let name = optimizer.name().to_string();

        self.emit(RunStage::Optimizing, Some(name.clone()));
        info!(optimizer = %name, "Starting optimizer");
        let outcome = optimizer.start(self);
        self.optimizer = Some(optimizer);
        let outcome = outcome?;

        self.emit(RunStage::SavingResults, None);
        let run_id = compute_run_id(&self.project, &name);
        let best = best_case_record(&self.model, &outcome.best);
        let manifest = RunManifest {
            run_id: run_id.clone(),
            project_name: self.project.name.clone(),
            timestamp: timestamp_now(),
            optimizer: name.clone(),
            evaluations: self.evaluations,
            simulator_launches: self.simulator_launches(),
            iterations: outcome.iterations,
            converged: outcome.converged,
            message: outcome.message.clone(),
        };
        RunStore::for_output(&self.output_dir)?.save_run(&manifest, &best)?;

        info!(
            run_id = %run_id,
            evaluations = self.evaluations,
            objective = outcome.best.objective_value(),
            "Run completed"
        );
        self.emit(RunStage::Completed, Some(outcome.message.clone()));

        Ok(RunReport {
            run_id,
            optimizer: name,
            outcome,
            best,
            evaluations: self.evaluations,
            skipped_cases: self.skipped,
            simulator_launches: self.simulator_launches(),
            summary_path: self.summary_path(),
        })
    }

    fn component_id(&self, name: &str) -> AppResult<rf_core::ComponentId> {
        self.model
            .component_by_name(name)
            .ok_or_else(|| AppError::ComponentNotFound(name.to_string()))
    }

    /// Pressure drop across pipe `name` for oil, gas and water rates flowing
    /// towards `outlet_pressure` (bar).
    pub fn evaluate_pipe(&mut self, name: &str, values: [f64; 4]) -> AppResult<f64> {
        self.resolve()?;
        let id = self.component_id(name)?;
        let mut case = Case::with_variables(values.to_vec(), Vec::new(), Vec::new());
        self.launcher
            .evaluate(&mut self.model, &mut case, EvalTarget::Component(id))?;
        Ok(case.objective_value())
    }

    /// First-step bottomhole pressure of well `name` for its control values.
    pub fn evaluate_well(&mut self, name: &str, values: Vec<f64>) -> AppResult<f64> {
        self.resolve()?;
        let id = self.component_id(name)?;
        let mut case = Case::with_variables(values, Vec::new(), Vec::new());
        self.launcher
            .evaluate(&mut self.model, &mut case, EvalTarget::Component(id))?;
        Ok(case.objective_value())
    }

    fn record_evaluation(&mut self) -> OptResult<()> {
        self.evaluations += 1;
        let row = SummaryRow {
            iteration: self.evaluations,
            objective: self.model.objective_value(),
            real_values: self.model.real_variables().iter().map(|v| v.value).collect(),
            binary_values: self
                .model
                .binary_variables()
                .iter()
                .map(|v| v.value)
                .collect(),
            constraint_values: self.model.constraints().iter().map(|c| c.value).collect(),
        };
        if let Some(summary) = self.summary.as_mut() {
            summary.write_row(&row).map_err(|e| OptError::Evaluator {
                what: format!("summary log: {e}"),
            })?;
        }
        self.emit(RunStage::Evaluated, None);
        Ok(())
    }

    fn skip_case(&mut self, case: &mut Case, err: &OptError) {
        warn!(error = %err, "Skipping case after simulator failure");
        case.clear_constraints();
        case.set_infeasibility(f64::INFINITY);
        self.model.set_up_to_date(false);
        self.skipped += 1;
        self.emit(RunStage::SkippedCase, Some(err.to_string()));
    }

    fn emit(&mut self, stage: RunStage, message: Option<String>) {
        let evaluated = stage == RunStage::Evaluated;
        let event = RunProgressEvent {
            stage,
            elapsed_wall_s: self.started.elapsed().as_secs_f64(),
            evaluations: self.evaluations,
            simulator_launches: self.simulator_launches(),
            objective: evaluated.then(|| self.model.objective_value()),
            infeasibility: evaluated.then(|| self.model.infeasibility()),
            message,
        };
        if let Some(callback) = self.progress.as_mut() {
            callback(&event);
        }
    }
}

impl Evaluator for Runner {
    fn initial_case(&self) -> Case {
        Case::from_model(&self.model, CopyMode::Structural)
    }

    fn real_bounds(&self) -> Vec<(f64, f64)> {
        self.model
            .real_variables()
            .iter()
            .map(|v| (v.min, v.max))
            .collect()
    }

    fn evaluate(&mut self, queue: &mut CaseQueue) -> OptResult<()> {
        for case in queue.iter_mut() {
            match self
                .launcher
                .evaluate(&mut self.model, case, EvalTarget::WholeModel)
            {
                Ok(()) => self.record_evaluation()?,
                Err(err) if err.is_recoverable() && self.policy == FailurePolicy::SkipCase => {
                    self.skip_case(case, &err)
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
