use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rf_app::{
    AppResult, RunProgressEvent, RunStage, Runner, build_model, problem_description,
    project_service, routing_table, summarize,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "resflow")]
#[command(about = "resflow - production network optimization driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Print the model and the optimization problem it defines
    Describe {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Run the configured optimizer and write the summary file
    Run {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Pressure drop across one pipe
    EvaluatePipe {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Pipe name
        pipe: String,
        /// Oil rate (Sm3/day)
        #[arg(long, default_value_t = 0.0)]
        oil: f64,
        /// Gas rate (Sm3/day)
        #[arg(long, default_value_t = 0.0)]
        gas: f64,
        /// Water rate (Sm3/day)
        #[arg(long, default_value_t = 0.0)]
        water: f64,
        /// Outlet pressure (bar)
        #[arg(long)]
        outlet_pressure: f64,
    },
    /// First-step bottomhole pressure of one well for the given controls
    EvaluateWell {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Well name
        well: String,
        /// One value per control and gas-lift variable
        #[arg(required = true, num_args = 1..)]
        values: Vec<f64>,
    },
    /// Fraction of each production well's flow reaching each pipe
    Routing {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// List stored runs for a project
    Runs {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Show the best case of a stored run
    ShowRun {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Describe { project_path } => cmd_describe(&project_path),
        Commands::Run { project_path } => cmd_run(&project_path),
        Commands::EvaluatePipe {
            project_path,
            pipe,
            oil,
            gas,
            water,
            outlet_pressure,
        } => cmd_evaluate_pipe(&project_path, &pipe, [oil, gas, water, outlet_pressure]),
        Commands::EvaluateWell {
            project_path,
            well,
            values,
        } => cmd_evaluate_well(&project_path, &well, values),
        Commands::Routing { project_path } => cmd_routing(&project_path),
        Commands::Runs { project_path } => cmd_runs(&project_path),
        Commands::ShowRun {
            project_path,
            run_id,
        } => cmd_show_run(&project_path, &run_id),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_describe(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let mut model = build_model(&project)?;
    model.initialize()?;

    let s = summarize(&model);
    println!("Model '{}' ({} coupling, {} time steps)", s.name, s.coupling, s.time_steps);
    println!("  Wells:      {}", s.wells);
    println!("  Pipes:      {}", s.pipes);
    println!("  Separators: {}", s.separators);
    println!("  Boosters:   {}", s.boosters);
    println!("  Capacities: {}", s.capacities);
    println!("  Objective:  {}", s.objective);

    let problem = problem_description(&model);
    println!("\nContinuous variables ({}):", problem.real_variables.len());
    for v in &problem.real_variables {
        println!("  {:<28} {} <= {} <= {}", v.name, v.min, v.value, v.max);
    }
    println!("\nBinary variables ({}):", problem.binary_variables.len());
    for v in &problem.binary_variables {
        println!("  {:<28} {}", v.name, v.value);
    }
    println!("\nConstraints ({}):", problem.constraints.len());
    for c in &problem.constraints {
        println!("  {:<28} [{}, {}]", c.name, c.min, c.max);
    }
    Ok(())
}

fn cmd_run(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    println!("Running project: {}", project.name);
    info!(path = %project_path.display(), "Loaded project");

    let mut last_emit = Instant::now();
    let mut last_stage = RunStage::Initializing;
    let mut runner = Runner::new(project, &project_service::base_dir(project_path))?
        .with_progress(move |event| {
            let emit_now = event.stage != last_stage || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(event);
                last_stage = event.stage;
                last_emit = Instant::now();
            }
        });
    let report = runner.run()?;
    clear_progress_line();

    println!("✓ Optimization completed: {}", report.run_id);
    println!("  Optimizer:          {}", report.optimizer);
    println!("  Message:            {}", report.outcome.message);
    println!("  Evaluations:        {}", report.evaluations);
    if report.skipped_cases > 0 {
        println!("  Skipped cases:      {}", report.skipped_cases);
    }
    println!("  Simulator launches: {}", report.simulator_launches);
    println!("  Objective:          {:.6e}", report.best.objective);
    println!("  Infeasibility:      {:.6e}", report.best.infeasibility);
    println!("  Summary file:       {}", report.summary_path.display());
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s  evals={}  sims={}",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s,
        event.evaluations,
        event.simulator_launches
    );
    if let Some(obj) = event.objective {
        line.push_str(&format!("  obj={:.4e}", obj));
    }
    if let Some(inf) = event.infeasibility {
        line.push_str(&format!("  infeas={:.3e}", inf));
    }
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn runner_for(project_path: &Path) -> AppResult<Runner> {
    let project = project_service::load_project(project_path)?;
    Runner::new(project, &project_service::base_dir(project_path))
}

fn cmd_evaluate_pipe(project_path: &Path, pipe: &str, values: [f64; 4]) -> AppResult<()> {
    let dp = runner_for(project_path)?.evaluate_pipe(pipe, values)?;
    println!("Pressure drop across '{}': {:.6} bar", pipe, dp);
    Ok(())
}

fn cmd_evaluate_well(project_path: &Path, well: &str, values: Vec<f64>) -> AppResult<()> {
    let bhp = runner_for(project_path)?.evaluate_well(well, values)?;
    println!("Bottomhole pressure of '{}' (first step): {:.6} bar", well, bhp);
    Ok(())
}

fn cmd_routing(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let mut model = build_model(&project)?;
    model.initialize()?;

    let table = routing_table(&model)?;
    if table.is_empty() {
        println!("No production wells in project");
        return Ok(());
    }
    println!("{:<20} {:<20} {:>10}", "well", "pipe", "fraction");
    for entry in table {
        println!("{:<20} {:<20} {:>10.4}", entry.well, entry.pipe, entry.fraction);
    }
    Ok(())
}

fn cmd_runs(project_path: &Path) -> AppResult<()> {
    let runs = project_service::list_runs(project_path)?;

    if runs.is_empty() {
        println!("No stored runs found");
    } else {
        println!("Stored runs:");
        for manifest in runs {
            println!(
                "  {} ({}, {}, {} evaluations)",
                manifest.run_id, manifest.timestamp, manifest.optimizer, manifest.evaluations
            );
        }
    }
    Ok(())
}

fn cmd_show_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);
    let (manifest, best) = project_service::load_run(project_path, run_id)?;

    println!("\nRun Summary:");
    println!("  Project:       {}", manifest.project_name);
    println!("  Optimizer:     {}", manifest.optimizer);
    println!("  Iterations:    {}", manifest.iterations);
    println!("  Converged:     {}", manifest.converged);
    println!("  Objective:     {:.6e}", best.objective);
    println!("  Infeasibility: {:.6e}", best.infeasibility);

    println!("\nContinuous variables:");
    for v in &best.real_variables {
        println!("  {:<28} {}", v.name, v.value);
    }
    if !best.binary_variables.is_empty() {
        println!("\nBinary variables:");
        for v in &best.binary_variables {
            println!("  {:<28} {}", v.name, v.value);
        }
    }
    println!("\nConstraints:");
    for c in &best.constraints {
        println!("  {:<28} {}", c.name, c.value);
    }
    Ok(())
}
