//! Project file loading.

use std::path::{Path, PathBuf};

use rf_project::Project;
use rf_results::{BestCaseRecord, RunManifest, RunStore};

use crate::error::{AppError, AppResult};

/// Load and validate a project (YAML, or JSON by extension).
pub fn load_project(path: &Path) -> AppResult<Project> {
    if !path.exists() {
        return Err(AppError::ProjectFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(rf_project::load(path)?)
}

pub fn validate_project(project: &Project) -> AppResult<()> {
    rf_project::validate_project(project)?;
    Ok(())
}

/// Directory relative project paths resolve against.
pub fn base_dir(project_path: &Path) -> PathBuf {
    project_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Folder the project writes its summary and run store into.
pub fn output_dir(project: &Project, project_path: &Path) -> PathBuf {
    base_dir(project_path).join(&project.output.folder)
}

/// Stored runs of the project at `project_path`, oldest first.
pub fn list_runs(project_path: &Path) -> AppResult<Vec<RunManifest>> {
    let project = load_project(project_path)?;
    let store = RunStore::for_output(&output_dir(&project, project_path))?;
    Ok(store.list_runs(&project.name)?)
}

pub fn load_run(project_path: &Path, run_id: &str) -> AppResult<(RunManifest, BestCaseRecord)> {
    let project = load_project(project_path)?;
    let store = RunStore::for_output(&output_dir(&project, project_path))?;
    Ok((store.load_manifest(run_id)?, store.load_best_case(run_id)?))
}
