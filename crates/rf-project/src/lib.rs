//! rf-project: driver file format and validation.
//!
//! A driver file describes one production network (wells, pipes,
//! separators, boosters, capacity groups), the control schedule, the
//! objective, the reservoir simulator to couple with and the optimizer to
//! run. Every load validates before handing the project out.

use std::path::Path;

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{LATEST_VERSION, ValidationError, validate_project};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk encodings of a driver file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.json` is JSON, anything else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Parse and validate a project held in memory.
pub fn parse(content: &str, format: Format) -> ProjectResult<Project> {
    let project: Project = match format {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    validate_project(&project)?;
    Ok(project)
}

pub fn from_yaml_str(content: &str) -> ProjectResult<Project> {
    parse(content, Format::Yaml)
}

/// Validate, then render. Invalid projects are never written out.
pub fn render(project: &Project, format: Format) -> ProjectResult<String> {
    validate_project(project)?;
    Ok(match format {
        Format::Yaml => serde_yaml::to_string(project)?,
        Format::Json => serde_json::to_string_pretty(project)?,
    })
}

pub fn load_yaml(path: &Path) -> ProjectResult<Project> {
    parse(&std::fs::read_to_string(path)?, Format::Yaml)
}

pub fn load_json(path: &Path) -> ProjectResult<Project> {
    parse(&std::fs::read_to_string(path)?, Format::Json)
}

pub fn save_yaml(path: &Path, project: &Project) -> ProjectResult<()> {
    std::fs::write(path, render(project, Format::Yaml)?)?;
    Ok(())
}

pub fn save_json(path: &Path, project: &Project) -> ProjectResult<()> {
    std::fs::write(path, render(project, Format::Json)?)?;
    Ok(())
}

/// Load in the format implied by the file extension.
pub fn load(path: &Path) -> ProjectResult<Project> {
    parse(&std::fs::read_to_string(path)?, Format::from_path(path))
}
