//! Documents exchanged with a reservoir simulator through its folder.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rf_components::{ControlMode, Stream, WellKind};
use rf_model::Model;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Control applied to a well over one schedule step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalControl {
    pub end_time: f64,
    pub mode: ControlMode,
    pub value: f64,
    /// Gas-lift rate (Sm3/day), zero without gas lift.
    #[serde(default)]
    pub gas_lift: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellControls {
    pub name: String,
    pub kind: WellKind,
    pub intervals: Vec<IntervalControl>,
}

/// Everything the reservoir needs to know for one run: `well_controls.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    pub schedule: Vec<f64>,
    pub wells: Vec<WellControls>,
}

impl ControlSnapshot {
    /// Sample every well's controls at each schedule step.
    pub fn from_model(model: &Model) -> SimResult<Self> {
        let store = model.variables();
        let mut wells = Vec::new();
        for (_, well) in model.wells() {
            let mut intervals = Vec::with_capacity(model.schedule().len());
            for t in model.schedule() {
                let control = well.control_at(*t).ok_or_else(|| SimError::InvalidInput {
                    what: format!("well '{}' has no controls", well.name),
                })?;
                intervals.push(IntervalControl {
                    end_time: *t,
                    mode: control.mode,
                    value: store.real_value(control.var),
                    gas_lift: well.gas_lift_at(*t, store),
                });
            }
            wells.push(WellControls {
                name: well.name.clone(),
                kind: well.kind,
                intervals,
            });
        }
        Ok(Self {
            schedule: model.schedule().to_vec(),
            wells,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellStreams {
    pub name: String,
    pub streams: Vec<Stream>,
}

/// Reservoir response for one run: `well_streams.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellStreamsFile {
    pub wells: Vec<WellStreams>,
}

impl WellStreamsFile {
    /// Copy the streams into the model; every model well must be present.
    pub fn apply(&self, model: &mut Model) -> SimResult<()> {
        let ids: Vec<_> = model
            .wells()
            .map(|(id, w)| (id, w.name.clone()))
            .collect();
        for (id, name) in ids {
            let streams = self
                .wells
                .iter()
                .find(|w| w.name == name)
                .ok_or(SimError::MissingWell { name })?;
            model.set_well_streams(id, streams.streams.clone())?;
        }
        Ok(())
    }
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> SimResult<()> {
    let file = File::create(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| SimError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> SimResult<T> {
    let file = File::open(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| SimError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn ensure_folder(folder: &Path) -> SimResult<()> {
    std::fs::create_dir_all(folder).map_err(|source| SimError::Io {
        path: folder.to_path_buf(),
        source,
    })
}
