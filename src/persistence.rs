// Result Store - serializes the simulation result document to disk.
// The pretty-printed JSON file is the only durable artifact of a run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SimulationError};
use crate::simulation::SimulationResult;

#[derive(Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the result document, creating parent directories as needed.
    pub fn save(&self, result: &SimulationResult) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SimulationError::Persist {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let document = serde_json::to_string_pretty(result).map_err(SimulationError::Encode)?;
        fs::write(&self.path, document).map_err(|source| SimulationError::Persist {
            path: self.path.clone(),
            source,
        })?;

        Ok(self.path.clone())
    }
}
