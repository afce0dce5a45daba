//! Roster sources
//!
//! The roster is owned by an external system; these adapters read an exported
//! copy from disk so the hierarchy engine can be driven locally.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::domain::EmployeeRecord;
use crate::infrastructure::{InfraError, InfraResult};

/// Supplier of the employee roster.
pub trait RosterSource {
    /// Load all employee records in source order.
    fn load(&self) -> InfraResult<Vec<EmployeeRecord>>;
}

/// Roster exported to a JSON array or a CSV sheet.
#[derive(Debug, Clone)]
pub struct RosterFile {
    path: PathBuf,
}

impl RosterFile {
    /// Create a roster file source; `~` and `$VAR` in the path are expanded.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy();
        let expanded = shellexpand::full(&raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        Self {
            path: PathBuf::from(expanded),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    fn load_json(&self) -> InfraResult<Vec<EmployeeRecord>> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| InfraError::io(format!("read roster {}", self.path.display()), e))?;
        serde_json::from_str(&content).map_err(|e| InfraError::parse(&self.path, e))
    }

    fn load_csv(&self) -> InfraResult<Vec<EmployeeRecord>> {
        let file = std::fs::File::open(&self.path)
            .map_err(|e| InfraError::io(format!("read roster {}", self.path.display()), e))?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);
        reader
            .deserialize()
            .collect::<Result<Vec<EmployeeRecord>, _>>()
            .map_err(|e| InfraError::parse(&self.path, e))
    }
}

impl RosterSource for RosterFile {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> InfraResult<Vec<EmployeeRecord>> {
        let records = match self.extension().as_deref() {
            Some("json") => self.load_json()?,
            Some("csv") => self.load_csv()?,
            _ => return Err(InfraError::UnsupportedFormat(self.path.clone())),
        };
        debug!("loaded {} roster record(s)", records.len());
        Ok(records)
    }
}
