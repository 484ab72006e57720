//! CSV measurement history.
//!
//! Expected headers:
//! time,weight,std,duration,secondary
//!
//! Example:
//! time,weight,std,duration,secondary
//! 1718000000,4512.3,8.1,42.5,12.0
//! 1718003600,4498.0,11.4,17.2,
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub const HISTORY_HEADERS: [&str; 5] = ["time", "weight", "std", "duration", "secondary"];

/// One stored visit in the order `(timestamp, weight, sigma, duration, secondary)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisitRow {
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub weight: f32,
    pub std: f32,
    /// Seconds.
    pub duration: f32,
    pub secondary: Option<f32>,
}

/// Append-only CSV log; the header row is written when the file is created.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, row: &VisitRow) -> eyre::Result<()> {
        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| eyre::eyre!("open history {:?}: {}", self.path, e))?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        wtr.serialize(row)
            .map_err(|e| eyre::eyre!("write history row {:?}: {}", self.path, e))?;
        wtr.flush()
            .map_err(|e| eyre::eyre!("flush history {:?}: {}", self.path, e))?;
        Ok(())
    }
}

pub fn load_history(path: &Path) -> eyre::Result<Vec<VisitRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open history CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != HISTORY_HEADERS {
        eyre::bail!(
            "history CSV must have headers '{}', got: {}",
            HISTORY_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<VisitRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => eyre::bail!("invalid history row {}: {}", idx + 2, e),
        }
    }
    Ok(rows)
}
