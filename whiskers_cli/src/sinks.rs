//! Where visit records and calibration results go from the CLI.

use std::path::PathBuf;

use eyre::WrapErr;
use whiskers_config::{Config, HistoryLog, VisitRow};
use whiskers_core::{CalibrationOutcome, CalibrationStore, RecordSink, VisitRecord};

/// Appends every record to the history CSV and echoes it on stdout.
#[derive(Debug)]
pub struct CsvRecordSink {
    history: Option<HistoryLog>,
    json: bool,
}

impl CsvRecordSink {
    pub fn new(history: Option<HistoryLog>, json: bool) -> Self {
        Self { history, json }
    }
}

pub fn print_record(record: &VisitRecord, json: bool) {
    if json {
        match serde_json::to_string(record) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "record not serializable"),
        }
    } else {
        let secondary = record
            .secondary_g
            .map(|g| format!(", residue {g:.0} g"))
            .unwrap_or_default();
        println!(
            "visit: {:.0} g (sigma {:.1} g) for {:.1} s{secondary}",
            record.weight_g, record.sigma_g, record.duration_s
        );
    }
}

impl RecordSink for CsvRecordSink {
    fn deliver(&mut self, record: &VisitRecord) -> eyre::Result<()> {
        print_record(record, self.json);
        if let Some(history) = &self.history {
            history.append(&VisitRow::from(record))?;
            tracing::debug!(path = %history.path().display(), "record appended");
        }
        Ok(())
    }
}

/// Writes a new scale factor and offset back into the config file.
#[derive(Debug)]
pub struct ConfigCalibrationStore {
    path: PathBuf,
    cfg: Config,
}

impl ConfigCalibrationStore {
    pub fn new(path: PathBuf, cfg: Config) -> Self {
        Self { path, cfg }
    }
}

impl CalibrationStore for ConfigCalibrationStore {
    fn persist(&mut self, outcome: &CalibrationOutcome) -> eyre::Result<()> {
        self.cfg.scale.scale_factor = outcome.scale_factor;
        self.cfg.scale.offset_counts = outcome.offset_counts;
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .wrap_err_with(|| format!("create config dir {}", dir.display()))?;
        }
        self.cfg.save_atomic(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            scale_factor = outcome.scale_factor,
            offset_counts = outcome.offset_counts,
            "calibration saved"
        );
        Ok(())
    }
}
