// Writes finished reports as JSON files for the external renderer / notifier.

use chrono::Local;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::models::ReportData;

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `inspection_report_<YYYYmmdd_HHMMSS>.json`, stamped with the report's local time.
    pub fn file_name(report: &ReportData) -> String {
        format!("{}.json", Self::file_stem(report))
    }

    fn file_stem(report: &ReportData) -> String {
        format!(
            "inspection_report_{}",
            report
                .timestamp
                .with_timezone(&Local)
                .format("%Y%m%d_%H%M%S")
        )
    }

    /// Creates the output directory if needed and writes the report. Returns the file path.
    /// An existing report with the same name is never overwritten; `_2`, `_3`, ... is
    /// appended instead.
    pub async fn write(&self, report: &ReportData) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let json = serde_json::to_vec_pretty(report)?;
        let stem = Self::file_stem(report);
        let mut n = 1;
        loop {
            let name = match n {
                1 => format!("{stem}.json"),
                _ => format!("{stem}_{n}.json"),
            };
            let path = self.output_dir.join(name);
            let opened = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match opened {
                Ok(mut file) => {
                    file.write_all(&json).await?;
                    file.flush().await?;
                    tracing::info!(
                        project = %report.project,
                        path = %path.display(),
                        hosts = report.host_summary.len(),
                        "report written"
                    );
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
