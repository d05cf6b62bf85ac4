// Report sinks
//
// Delivery targets for finished reports. Sinks serialize access to their
// output behind an async mutex; the classification path itself stays
// lock-free.

use crate::config::{ReportFormat, ReportSettings};
use crate::errors::ReportError;
use crate::models::Report;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::info;

/// ReportSink receives finished reports
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Deliver one report
    async fn write(&self, report: &Report) -> Result<(), ReportError>;

    /// Flush buffered output; called once after the last write
    async fn finalize(&self) -> Result<(), ReportError>;
}

/// Build the sink selected by settings
pub async fn from_settings(settings: &ReportSettings) -> Result<Arc<dyn ReportSink>, ReportError> {
    let sink: Arc<dyn ReportSink> = match settings.format {
        ReportFormat::Json => Arc::new(JsonLinesSink::create(&settings.output_path).await?),
        ReportFormat::Text => Arc::new(TextFileSink::create(&settings.output_path).await?),
        ReportFormat::Csv => Arc::new(CsvSink::create(&settings.output_path).await?),
    };
    info!(
        format = ?settings.format,
        output_path = %settings.output_path,
        "Report sink ready"
    );
    Ok(sink)
}

async fn create_output_file(path: &Path) -> Result<File, ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(File::create(path).await?)
}

/// One JSON object per line, the machine-readable format
pub struct JsonLinesSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    pub async fn create<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let file = create_output_file(path.as_ref()).await?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

#[async_trait]
impl ReportSink for JsonLinesSink {
    async fn write(&self, report: &Report) -> Result<(), ReportError> {
        let mut line = serde_json::to_vec(report)?;
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        Ok(())
    }

    async fn finalize(&self) -> Result<(), ReportError> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

/// Human-readable rendering, one blank-line-separated block per report
pub struct TextFileSink {
    writer: Mutex<BufWriter<File>>,
}

impl TextFileSink {
    pub async fn create<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let file = create_output_file(path.as_ref()).await?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

#[async_trait]
impl ReportSink for TextFileSink {
    async fn write(&self, report: &Report) -> Result<(), ReportError> {
        let mut block = report.to_string();
        block.push('\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(block.as_bytes()).await?;
        Ok(())
    }

    async fn finalize(&self) -> Result<(), ReportError> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

struct CsvRow {
    unit: String,
    status: String,
    trigger: String,
    persistent: String,
    reasons: String,
    notes: String,
}

/// Summary table for spreadsheet review; the full detail stays in the JSON
/// format
pub struct CsvSink {
    path: PathBuf,
    rows: Mutex<Vec<CsvRow>>,
}

impl CsvSink {
    pub async fn create<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(Self {
            path,
            rows: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ReportSink for CsvSink {
    async fn write(&self, report: &Report) -> Result<(), ReportError> {
        let row = CsvRow {
            unit: report.unit.clone(),
            status: report.status.to_string(),
            trigger: report
                .job
                .as_ref()
                .map(|job| job.trigger.to_string())
                .unwrap_or_default(),
            persistent: report
                .job
                .as_ref()
                .map(|job| job.persistent.to_string())
                .unwrap_or_default(),
            reasons: report.reasons.join("; "),
            notes: report.notes.join("; "),
        };
        self.rows.lock().await.push(row);
        Ok(())
    }

    async fn finalize(&self) -> Result<(), ReportError> {
        let rows = self.rows.lock().await;
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["unit", "status", "trigger", "persistent", "reasons", "notes"])?;
        for row in rows.iter() {
            writer.write_record([
                row.unit.as_str(),
                row.status.as_str(),
                row.trigger.as_str(),
                row.persistent.as_str(),
                row.reasons.as_str(),
                row.notes.as_str(),
            ])?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| ReportError::Io(std::io::Error::other(e.to_string())))?;
        tokio::fs::write(&self.path, data).await?;
        info!(path = %self.path.display(), rows = rows.len(), "CSV report written");
        Ok(())
    }
}
