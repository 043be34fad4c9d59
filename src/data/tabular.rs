//! Feather (Arrow IPC file) reader producing JSON row objects.

use crate::errors::{AppError, AppResult};
use arrow::ipc::reader::FileReader;
use arrow::json::{writer::JsonArray, WriterBuilder};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One record, keyed by column name in allow-list order.
pub type Row = serde_json::Map<String, serde_json::Value>;

pub const COLUMNAR_EXTENSION: &str = ".feather";

pub const TIMELINE_COLUMNS: &[&str] = &["time", "queue_length", "mean_wait_time", "mean_travel_time"];
pub const PASSENGER_COLUMNS: &[&str] = &["wait_time", "travel_time"];

/// Reads `columns` from the file at `path`, preserving record order.
pub fn read_rows(path: &Path, columns: &[&str]) -> AppResult<Vec<Row>> {
    let file = File::open(path)?;
    let reader = FileReader::try_new(BufReader::new(file), None)
        .map_err(|e| AppError::DataFormat(format!("{}: {e}", path.display())))?;
    let schema = reader.schema();
    let projection = columns
        .iter()
        .map(|c| {
            schema
                .index_of(c)
                .map_err(|_| AppError::DataFormat(format!("{}: missing column {c}", path.display())))
        })
        .collect::<AppResult<Vec<_>>>()?;

    let mut writer = WriterBuilder::new().with_explicit_nulls(true).build::<_, JsonArray>(Vec::new());
    let mut batches = 0usize;
    for batch in reader {
        let batch = batch?.project(&projection)?;
        writer.write(&batch)?;
        batches += 1;
    }
    writer.finish()?;
    let buf = writer.into_inner();
    tracing::debug!(path = %path.display(), batches, bytes = buf.len(), "read columnar file");
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&buf).map_err(|e| AppError::DataFormat(format!("{}: {e}", path.display())))
}
