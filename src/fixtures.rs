//! Feather and directory fixtures shared by the unit tests.

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::ipc::writer::{FileWriter, IpcWriteOptions};
use arrow::ipc::CompressionType;
use arrow::record_batch::RecordBatch;
use serde_json::json;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

fn write_batches(path: &Path, batches: &[RecordBatch]) {
    write_batches_with(path, batches, None);
}

fn write_batches_with(path: &Path, batches: &[RecordBatch], compression: Option<CompressionType>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    let options = IpcWriteOptions::default().try_with_compression(compression).unwrap();
    let mut writer = FileWriter::try_new_with_options(file, &batches[0].schema(), options).unwrap();
    for b in batches {
        writer.write(b).unwrap();
    }
    writer.finish().unwrap();
}

/// `n` timeline records plus an `extra` column that readers must drop.
pub fn write_timeline(path: &Path, n: usize) {
    let idx: Vec<i64> = (0..n as i64).collect();
    let batch = RecordBatch::try_from_iter(vec![
        ("extra", Arc::new(StringArray::from(vec!["x"; n])) as ArrayRef),
        ("mean_travel_time", Arc::new(Float64Array::from_iter_values(idx.iter().map(|i| *i as f64 * 3.0 + 0.5))) as ArrayRef),
        ("time", Arc::new(Float64Array::from_iter_values(idx.iter().map(|i| *i as f64 * 60.0 + 0.5))) as ArrayRef),
        ("queue_length", Arc::new(Int64Array::from(idx.clone())) as ArrayRef),
        ("mean_wait_time", Arc::new(Float64Array::from_iter_values(idx.iter().map(|i| *i as f64 + 0.25))) as ArrayRef),
    ])
    .unwrap();
    write_batches(path, &[batch]);
}

/// The `i`-th record written by [`write_timeline`], restricted to the timeline columns.
pub fn timeline_row(i: usize) -> serde_json::Value {
    let f = i as f64;
    json!({
        "time": f * 60.0 + 0.5,
        "queue_length": i as i64,
        "mean_wait_time": f + 0.25,
        "mean_travel_time": f * 3.0 + 0.5,
    })
}

/// One batch per slice; `travel_time` is twice `wait_time`.
pub fn write_passenger_batches(path: &Path, waits: &[&[f64]]) {
    write_passenger_compressed(path, waits, None);
}

/// Same layout as [`write_passenger_batches`], with body buffers compressed the way pandas writes them.
pub fn write_passenger_compressed(path: &Path, waits: &[&[f64]], compression: Option<CompressionType>) {
    let batches: Vec<RecordBatch> = waits
        .iter()
        .map(|w| {
            RecordBatch::try_from_iter(vec![
                ("passenger_id", Arc::new(Int64Array::from_iter_values(0..w.len() as i64)) as ArrayRef),
                ("wait_time", Arc::new(Float64Array::from(w.to_vec())) as ArrayRef),
                ("travel_time", Arc::new(Float64Array::from_iter_values(w.iter().map(|x| x * 2.0))) as ArrayRef),
            ])
            .unwrap()
        })
        .collect();
    write_batches_with(path, &batches, compression);
}

pub fn write_passenger_with_null(path: &Path) {
    let batch = RecordBatch::try_from_iter(vec![
        ("wait_time", Arc::new(Float64Array::from(vec![None, Some(1.0)])) as ArrayRef),
        ("travel_time", Arc::new(Float64Array::from(vec![Some(7.5), Some(2.0)])) as ArrayRef),
    ])
    .unwrap();
    write_batches(path, &[batch]);
}
