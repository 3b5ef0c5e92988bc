// demos/minimal/src/main.rs
// ============================================================================
// Module: Tunebank Minimal Demo
// Description: Minimal end-to-end tuning-database session over SQLite.
// Purpose: Demonstrate workload dedup, record commits, and top-k retrieval.
// Dependencies: tunebank-core, tunebank-store-sqlite, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Commits two workloads (one of them twice, with differing accessory spans)
//! and a handful of tuning records into a temporary work directory, then
//! reopens the database from disk and prints the ranked top-k. Suitable for
//! quick verification of the full write/reload/read path.

use std::io::Write;
use std::sync::Arc;

use serde_json::json;
use tunebank_core::ArgInfo;
use tunebank_core::JsonProgramCodec;
use tunebank_core::MAX_MEAN_TIME;
use tunebank_core::RecordDatabase;
use tunebank_core::Target;
use tunebank_core::Trace;
use tunebank_core::TuningRecord;
use tunebank_core::Workload;
use tunebank_store_sqlite::SqliteDatabase;
use tunebank_store_sqlite::SqliteDatabaseConfig;

/// Builds a record with the given schedule name and measurements.
fn record(
    workload: &Arc<Workload<serde_json::Value>>,
    schedule: &str,
    run_secs: Option<Vec<f64>>,
) -> TuningRecord<serde_json::Value> {
    TuningRecord::new(
        Arc::clone(workload),
        Trace::new(json!([{ "kind": "schedule", "name": schedule }])),
        run_secs,
        Target::new(json!({ "kind": "llvm", "mcpu": "core-avx2", "num_cores": 4 })),
        vec![
            ArgInfo::new(json!({ "dtype": "float32", "shape": [1, 3, 224, 224] })),
            ArgInfo::new(json!({ "dtype": "float32", "shape": [1, 1000] })),
        ],
    )
}

/// Runs the demo session.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let work_dir = tempfile::TempDir::new()?;
    let config = SqliteDatabaseConfig::for_work_dir(work_dir.path());

    {
        let mut database = SqliteDatabase::new(&config, JsonProgramCodec::new())?;
        let conv2d = database.commit_workload(json!({
            "op": "conv2d",
            "inputs": [[1, 3, 224, 224], [64, 3, 7, 7]],
            "span": { "file": "resnet18.py", "line": 12 },
        }))?;
        let dense = database.commit_workload(json!({
            "op": "dense",
            "inputs": [[1, 512], [1000, 512]],
        }))?;
        // Same structure as conv2d, different span: must dedup.
        let again = database.commit_workload(json!({
            "op": "conv2d",
            "inputs": [[1, 3, 224, 224], [64, 3, 7, 7]],
            "span": { "file": "resnet18.py", "line": 48 },
        }))?;
        if conv2d.shash() != again.shash() {
            return Err("duplicate conv2d commit produced a different workload".into());
        }

        database.commit_tuning_record(&record(&conv2d, "tile-8x8", Some(vec![3.1, 2.9])))?;
        database.commit_tuning_record(&record(&conv2d, "tile-16x4", Some(vec![1.4, 1.6])))?;
        database.commit_tuning_record(&record(&conv2d, "vectorize", Some(vec![MAX_MEAN_TIME])))?;
        database.commit_tuning_record(&record(&conv2d, "unmeasured", None))?;
        database.commit_tuning_record(&record(&dense, "parallel", Some(vec![0.8])))?;
    }

    // Reopen from disk: workload indices and records must survive.
    let database = SqliteDatabase::new(&config, JsonProgramCodec::new())?;
    let conv2d = database
        .registry()
        .get(tunebank_core::WorkloadIndex::new(0))
        .ok_or("workload 0 missing after reload")?
        .clone();
    let best = database.get_top_k(&conv2d, 2)?;

    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "records on disk: {}", database.size()?)?;
    writeln!(&mut stdout, "top-{} for conv2d (shash {}):", best.len(), conv2d.shash())?;
    for entry in &best {
        let samples = entry.run_secs().unwrap_or(&[]);
        let mean: f64 = samples.iter().sum::<f64>() / samples.len().max(1) as f64;
        writeln!(&mut stdout, "  trace {} mean {mean:.3}s", entry.trace().as_value())?;
    }
    Ok(())
}
