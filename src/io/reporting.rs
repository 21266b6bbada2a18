// src/io/reporting.rs

use log::info;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::simulation::events::GameEvent;
use crate::simulation::snapshot::HistoryRecord;

/// Writes the simulation history to a CSV file.
///
/// # Arguments
/// * `file_path` - The path to save the file (e.g., "results/run_1.csv").
/// * `data` - The history records from the simulation engine.
pub fn write_simulation_log<P: AsRef<Path>>(
    file_path: P,
    data: &[HistoryRecord],
) -> Result<(), csv::Error> {
    let path = file_path.as_ref();
    let wtr = csv::Writer::from_path(path)?;
    write_records(wtr, data)?;

    info!("Exported {} rows to '{}'", data.len(), path.display());
    Ok(())
}

/// Writes the event log to a CSV file.
pub fn write_event_log<P: AsRef<Path>>(
    file_path: P,
    events: &[GameEvent],
) -> Result<(), csv::Error> {
    let path = file_path.as_ref();
    let wtr = csv::Writer::from_path(path)?;
    write_records(wtr, events)?;

    info!("Exported {} events to '{}'", events.len(), path.display());
    Ok(())
}

/// Serializes `records` as CSV into any writer, header included.
pub fn write_records<W: Write, T: Serialize>(
    mut wtr: csv::Writer<W>,
    records: &[T],
) -> Result<(), csv::Error> {
    for record in records {
        wtr.serialize(record)?;
    }
    // Flush the buffer to ensure all data is written
    wtr.flush()?;
    Ok(())
}
