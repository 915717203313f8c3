// Sigwatch Exporter - Poll loop and Prometheus exporter
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Report emission
//!
//! A batch leaves the process as one JSON array, one object per report, in
//! configured device order.

use crate::error::Result;
use sigwatch::ReportBatch;
use std::io::Write;
use std::path::Path;

/// Render a batch as a JSON array
pub fn render(batch: &ReportBatch, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(&batch.reports)?
    } else {
        serde_json::to_string(&batch.reports)?
    };
    Ok(text)
}

/// Write a batch followed by a newline
pub fn write_batch<W: Write>(writer: &mut W, batch: &ReportBatch, pretty: bool) -> Result<()> {
    let text = render(batch, pretty)?;
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Print a batch to stdout
pub fn print_batch(batch: &ReportBatch, pretty: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    write_batch(&mut lock, batch, pretty)
}

/// Write a batch to a file, replacing it
pub fn save_batch(path: impl AsRef<Path>, batch: &ReportBatch, pretty: bool) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_batch(&mut file, batch, pretty)
}
