//! Result sinks — the external-collaborator seam for persistence.
//!
//! Plain tabular exports: one column per series, one row per path or
//! observation, plus a JSON summary of the headline numbers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{Result, RiskError};

/// Write the simulated PnL distribution, one row per path.
pub fn write_pnl_csv(path: &Path, pnl: &[f64]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "pnl")?;
    for v in pnl {
        writeln!(w, "{v}")?;
    }
    w.flush()?;
    info!(rows = pnl.len(), path = %path.display(), "wrote PnL distribution");
    Ok(())
}

/// Write labeled volatility series side by side (e.g. EWMA vs GARCH),
/// one row per observation. All series must have equal length.
pub fn write_volatility_csv(path: &Path, labeled: &[(&str, &[f64])]) -> Result<()> {
    if labeled.is_empty() {
        return Err(RiskError::invalid_data("no volatility series to export"));
    }
    let rows = labeled[0].1.len();
    if labeled.iter().any(|(_, s)| s.len() != rows) {
        return Err(RiskError::invalid_data(format!(
            "volatility series lengths differ: {:?}",
            labeled.iter().map(|(l, s)| (*l, s.len())).collect::<Vec<_>>()
        )));
    }

    let mut w = BufWriter::new(File::create(path)?);
    let header: Vec<&str> = labeled.iter().map(|(l, _)| *l).collect();
    writeln!(w, "{}", header.join(","))?;
    for i in 0..rows {
        let row: Vec<String> = labeled.iter().map(|(_, s)| s[i].to_string()).collect();
        writeln!(w, "{}", row.join(","))?;
    }
    w.flush()?;
    info!(rows, series = labeled.len(), path = %path.display(), "wrote volatility series");
    Ok(())
}

/// Serialize any summary value (typically `RiskReport`) as pretty JSON.
pub fn write_summary_json<T: Serialize>(path: &Path, summary: &T) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, summary)?;
    writeln!(w)?;
    w.flush()?;
    info!(path = %path.display(), "wrote summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pnl_csv_round_trips_row_count() {
        let path = std::env::temp_dir().join("var_engine_pnl_test.csv");
        write_pnl_csv(&path, &[-1.5, 0.25, 2.0]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "pnl");
        assert_eq!(lines.len(), 4);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn volatility_csv_requires_equal_lengths() {
        let path = std::env::temp_dir().join("var_engine_vol_test.csv");
        let err = write_volatility_csv(&path, &[("ewma", &[1.0, 2.0]), ("garch", &[1.0])]);
        assert!(matches!(err, Err(RiskError::InvalidData { .. })));

        write_volatility_csv(&path, &[("ewma", &[1.0, 2.0]), ("garch", &[0.9, 1.1])]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("ewma,garch"));
        assert_eq!(text.lines().count(), 3);
        std::fs::remove_file(&path).ok();
    }
}
