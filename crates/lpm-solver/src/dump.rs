//! Diagnostic dumps of the stiffness arrays and particle positions.
//!
//! Matrix arrays are written one value per line, each preceded by a
//! space; indices are 0-based and values use `{:.5e}`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use lpm_types::{LpmError, LpmResult, ParticleId};
use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;
use crate::stiffness::Stiffness;

/// Position record written by [`write_positions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: ParticleId,
    pub position: [f64; 3],
    pub displacement: [f64; 3],
}

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> LpmResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

fn write_indices(path: &Path, values: &[usize]) -> LpmResult<()> {
    write_lines(path, values.iter().map(|v| format!(" {v}")))
}

fn write_values(path: &Path, values: &[f64]) -> LpmResult<()> {
    write_lines(path, values.iter().map(|v| format!(" {v:.5e}")))
}

/// Writes `matrix_K_global.txt` (values), `matrix_K_pointer.txt`
/// (block-row offsets), `matrix_IK.txt` (row pointer) and
/// `matrix_JK.txt` (column indices) into `dir`, creating it if needed.
pub fn write_matrix_arrays(dir: &Path, stiffness: &Stiffness) -> LpmResult<()> {
    fs::create_dir_all(dir)?;
    let matrix = stiffness.matrix();
    let pattern = matrix.pattern();
    write_values(&dir.join("matrix_K_global.txt"), matrix.values())?;
    write_indices(&dir.join("matrix_K_pointer.txt"), stiffness.k_pointer())?;
    write_indices(&dir.join("matrix_IK.txt"), pattern.row_ptr())?;
    write_indices(&dir.join("matrix_JK.txt"), pattern.col_idx())?;
    tracing::info!(dir = %dir.display(), nnz = pattern.nnz(), "stiffness arrays written");
    Ok(())
}

/// Current positions and displacements of every particle as a JSON array.
pub fn write_positions(path: &Path, assembly: &Assembly) -> LpmResult<()> {
    let records: Vec<PositionRecord> = assembly
        .particles()
        .iter()
        .map(|p| PositionRecord {
            id: p.id,
            position: p.xyz.to_array(),
            displacement: (p.xyz - p.xyz_initial).to_array(),
        })
        .collect();
    let out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(out, &records)
        .map_err(|e| LpmError::Serialization(e.to_string()))?;
    tracing::info!(path = %path.display(), particles = records.len(), "positions written");
    Ok(())
}
