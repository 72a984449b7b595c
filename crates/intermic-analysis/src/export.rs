//! Export formats for estimator diagnostics.
//!
//! The estimator returns numeric series rather than drawing anything; these
//! writers put them in plain CSV so any plotting tool can render them:
//! - trajectory series (estimate and confidence per time fraction)
//! - one frequency column of a feature tensor

use ndarray::{ArrayBase, Data, Ix4};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::estimator::TrajectoryEstimate;
use crate::features::frequency_slice;

/// Write the per-grid-point series of an estimate as CSV.
///
/// Columns: `fraction,frame,estimate,confidence`. A flat frame's infinite
/// confidence is written as `inf`.
///
/// # Example
///
/// ```rust,ignore
/// use intermic_analysis::{TrajectoryEstimator, export::export_trajectory_csv};
///
/// let estimate = TrajectoryEstimator::new().estimate(&pmd, 0)?;
/// export_trajectory_csv(&estimate, "pmd_trajectory.csv")?;
/// ```
pub fn export_trajectory_csv(estimate: &TrajectoryEstimate, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|e| AnalysisError::write_file(path, e))?;
    let mut out = BufWriter::new(file);
    write_trajectory_csv(estimate, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Write the trajectory CSV to any writer.
pub fn write_trajectory_csv(estimate: &TrajectoryEstimate, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "fraction,frame,estimate,confidence")?;
    for i in 0..estimate.len() {
        writeln!(
            out,
            "{:.4},{},{:.6},{:.6}",
            estimate.fractions[i], estimate.frames[i], estimate.estimates[i], estimate.confidences[i]
        )?;
    }
    Ok(())
}

/// Write `tensor[0, :, pair, frame]` as CSV with columns `bin,value`.
pub fn export_slice_csv<S>(
    tensor: &ArrayBase<S, Ix4>,
    pair: usize,
    frame: usize,
    path: impl AsRef<Path>,
) -> Result<()>
where
    S: Data<Elem = f32>,
{
    let column = frequency_slice(tensor, pair, frame)?;
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|e| AnalysisError::write_file(path, e))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "bin,value")?;
    for (bin, value) in column.iter().enumerate() {
        writeln!(out, "{},{:.6}", bin, value)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;
    use tempfile::NamedTempFile;

    fn sample_estimate() -> TrajectoryEstimate {
        TrajectoryEstimate {
            pair: 0,
            value: 0.5,
            best_index: 1,
            fractions: vec![0.25, 0.5, 0.75],
            frames: vec![1, 2, 3],
            estimates: vec![0.4, 0.5, 0.6],
            confidences: vec![2.0, f32::INFINITY, 3.0],
        }
    }

    #[test]
    fn test_trajectory_csv() {
        let mut buf = Vec::new();
        write_trajectory_csv(&sample_estimate(), &mut buf).unwrap();
        let content = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "fraction,frame,estimate,confidence");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "0.2500,1,0.400000,2.000000");
        assert!(lines[2].ends_with("inf"), "got: {}", lines[2]);
    }

    #[test]
    fn test_trajectory_csv_file() {
        let temp_file = NamedTempFile::new().unwrap();
        export_trajectory_csv(&sample_estimate(), temp_file.path()).unwrap();
        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("fraction,frame"));
    }

    #[test]
    fn test_slice_csv() {
        let tensor = Array4::from_shape_fn((1, 3, 2, 2), |(_, f, c, _)| f as f32 + 10.0 * c as f32);
        let temp_file = NamedTempFile::new().unwrap();
        export_slice_csv(&tensor, 1, 0, temp_file.path()).unwrap();
        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "bin,value\n0,10.000000\n1,11.000000\n2,12.000000\n");
    }

    #[test]
    fn test_slice_csv_wide_column_complete() {
        let bins = 4097;
        let tensor = Array4::from_shape_fn((1, bins, 1, 3), |(_, f, _, t)| f as f32 * 0.5 + t as f32);
        let temp_file = NamedTempFile::new().unwrap();
        export_slice_csv(&tensor, 0, 2, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), bins + 1);
        assert_eq!(lines[1], "0,2.000000");
        assert_eq!(lines[bins], "4096,2050.000000");
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_slice_csv_bad_pair() {
        let tensor = Array4::<f32>::zeros((1, 3, 1, 2));
        let temp_file = NamedTempFile::new().unwrap();
        assert!(matches!(
            export_slice_csv(&tensor, 1, 0, temp_file.path()),
            Err(AnalysisError::PairOutOfRange { .. })
        ));
    }
}
