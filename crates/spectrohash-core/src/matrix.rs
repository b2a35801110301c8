//! Dense matrices used for spectrograms and feature planes
//!
//! Rows index frequency (or feature) bins and columns index time frames.

use crate::error::{Result, SpectroHashError};
use ndarray::Array2;

pub type Matrix = Array2<f64>;

/// Build a matrix whose columns are the given frames
pub fn from_columns(columns: &[Vec<f64>]) -> Result<Matrix> {
    let rows = columns.first().map_or(0, Vec::len);
    if columns.iter().any(|c| c.len() != rows) {
        return Err(SpectroHashError::invalid("matrix columns differ in length"));
    }
    Ok(Array2::from_shape_fn((rows, columns.len()), |(row, col)| {
        columns[col][row]
    }))
}

/// `lhs · rhs`, rejecting mismatched inner dimensions instead of panicking
pub fn checked_dot(lhs: &Matrix, rhs: &Matrix) -> Result<Matrix> {
    if lhs.ncols() != rhs.nrows() {
        return Err(SpectroHashError::invalid(format!(
            "cannot multiply {}x{} by {}x{}",
            lhs.nrows(),
            lhs.ncols(),
            rhs.nrows(),
            rhs.ncols()
        )));
    }
    Ok(lhs.dot(rhs))
}
