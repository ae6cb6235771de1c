//! 6x6 state covariance tagged with its frame

use nalgebra::Matrix6;
use serde::{Deserialize, Serialize};

use super::Frame;
use crate::{ConversionError, Result};

/// Covariance of a position+velocity state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Covariance {
    pub matrix: Matrix6<f64>,
    pub frame: Frame,
}

impl Covariance {
    pub fn new(matrix: Matrix6<f64>, frame: Frame) -> Self {
        Self { matrix, frame }
    }

    /// Build from 21 upper-triangular entries listed row by row,
    /// mirroring them into the lower triangle
    pub fn from_upper_triangle(entries: &[f64], frame: Frame) -> Result<Self> {
        if entries.len() != 21 {
            return Err(ConversionError::InvalidShape(format!(
                "upper triangle of a 6x6 matrix has 21 entries, got {}",
                entries.len()
            )));
        }
        let mut matrix = Matrix6::zeros();
        let mut values = entries.iter();
        for i in 0..6 {
            for j in i..6 {
                // Length checked above
                let value = values.next().copied().unwrap_or_default();
                matrix[(i, j)] = value;
                matrix[(j, i)] = value;
            }
        }
        Ok(Self { matrix, frame })
    }

    /// Build from 36 row-major values
    pub fn from_slice(values: &[f64], frame: Frame) -> Result<Self> {
        if values.len() != 36 {
            return Err(ConversionError::InvalidShape(format!(
                "covariance must have 36 entries, got {}",
                values.len()
            )));
        }
        Ok(Self {
            matrix: Matrix6::from_row_slice(values),
            frame,
        })
    }

    /// True when every off-diagonal pair agrees to within `tolerance`
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..6).all(|i| (0..i).all(|j| (self.matrix[(i, j)] - self.matrix[(j, i)]).abs() <= tolerance))
    }
}
