//! Remapping a flat payload into 2-D planes.
//!
//! The payload's linear index varies fastest over the slice index, then the
//! width index, then the height index. The element at height `k`, width `j`,
//! slice `i` lives at `(k * width + j) * slices + i`, and lands at row `j`,
//! column `k` of plane `i`.

use crate::decoder::FlatBuffer;
use crate::error::{NrrdError, Result};

/// Extents of a volume as declared by the size vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Number of planes (first size).
    pub slices: usize,
    /// Rows per plane (second size).
    pub width: usize,
    /// Columns per plane (third size).
    pub height: usize,
}

impl Shape {
    pub fn new(slices: usize, width: usize, height: usize) -> Self {
        Self {
            slices,
            width,
            height,
        }
    }

    /// Total elements, or `None` on overflow.
    pub fn checked_element_count(&self) -> Option<usize> {
        self.slices
            .checked_mul(self.width)?
            .checked_mul(self.height)
    }

    /// Payload bytes at `width` bytes per element, or `None` on overflow.
    pub fn checked_byte_len(&self, width: usize) -> Option<usize> {
        self.checked_element_count()?.checked_mul(width)
    }

    pub fn element_count(&self) -> usize {
        self.slices * self.width * self.height
    }

    #[inline]
    fn offset(&self, slice: usize, row: usize, col: usize) -> usize {
        (col * self.width + row) * self.slices + slice
    }
}

/// One 2-D slice: `rows` x `cols` values stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Plane {
    /// Wrap row-major `data`; its length must be `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(NrrdError::PlaneDataLength {
                rows,
                cols,
                found: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Rows, i.e. the volume width.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns, i.e. the volume height.
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Row-major pixel values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Smallest and largest value. NaNs are skipped.
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Min-max normalize to `[0, 255]` and narrow to bytes for display.
    ///
    /// A constant plane maps to all zeros.
    pub fn to_u8_normalized(&self) -> Vec<u8> {
        let (lo, hi) = self.min_max();
        let range = hi - lo;
        if !range.is_finite() || range <= 0.0 {
            return vec![0; self.data.len()];
        }
        self.data
            .iter()
            .map(|&v| ((v - lo) / range * 255.0).round() as u8)
            .collect()
    }
}

/// Split `buffer` into `shape.slices` independent planes.
pub fn reshape(buffer: &FlatBuffer, shape: Shape) -> Result<Vec<Plane>> {
    let expected = shape.element_count();
    if buffer.len() < expected {
        return Err(NrrdError::TruncatedPayload {
            expected,
            got: buffer.len(),
        });
    }

    let planes = (0..shape.slices)
        .map(|slice| {
            let mut data = Vec::with_capacity(shape.width * shape.height);
            for row in 0..shape.width {
                for col in 0..shape.height {
                    data.push(buffer.get(shape.offset(slice, row, col)));
                }
            }
            Plane {
                rows: shape.width,
                cols: shape.height,
                data,
            }
        })
        .collect();

    Ok(planes)
}

/// Inverse of [`reshape`]: interleave planes back into payload order.
pub fn flatten(planes: &[Plane]) -> Result<(Shape, Vec<f64>)> {
    let first = planes
        .first()
        .ok_or(NrrdError::EmptyVolume)?;
    let shape = Shape::new(planes.len(), first.rows, first.cols);

    if let Some(odd) = planes
        .iter()
        .find(|p| p.rows != shape.width || p.cols != shape.height)
    {
        return Err(NrrdError::PlaneShapeMismatch {
            expected: (shape.width, shape.height),
            found: (odd.rows, odd.cols),
        });
    }

    let mut flat = vec![0.0; shape.element_count()];
    for (slice, plane) in planes.iter().enumerate() {
        for row in 0..shape.width {
            for col in 0..shape.height {
                flat[shape.offset(slice, row, col)] = plane.get(row, col);
            }
        }
    }
    Ok((shape, flat))
}
