//! Index space of an N-dimensional image
//!
//! An [`ImageGeometry`] describes the grid underneath an image: the number of
//! pixels along each axis, the physical distance between neighbouring pixels
//! along each axis (spacing), and the physical position of the first pixel
//! (origin).
//!
//! # Memory Layout
//!
//! Pixels are stored with axis 0 varying fastest. For a 2D image this is
//! the usual row-major layout: the pixel at (x, y) is at offset
//! `y * width + x`.

use crate::error::{Error, Result};

/// Size, spacing and origin of an N-dimensional grid
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry {
    size: Vec<usize>,
    spacing: Vec<f64>,
    origin: Vec<f64>,
    strides: Vec<usize>,
}

impl ImageGeometry {
    /// Create a geometry with unit spacing and zero origin
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if `size` is empty or any axis has
    /// length 0.
    pub fn new(size: &[usize]) -> Result<Self> {
        if size.is_empty() || size.contains(&0) {
            return Err(Error::InvalidDimension {
                size: size.to_vec(),
            });
        }

        let mut strides = Vec::with_capacity(size.len());
        let mut stride = 1usize;
        for &len in size {
            strides.push(stride);
            stride = stride.checked_mul(len).ok_or_else(|| Error::InvalidDimension {
                size: size.to_vec(),
            })?;
        }

        Ok(ImageGeometry {
            size: size.to_vec(),
            spacing: vec![1.0; size.len()],
            origin: vec![0.0; size.len()],
            strides,
        })
    }

    /// Number of axes
    #[inline]
    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    /// Number of pixels along each axis
    #[inline]
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    /// Physical distance between neighbouring pixels along each axis
    #[inline]
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// Physical position of the pixel at index (0, ..., 0)
    #[inline]
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    /// Offset between neighbouring pixels along each axis, in the flat buffer
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total number of pixels
    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.size.iter().product()
    }

    /// Set the spacing
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the number of components differs
    /// from the number of axes, and `Error::InvalidParameter` if any
    /// component is not a positive finite number.
    pub fn set_spacing(&mut self, spacing: &[f64]) -> Result<()> {
        self.check_axes(spacing.len())?;
        if let Some(bad) = spacing.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(Error::InvalidParameter(format!(
                "spacing must be positive, got {bad}"
            )));
        }
        self.spacing = spacing.to_vec();
        Ok(())
    }

    /// Set the origin
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the number of components differs
    /// from the number of axes.
    pub fn set_origin(&mut self, origin: &[f64]) -> Result<()> {
        self.check_axes(origin.len())?;
        self.origin = origin.to_vec();
        Ok(())
    }

    /// Flat buffer offset of an N-dimensional index
    ///
    /// Returns `None` if the index has the wrong number of components or
    /// lies outside the grid.
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.size.len() {
            return None;
        }
        let mut offset = 0;
        for ((&i, &len), &stride) in index.iter().zip(&self.size).zip(&self.strides) {
            if i >= len {
                return None;
            }
            offset += i * stride;
        }
        Some(offset)
    }

    /// N-dimensional index of a flat buffer offset
    pub fn index(&self, offset: usize) -> Vec<usize> {
        self.size
            .iter()
            .zip(&self.strides)
            .map(|(&len, &stride)| (offset / stride) % len)
            .collect()
    }

    /// Flat offsets of the first pixel of every line along `axis`
    ///
    /// A line along `axis` is the set of pixels that share all index
    /// components except the one for `axis`. Walking a line means starting
    /// at one of these offsets and stepping by `strides()[axis]`
    /// `size()[axis]` times.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= dimension()`.
    pub fn line_starts(&self, axis: usize) -> Vec<usize> {
        let stride = self.strides[axis];
        let len = self.size[axis];
        (0..self.num_pixels())
            .filter(|&offset| (offset / stride) % len == 0)
            .collect()
    }

    /// Check that two geometries describe the same grid
    ///
    /// Size, spacing and origin must all match exactly.
    pub fn same_as(&self, other: &ImageGeometry) -> bool {
        self == other
    }

    fn check_axes(&self, n: usize) -> Result<()> {
        if n != self.size.len() {
            return Err(Error::DimensionMismatch {
                expected: self.size.len(),
                actual: n,
            });
        }
        Ok(())
    }
}
