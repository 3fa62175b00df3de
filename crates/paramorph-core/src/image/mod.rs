//! Image - N-dimensional pixel grid
//!
//! `Image<T>` stores one `T` per pixel on the grid described by an
//! [`ImageGeometry`]. Two instantiations are used throughout the workspace:
//!
//! - [`BinaryImage`] (`Image<u8>`): 0 is background, anything else is
//!   foreground
//! - [`RealImage`] (`Image<f64>`): intermediate real-valued results
//!
//! # Examples
//!
//! ```
//! use paramorph_core::BinaryImage;
//!
//! // Create a 7x5 binary image
//! let mut image = BinaryImage::new(&[7, 5]).unwrap();
//!
//! image.set(&[3, 2], 1).unwrap();
//! assert_eq!(image.get(&[3, 2]).unwrap(), 1);
//! assert_eq!(image.count_foreground(), 1);
//! ```

pub mod geometry;

pub use geometry::ImageGeometry;

use crate::error::{Error, Result};
use crate::mtime::TimeStamp;

/// N-dimensional image
///
/// Every mutating method advances the image's [`TimeStamp`], so consumers
/// that cache results computed from an image can tell whether the image
/// changed since.
#[derive(Debug, Clone)]
pub struct Image<T> {
    geometry: ImageGeometry,
    data: Vec<T>,
    mtime: TimeStamp,
}

/// Binary image: 0 is background, non-zero is foreground
pub type BinaryImage = Image<u8>;

/// Real-valued image
pub type RealImage = Image<f64>;

impl<T: Copy + Default> Image<T> {
    /// Create a new image with all pixels set to `T::default()`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if `size` is empty or any axis has
    /// length 0.
    pub fn new(size: &[usize]) -> Result<Self> {
        Self::new_with_value(size, T::default())
    }

    /// Create a new image with all pixels set to `value`
    pub fn new_with_value(size: &[usize], value: T) -> Result<Self> {
        let geometry = ImageGeometry::new(size)?;
        let data = vec![value; geometry.num_pixels()];
        Ok(Image {
            geometry,
            data,
            mtime: TimeStamp::now(),
        })
    }

    /// Create a new image on an existing geometry
    ///
    /// Spacing and origin are taken from `geometry`.
    pub fn with_geometry(geometry: &ImageGeometry, value: T) -> Self {
        Image {
            data: vec![value; geometry.num_pixels()],
            geometry: geometry.clone(),
            mtime: TimeStamp::now(),
        }
    }

    /// Create an image from raw data
    ///
    /// # Errors
    ///
    /// Returns an error if the size is invalid or the data length doesn't
    /// match the number of pixels.
    pub fn from_data(size: &[usize], data: Vec<T>) -> Result<Self> {
        let geometry = ImageGeometry::new(size)?;
        if data.len() != geometry.num_pixels() {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match size {:?} = {}",
                data.len(),
                size,
                geometry.num_pixels()
            )));
        }
        Ok(Image {
            geometry,
            data,
            mtime: TimeStamp::now(),
        })
    }

    /// Get the pixel value at `index`
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if `index` has the wrong number of
    /// components, `Error::IndexOutOfBounds` if it lies outside the grid.
    pub fn get(&self, index: &[usize]) -> Result<T> {
        let offset = self.checked_offset(index)?;
        Ok(self.data[offset])
    }

    /// Set the pixel value at `index`
    pub fn set(&mut self, index: &[usize], value: T) -> Result<()> {
        let offset = self.checked_offset(index)?;
        self.data[offset] = value;
        self.mtime.modified();
        Ok(())
    }

    /// Set all pixels to `value`
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
        self.mtime.modified();
    }

    /// Apply `f` to every pixel, keeping the geometry
    pub fn map<U: Copy + Default>(&self, f: impl Fn(T) -> U) -> Image<U> {
        Image {
            geometry: self.geometry.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
            mtime: TimeStamp::now(),
        }
    }

    /// Count pixels whose value satisfies `pred`
    pub fn count(&self, pred: impl Fn(T) -> bool) -> usize {
        self.data.iter().filter(|&&v| pred(v)).count()
    }

    fn checked_offset(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.geometry.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.geometry.dimension(),
                actual: index.len(),
            });
        }
        self.geometry
            .offset(index)
            .ok_or_else(|| Error::IndexOutOfBounds {
                index: index
                    .iter()
                    .zip(self.geometry.strides())
                    .map(|(&i, &s)| i.saturating_mul(s))
                    .fold(0usize, usize::saturating_add),
                len: self.data.len(),
            })
    }
}

impl<T> Image<T> {
    /// The grid this image lives on
    #[inline]
    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    /// Number of axes
    #[inline]
    pub fn dimension(&self) -> usize {
        self.geometry.dimension()
    }

    /// Number of pixels along each axis
    #[inline]
    pub fn size(&self) -> &[usize] {
        self.geometry.size()
    }

    /// Spacing along each axis
    #[inline]
    pub fn spacing(&self) -> &[f64] {
        self.geometry.spacing()
    }

    /// Physical position of the first pixel
    #[inline]
    pub fn origin(&self) -> &[f64] {
        self.geometry.origin()
    }

    /// Total number of pixels
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; an image has at least one pixel
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Set the spacing (see [`ImageGeometry::set_spacing`])
    pub fn set_spacing(&mut self, spacing: &[f64]) -> Result<()> {
        self.geometry.set_spacing(spacing)?;
        self.mtime.modified();
        Ok(())
    }

    /// Set the origin (see [`ImageGeometry::set_origin`])
    pub fn set_origin(&mut self, origin: &[f64]) -> Result<()> {
        self.geometry.set_origin(origin)?;
        self.mtime.modified();
        Ok(())
    }

    /// Get raw access to the pixel data
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Get mutable access to the pixel data
    ///
    /// Advances the modification time whether or not the caller writes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        self.mtime.modified();
        &mut self.data
    }

    /// Last modification time
    #[inline]
    pub fn mtime(&self) -> TimeStamp {
        self.mtime
    }

    /// Check whether two images share size, spacing and origin
    pub fn same_geometry<U>(&self, other: &Image<U>) -> bool {
        self.geometry.same_as(&other.geometry)
    }
}

impl BinaryImage {
    /// Number of foreground (non-zero) pixels
    pub fn count_foreground(&self) -> usize {
        self.count(|v| v != 0)
    }

    /// Check that every pixel is 0 or 1
    pub fn is_binary(&self) -> bool {
        self.data.iter().all(|&v| v <= 1)
    }
}

impl RealImage {
    /// Get the minimum value and its offset
    ///
    /// Returns `None` if every value is NaN.
    pub fn min(&self) -> Option<(f64, usize)> {
        self.data
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, v)| (v, i))
    }

    /// Get the maximum value and its offset
    pub fn max(&self) -> Option<(f64, usize)> {
        self.data
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, v)| (v, i))
    }
}

impl<T: PartialEq> PartialEq for Image<T> {
    /// Images are equal when geometry and pixels match; modification times
    /// are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.geometry == other.geometry && self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_creation() {
        let image = BinaryImage::new(&[10, 20]).unwrap();
        assert_eq!(image.size(), &[10, 20]);
        assert_eq!(image.dimension(), 2);
        assert_eq!(image.len(), 200);
        assert!(image.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_image_creation_with_value() {
        let image = RealImage::new_with_value(&[4, 4, 4], 0.5).unwrap();
        assert!(image.data().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_image_invalid_dimensions() {
        assert!(BinaryImage::new(&[0, 10]).is_err());
        assert!(BinaryImage::new(&[]).is_err());
        assert!(BinaryImage::from_data(&[2, 2], vec![0; 3]).is_err());
    }

    #[test]
    fn test_get_set() {
        let mut image = BinaryImage::new(&[5, 4]).unwrap();
        image.set(&[4, 3], 1).unwrap();
        assert_eq!(image.get(&[4, 3]).unwrap(), 1);
        assert_eq!(image.data()[3 * 5 + 4], 1);

        assert!(matches!(
            image.get(&[5, 0]),
            Err(Error::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            image.get(&[1, 1, 1]),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_mtime_advances_on_mutation() {
        let mut image = BinaryImage::new(&[3, 3]).unwrap();
        let t0 = image.mtime();
        image.set(&[1, 1], 1).unwrap();
        let t1 = image.mtime();
        assert!(t1 > t0);
        image.set_spacing(&[2.0, 2.0]).unwrap();
        assert!(image.mtime() > t1);

        // Reading does not touch the stamp
        let t2 = image.mtime();
        let _ = image.get(&[1, 1]).unwrap();
        assert_eq!(image.mtime(), t2);
    }

    #[test]
    fn test_clone_keeps_mtime() {
        let image = BinaryImage::new(&[3, 3]).unwrap();
        let copy = image.clone();
        assert_eq!(copy.mtime(), image.mtime());
        assert_eq!(copy, image);
    }

    #[test]
    fn test_map_keeps_geometry() {
        let mut image = BinaryImage::new(&[3, 2]).unwrap();
        image.set_spacing(&[0.5, 1.5]).unwrap();
        image.set_origin(&[-1.0, 2.0]).unwrap();
        image.set(&[0, 1], 1).unwrap();

        let real: RealImage = image.map(|v| f64::from(v) * 2.0);
        assert!(real.same_geometry(&image));
        assert_eq!(real.get(&[0, 1]).unwrap(), 2.0);
    }

    #[test]
    fn test_binary_helpers() {
        let mut image = BinaryImage::new(&[3, 3]).unwrap();
        image.set(&[0, 0], 1).unwrap();
        image.set(&[2, 2], 1).unwrap();
        assert_eq!(image.count_foreground(), 2);
        assert!(image.is_binary());

        image.set(&[1, 1], 255).unwrap();
        assert!(!image.is_binary());
        assert_eq!(image.count_foreground(), 3);
    }

    #[test]
    fn test_real_min_max() {
        let image = RealImage::from_data(&[2, 2], vec![3.0, -1.0, 7.5, 0.0]).unwrap();
        assert_eq!(image.min(), Some((-1.0, 1)));
        assert_eq!(image.max(), Some((7.5, 2)));
    }
}
