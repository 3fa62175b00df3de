//! Regression check bookkeeping
//!
//! A [`RegParams`] numbers every check it runs and keeps a message for
//! each one that fails, so a single `*_reg` test reports all of its
//! differences at once instead of stopping at the first.

use paramorph_core::Image;

/// State of one named regression run
pub struct RegParams {
    /// Name used in failure messages
    pub test_name: String,
    index: usize,
    failures: Vec<String>,
}

impl RegParams {
    pub fn new(test_name: &str) -> Self {
        eprintln!();
        eprintln!("==== {test_name}_reg ====");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            failures: Vec::new(),
        }
    }

    /// Number of checks run so far
    pub fn index(&self) -> usize {
        self.index
    }

    fn record_failure(&mut self, msg: String) {
        eprintln!("{msg}");
        self.failures.push(msg);
    }

    /// Check `|expected - actual| <= delta`
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();
        if diff <= delta {
            return true;
        }
        self.record_failure(format!(
            "{}_reg check {}: expected {expected}, got {actual} (diff {diff} > {delta})",
            self.test_name, self.index
        ));
        false
    }

    /// Check that two images have the same geometry and pixels
    ///
    /// On a pixel difference the message names the first differing index.
    pub fn compare_images<T>(&mut self, image1: &Image<T>, image2: &Image<T>) -> bool
    where
        T: Copy + Default + PartialEq + std::fmt::Debug,
    {
        self.index += 1;

        if !image1.same_geometry(image2) {
            self.record_failure(format!(
                "{}_reg check {}: geometry differs (size {:?} vs {:?}, spacing {:?} vs {:?})",
                self.test_name,
                self.index,
                image1.size(),
                image2.size(),
                image1.spacing(),
                image2.spacing()
            ));
            return false;
        }

        let first_diff = image1
            .data()
            .iter()
            .zip(image2.data())
            .position(|(a, b)| a != b);
        match first_diff {
            None => true,
            Some(offset) => {
                self.record_failure(format!(
                    "{}_reg check {}: pixel {:?} differs ({:?} vs {:?})",
                    self.test_name,
                    self.index,
                    image1.geometry().index(offset),
                    image1.data()[offset],
                    image2.data()[offset]
                ));
                false
            }
        }
    }

    /// Print the summary and consume the run; `true` if every check passed
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg ({} failed)", self.test_name, self.failures.len());
            for failure in &self.failures {
                eprintln!("  {failure}");
            }
        }
        eprintln!();
        self.failures.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramorph_core::{BinaryImage, RealImage};

    #[test]
    fn test_compare_values_success() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.0, 0.0));
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert_eq!(rp.index(), 2);
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::new("test");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(rp.compare_values(1.0, 1.0, 0.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 1);
        assert!(!rp.cleanup());
    }

    #[test]
    fn test_compare_images() {
        let mut rp = RegParams::new("test");
        let a = BinaryImage::new(&[4, 4]).unwrap();
        let mut b = a.clone();
        assert!(rp.compare_images(&a, &b));

        b.set(&[2, 3], 1).unwrap();
        assert!(!rp.compare_images(&a, &b));
        assert!(rp.failures()[0].contains("[2, 3]"));
    }

    #[test]
    fn test_compare_images_geometry() {
        let mut rp = RegParams::new("test");
        let a = RealImage::new(&[3, 3]).unwrap();
        let mut b = a.clone();
        b.set_spacing(&[1.0, 2.0]).unwrap();
        assert!(!rp.compare_images(&a, &b));
        assert!(rp.failures()[0].contains("geometry"));
    }
}
