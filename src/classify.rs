//! Duplicate classification.

use crate::error::FreezeFrameError;

/// Default similarity above which a sample counts as a duplicate.
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.9999;

/// Decides whether a sample repeats its immediate predecessor.
///
/// The comparison is strict: a similarity equal to the threshold is *not* a
/// duplicate. The default bound only flags near-exact repeats.
///
/// # Example
///
/// ```
/// use freezeframe::DuplicateClassifier;
///
/// let classifier = DuplicateClassifier::default();
/// assert!(!classifier.is_duplicate(0.9999));
/// assert!(classifier.is_duplicate(0.99991));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateClassifier {
    threshold: f64,
}

impl Default for DuplicateClassifier {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DUPLICATE_THRESHOLD,
        }
    }
}

impl DuplicateClassifier {
    /// Create a classifier with a custom threshold.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeFrameError::InvalidParameter`] if `threshold` is not
    /// within `[0, 1]`.
    pub fn new(threshold: f64) -> Result<Self, FreezeFrameError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(FreezeFrameError::InvalidParameter(format!(
                "duplicate threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self { threshold })
    }

    /// The threshold in use.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `true` when `similarity` is strictly greater than the threshold.
    pub fn is_duplicate(&self, similarity: f64) -> bool {
        similarity > self.threshold
    }
}
