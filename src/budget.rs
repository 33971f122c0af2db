//! Minimum/maximum file size policy.

use thiserror::Error;

/// Configured bounds on the total size of a downloaded file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeBudget {
    /// Smallest acceptable size in bytes.
    pub min: Option<u64>,
    /// Largest acceptable size in bytes.
    pub max: Option<u64>,
}

/// A bound violated by a declared size.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetViolation {
    /// The size is below the configured minimum.
    #[error("File size smaller than allowed minimum ({size} < {min})")]
    TooSmall { size: u64, min: u64 },
    /// The size is above the configured maximum.
    #[error("File size larger than allowed maximum ({size} > {max})")]
    TooLarge { size: u64, max: u64 },
}

impl SizeBudget {
    /// Create a budget from optional bounds.
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self { min, max }
    }

    /// Returns `true` when neither bound is configured.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Check a declared size against both bounds, inclusive.
    ///
    /// An unknown size cannot be judged and always passes.
    pub fn check(&self, size: Option<u64>) -> Result<(), BudgetViolation> {
        let Some(size) = size else {
            return Ok(());
        };
        if let Some(min) = self.min.filter(|min| size < *min) {
            return Err(BudgetViolation::TooSmall { size, min });
        }
        if let Some(max) = self.max.filter(|max| size > *max) {
            return Err(BudgetViolation::TooLarge { size, max });
        }
        Ok(())
    }

    /// Boolean form of [`SizeBudget::check`].
    pub fn allows(&self, size: Option<u64>) -> bool {
        self.check(size).is_ok()
    }
}
