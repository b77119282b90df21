// Declare modules at the root level
pub mod activation;
pub mod domain;
pub mod error;
pub mod measure;
pub mod time;
pub mod transform;
pub mod validators;

// Test utilities module (available in test and integration test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export everything under a shared namespace for external access
pub mod shared {
    pub use super::activation;
    pub use super::domain;
    pub use super::error;
    pub use super::measure;
    pub use super::time;
    pub use super::transform;
    pub use super::validators;
}

// Also re-export at root for convenience
pub use activation::*;
pub use domain::*;
pub use error::*;
pub use measure::*;
pub use time::*;
pub use transform::*;
pub use validators::*;
