pub mod types;
pub mod classification;
pub mod retry;

pub use types::CoordError;
pub use classification::ErrorClassification;
pub use retry::{BackoffPolicy, RetryConfig, with_retry};
