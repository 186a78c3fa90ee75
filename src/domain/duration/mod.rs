pub mod estimator;
pub mod target;

pub use estimator::{DurationEstimate, DurationEstimator};
pub use target::{parse_target_duration, TargetDurationError};
