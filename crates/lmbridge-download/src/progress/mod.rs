//! Progress presentation helpers.

mod throttle;

pub use throttle::{ProgressThrottle, format_speed};
