// Signal calculation over fetched price history
pub mod moving_average;

pub use moving_average::{compute_average, SignalError};
