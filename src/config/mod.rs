pub mod operations;

pub use operations::{MatchingConfig, OperationConfig};
