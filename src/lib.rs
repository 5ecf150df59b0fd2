pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod tabular;
pub mod utils;

pub use error::{MatchingError, MatchingResult};
pub use matching::keys::KeyStrategy;
pub use matching::matcher::MatchStrategy;
pub use models::core::{CompanyKey, KeyedRecord, MatchPair, Record, UnmatchedRecord};
