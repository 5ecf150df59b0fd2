// src/matching/keys.rs - Key strategy selection and record annotation
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MatchingError, MatchingResult};
use crate::matching::name::extract_company_name;
use crate::matching::url::extract_domain_and_company;
use crate::models::core::{CompanyKey, KeyedRecord, Record};
use crate::utils::progress_bars::logging::MatchingLogger;

/// How a URL is reduced to a join key. Both sides of one join must use the
/// same strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// Registrable domain with social-profile and hosting-platform handling.
    #[default]
    DomainKey,
    /// Hyphen-joined slug of the URL's non-boilerplate tokens.
    TokenKey,
}

impl KeyStrategy {
    pub fn extract(&self, url: &str) -> CompanyKey {
        match self {
            KeyStrategy::DomainKey => extract_domain_and_company(url),
            KeyStrategy::TokenKey => extract_company_name(url),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KeyStrategy::DomainKey => "domain_key",
            KeyStrategy::TokenKey => "token_key",
        }
    }
}

impl fmt::Display for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Attaches a company key to every record. Fails on an empty collection so
/// the caller never matches against nothing.
pub fn annotate_keys(
    records: Vec<Record>,
    strategy: KeyStrategy,
    logger: &MatchingLogger,
) -> MatchingResult<Vec<KeyedRecord>> {
    if records.is_empty() {
        return Err(MatchingError::EmptyInput {
            left: 0,
            right: 0,
        });
    }

    let total = records.len();
    let mut keyed = Vec::with_capacity(total);
    let mut empty_keys = 0usize;

    for (i, record) in records.into_iter().enumerate() {
        let key = strategy.extract(&record.url);
        if key.is_empty() {
            empty_keys += 1;
        }
        keyed.push(KeyedRecord { record, key });
        logger.log_progress_update(i + 1, total, Some("extracting keys"));
    }

    if empty_keys > 0 {
        logger.log_warning(&format!(
            "{} of {} URLs produced an empty {} key",
            empty_keys,
            total,
            strategy.label()
        ));
    }
    logger.log_debug(&format!("Annotated {} records with {} keys", total, strategy));

    Ok(keyed)
}
