// src/config/operations.rs - The list of source-pair comparisons to run
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MatchingError, MatchingResult};
use crate::matching::derived_inputs::DerivedInputConfig;
use crate::matching::keys::KeyStrategy;
use crate::matching::matcher::MatchStrategy;
use crate::utils::env::config_path_from_env;

/// One source-pair comparison. Side 1 is the left (reference) table whose
/// unmatched rows are reported; side 2 is the right (candidate) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationConfig {
    pub name: String,
    pub file_path1: PathBuf,
    pub file_path2: PathBuf,
    pub id_col1: String,
    pub id_col2: String,
    pub url_col1: String,
    pub url_col2: String,
    pub company_col1: String,
    pub company_col2: String,
    pub matched_path: PathBuf,
    pub unmatched_path: PathBuf,
    #[serde(default)]
    pub rename_dict1: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub rename_dict2: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub key_strategy: KeyStrategy,
    #[serde(default)]
    pub match_strategy: MatchStrategy,
    /// Residue inputs generated right before this operation runs.
    #[serde(default)]
    pub derive_inputs: Option<DerivedInputConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub operations: Vec<OperationConfig>,
}

fn rename(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect(),
    )
}

#[allow(clippy::too_many_arguments)]
fn operation(
    name: &str,
    files: (&str, &str),
    ids: (&str, &str),
    urls: (&str, &str),
    companies: (&str, &str),
    matched_path: &str,
    unmatched_path: &str,
    renames: (Option<BTreeMap<String, String>>, Option<BTreeMap<String, String>>),
) -> OperationConfig {
    OperationConfig {
        name: name.to_string(),
        file_path1: PathBuf::from(files.0),
        file_path2: PathBuf::from(files.1),
        id_col1: ids.0.to_string(),
        id_col2: ids.1.to_string(),
        url_col1: urls.0.to_string(),
        url_col2: urls.1.to_string(),
        company_col1: companies.0.to_string(),
        company_col2: companies.1.to_string(),
        matched_path: PathBuf::from(matched_path),
        unmatched_path: PathBuf::from(unmatched_path),
        rename_dict1: renames.0,
        rename_dict2: renames.1,
        key_strategy: KeyStrategy::default(),
        match_strategy: MatchStrategy::default(),
        derive_inputs: None,
    }
}

impl MatchingConfig {
    pub fn from_file(path: &Path) -> MatchingResult<Self> {
        if !path.exists() {
            return Err(MatchingError::MissingFile(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        let config: MatchingConfig = serde_json::from_str(&raw)
            .map_err(|e| MatchingError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        info!(
            "Loaded {} matching operations from {}",
            config.operations.len(),
            path.display()
        );
        Ok(config)
    }

    /// Explicit path, then `MATCHING_CONFIG`, then the built-in list.
    pub fn load(explicit: Option<&Path>) -> MatchingResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match config_path_from_env() {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No operation config given, using built-in operations");
                Ok(Self::default_operations())
            }
        }
    }

    pub fn validate(&self) -> MatchingResult<()> {
        if self.operations.is_empty() {
            return Err(MatchingError::Config(
                "at least one operation is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for op in &self.operations {
            if !seen.insert(op.name.as_str()) {
                return Err(MatchingError::Config(format!(
                    "duplicate operation name '{}'",
                    op.name
                )));
            }
            if op.matched_path == op.unmatched_path {
                return Err(MatchingError::Config(format!(
                    "operation '{}' writes matched and unmatched rows to the same file",
                    op.name
                )));
            }
        }
        Ok(())
    }

    /// Keeps only the named operations, in their configured order.
    pub fn retain_named(&mut self, names: &[String]) -> MatchingResult<()> {
        if names.is_empty() {
            return Ok(());
        }
        let known: HashSet<&str> = self.operations.iter().map(|o| o.name.as_str()).collect();
        if let Some(unknown) = names.iter().find(|n| !known.contains(n.as_str())) {
            return Err(MatchingError::Config(format!("unknown operation '{}'", unknown)));
        }
        self.operations.retain(|o| names.contains(&o.name));
        Ok(())
    }

    /// The CRM and provider comparisons run when no config file is given.
    pub fn default_operations() -> Self {
        let crm_rename = || rename(&[("ID", "CRM_ID")]);

        let mut linkedin_company = operation(
            "CRM to Brightdata Linkedin Company URL Matching",
            ("./input_data/linkedin_crm_comp.csv", "./input_data/linkedin_bd_comp.csv"),
            ("CRM_ID", "ID"),
            ("LINKEDIN_URL_COMPANY", "LINKEDIN_URL"),
            ("crm_company", "bd_company"),
            "./match_tables/crm_bd_linkedin_comp_matched.csv",
            "./unmatch_tables/crm_bd_linkedin_comp_unmatched.csv",
            (crm_rename(), None),
        );
        linkedin_company.derive_inputs = Some(DerivedInputConfig {
            matched_path: PathBuf::from("./match_tables/crm_bd_comp_matched.csv"),
            left_source: PathBuf::from("./input_data/VW_SF_CRM_MATCH.csv"),
            right_source: PathBuf::from("./input_data/VW_BD_COMPANY_MATCH.csv"),
            left_source_id_col: "ID".to_string(),
            right_source_id_col: "ID".to_string(),
            matched_left_id_col: "CRM_ID".to_string(),
            matched_right_id_col: "ID".to_string(),
            left_output: PathBuf::from("./input_data/linkedin_crm_comp.csv"),
            right_output: PathBuf::from("./input_data/linkedin_bd_comp.csv"),
        });

        let operations = vec![
            operation(
                "CRM to Crunchbase Company URL Matching",
                ("./input_data/VW_SF_CRM_MATCH.csv", "./input_data/VW_CB_MATCH.csv"),
                ("CRM_ID", "UUID"),
                ("COMPANY_WEBSITE", "HOMEPAGE_URL"),
                ("crm_company", "cb_company"),
                "./match_tables/crm_cb_matched.csv",
                "./unmatch_tables/crm_cb_unmatched.csv",
                (crm_rename(), None),
            ),
            operation(
                "CRM to Sourcescrub Company URL Matching",
                ("./input_data/VW_SF_CRM_MATCH.csv", "./input_data/VW_SS_COMPANY_MATCH.csv"),
                ("CRM_ID", "ID"),
                ("COMPANY_WEBSITE", "WEBSITE"),
                ("crm_company", "ss_company"),
                "./match_tables/crm_ss_matched.csv",
                "./unmatch_tables/crm_ss_unmatched.csv",
                (crm_rename(), None),
            ),
            operation(
                "Crunchbase to Sourcescrub Company URL Matching",
                ("./input_data/VW_CB_MATCH.csv", "./input_data/VW_SS_COMPANY_MATCH.csv"),
                ("UUID", "ID"),
                ("HOMEPAGE_URL", "WEBSITE"),
                ("cb_company", "ss_company"),
                "./match_tables/cb_ss_matched.csv",
                "./unmatch_tables/cb_ss_unmatched.csv",
                (None, None),
            ),
            operation(
                "CRM to Brightdata Company Website URL Matching",
                ("./input_data/VW_SF_CRM_MATCH.csv", "./input_data/VW_BD_COMPANY_MATCH.csv"),
                ("CRM_ID", "ID"),
                ("COMPANY_WEBSITE", "WEBSITE"),
                ("crm_company", "bd_company"),
                "./match_tables/crm_bd_comp_matched.csv",
                "./unmatch_tables/crm_bd_comp_unmatched.csv",
                (crm_rename(), rename(&[("COMPANY_WEBSITE", "WEBSITE")])),
            ),
            linkedin_company,
            operation(
                "CRM to Brightdata Linkedin People URL Matching",
                ("./input_data/VW_SF_CRM_MATCH.csv", "./input_data/VW_BD_PEOPLE_MATCH.csv"),
                ("CRM_ID", "ID"),
                ("LINKEDIN_URL_PERSON", "LINKEDIN_URL_PERSON_BD"),
                ("crm_company", "bd_company"),
                "./match_tables/crm_bd_people_matched.csv",
                "./unmatch_tables/crm_bd_people_unmatched.csv",
                (
                    crm_rename(),
                    rename(&[("LINKEDIN_URL_PERSON", "LINKEDIN_URL_PERSON_BD")]),
                ),
            ),
        ];

        MatchingConfig { operations }
    }
}
