use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use company_match_lib::config::{MatchingConfig, OperationConfig};
use company_match_lib::matching::derived_inputs::DerivedInputConfig;
use company_match_lib::matching::manager::{run_matching_pipeline, run_operation};
use company_match_lib::models::stats_models::OperationStatus;
use company_match_lib::tabular::Table;
use company_match_lib::utils::progress_bars::progress_config::ProgressConfig;
use company_match_lib::{KeyStrategy, MatchStrategy};

fn operation(dir: &Path, name: &str, left: &str, right: &str) -> OperationConfig {
    OperationConfig {
        name: name.to_string(),
        file_path1: dir.join(left),
        file_path2: dir.join(right),
        id_col1: "CRM_ID".to_string(),
        id_col2: "UUID".to_string(),
        url_col1: "COMPANY_WEBSITE".to_string(),
        url_col2: "HOMEPAGE_URL".to_string(),
        company_col1: "crm_company".to_string(),
        company_col2: "cb_company".to_string(),
        matched_path: dir.join(format!("match_tables/{}_matched.csv", name)),
        unmatched_path: dir.join(format!("unmatch_tables/{}_unmatched.csv", name)),
        rename_dict1: Some(BTreeMap::from([("ID".to_string(), "CRM_ID".to_string())])),
        rename_dict2: None,
        key_strategy: KeyStrategy::DomainKey,
        match_strategy: MatchStrategy::Exact,
        derive_inputs: None,
    }
}

fn column(table: &Table, name: &str) -> Vec<String> {
    let index = table.column_index(name).unwrap();
    table
        .column_values(index)
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

#[test]
fn simple_match_produces_one_pair_and_no_unmatched() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("crm.csv"), "ID,COMPANY_WEBSITE\n1,http://acme.com\n").unwrap();
    fs::write(dir.path().join("cb.csv"), "UUID,HOMEPAGE_URL\n9,http://www.acme.com\n").unwrap();

    let op = operation(dir.path(), "crm_cb", "crm.csv", "cb.csv");
    let stats = run_operation(&op, &ProgressConfig::silent(), None, "test-run").unwrap();
    assert_eq!(stats.pairs_matched, 1);
    assert_eq!(stats.left_records_unmatched, 0);

    let matched = Table::read_csv(&op.matched_path).unwrap();
    assert_eq!(
        matched.headers(),
        &["CRM_ID", "UUID", "COMPANY_WEBSITE", "HOMEPAGE_URL", "crm_company", "cb_company"]
    );
    assert_eq!(column(&matched, "CRM_ID"), vec!["1"]);
    assert_eq!(column(&matched, "UUID"), vec!["9"]);
    assert_eq!(column(&matched, "cb_company"), vec!["acme.com"]);

    let unmatched = Table::read_csv(&op.unmatched_path).unwrap();
    assert_eq!(unmatched.headers(), &["CRM_ID", "COMPANY_WEBSITE"]);
    assert!(unmatched.is_empty());
}

#[test]
fn shared_right_key_is_quarantined_for_review() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("crm.csv"),
        "ID,COMPANY_WEBSITE\n1,http://acme.com\n2,https://globex.com\n3,http://initech.io\n4,\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("cb.csv"),
        "UUID,HOMEPAGE_URL\na,http://www.acme.com\nb,https://acme.com/about-us\nc,http://globex.com\n",
    )
    .unwrap();

    let config = MatchingConfig {
        operations: vec![operation(dir.path(), "crm_cb", "crm.csv", "cb.csv")],
    };
    let stats = run_matching_pipeline(&config, &ProgressConfig::silent(), false, "test-run");
    assert_eq!(stats.operations_completed(), 1);

    let op_stats = stats.operations[0].stats().unwrap();
    assert_eq!(op_stats.left_rows, 3);
    assert_eq!(op_stats.left_rows_dropped, 1);
    assert_eq!(op_stats.pairs_matched, 3);
    assert_eq!(op_stats.left_records_unmatched, 1);

    let dedup = stats.dedup[0].outcome.as_ref().unwrap();
    assert_eq!(dedup.group_column, "cb_company");
    assert_eq!(dedup.clean_rows, 1);
    assert_eq!(dedup.ambiguous_rows, 2);
    assert_eq!(dedup.duplicate_groups, 1);

    let op = &config.operations[0];
    let clean = Table::read_csv(&op.matched_path).unwrap();
    assert_eq!(column(&clean, "UUID"), vec!["c"]);

    let duplicates =
        Table::read_csv(&dir.path().join("match_tables/crm_cb_duplicate_matched.csv")).unwrap();
    assert_eq!(column(&duplicates, "UUID"), vec!["a", "b"]);
    assert_eq!(column(&duplicates, "cb_company"), vec!["acme.com", "acme.com"]);

    // the matched left record is never reported as unmatched, and the
    // null-URL row appears nowhere
    let unmatched = Table::read_csv(&op.unmatched_path).unwrap();
    assert_eq!(column(&unmatched, "CRM_ID"), vec!["3"]);
    assert!(!column(&duplicates, "CRM_ID").contains(&"4".to_string()));
}

#[test]
fn failing_operation_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("crm.csv"), "ID,COMPANY_WEBSITE\n1,http://acme.com\n").unwrap();
    fs::write(dir.path().join("cb.csv"), "UUID,HOMEPAGE_URL\n9,http://acme.com\n").unwrap();
    fs::write(dir.path().join("bad.csv"), "UUID,NAME\n9,Acme\n").unwrap();

    let config = MatchingConfig {
        operations: vec![
            operation(dir.path(), "missing", "nope.csv", "cb.csv"),
            operation(dir.path(), "schema", "crm.csv", "bad.csv"),
            operation(dir.path(), "good", "crm.csv", "cb.csv"),
        ],
    };
    let stats = run_matching_pipeline(&config, &ProgressConfig::silent(), false, "test-run");

    assert_eq!(stats.operations_completed(), 1);
    assert_eq!(stats.operations_failed(), 2);
    match &stats.operations[1].status {
        OperationStatus::Failed { error } => assert!(error.contains("HOMEPAGE_URL")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(stats.operations[2].is_success());
    // only completed operations get a duplicate review
    assert_eq!(stats.dedup.len(), 1);
    assert_eq!(stats.dedup[0].operation, "good");
}

#[test]
fn derived_inputs_feed_the_follow_up_operation() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(
        root.join("crm.csv"),
        "ID,COMPANY_WEBSITE,LINKEDIN_URL_COMPANY\n\
         1,http://acme.com,https://www.linkedin.com/company/acme\n\
         2,http://globex.io,https://linkedin.com/company/globex-corp/about\n",
    )
    .unwrap();
    fs::write(
        root.join("bd.csv"),
        "UUID,HOMEPAGE_URL,LINKEDIN_URL\n\
         a,https://acme.com,https://linkedin.com/company/acme\n\
         b,https://globex-industries.com,https://www.linkedin.com/company/globex-corp?trk=x\n",
    )
    .unwrap();

    let website = operation(root, "crm_bd_comp", "crm.csv", "bd.csv");

    let mut linkedin = operation(root, "crm_bd_linkedin_comp", "linkedin_crm.csv", "linkedin_bd.csv");
    linkedin.url_col1 = "LINKEDIN_URL_COMPANY".to_string();
    linkedin.url_col2 = "LINKEDIN_URL".to_string();
    linkedin.derive_inputs = Some(DerivedInputConfig {
        matched_path: website.matched_path.clone(),
        left_source: root.join("crm.csv"),
        right_source: root.join("bd.csv"),
        left_source_id_col: "ID".to_string(),
        right_source_id_col: "UUID".to_string(),
        matched_left_id_col: "CRM_ID".to_string(),
        matched_right_id_col: "UUID".to_string(),
        left_output: root.join("linkedin_crm.csv"),
        right_output: root.join("linkedin_bd.csv"),
    });

    let config = MatchingConfig {
        operations: vec![website, linkedin],
    };
    let stats = run_matching_pipeline(&config, &ProgressConfig::silent(), true, "test-run");
    assert_eq!(stats.operations_completed(), 2);
    assert!(stats.dedup.is_empty());

    let residue = Table::read_csv(&root.join("linkedin_crm.csv")).unwrap();
    assert_eq!(column(&residue, "ID"), vec!["2"]);

    let follow_up = Table::read_csv(&config.operations[1].matched_path).unwrap();
    assert_eq!(column(&follow_up, "CRM_ID"), vec!["2"]);
    assert_eq!(column(&follow_up, "UUID"), vec!["b"]);
    assert_eq!(column(&follow_up, "cb_company"), vec!["globex-corp"]);
}
