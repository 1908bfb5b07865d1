#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;

use jdbcmetrics_core::MetricsError;
use jdbcmetrics_runtime::config::{self, CONFIGURATORS_ENV, CONFIG_FILE_ENV};

#[test]
fn deny_unknown_fields() {
    let bad = r#"
version: 1
metrics_configurator: "a::B" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind(), "invalid_config");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert!(cfg.configurators().is_none());
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert!(matches!(err, MetricsError::UnsupportedVersion(2)));
}

#[test]
fn empty_list_counts_as_absent() {
    let cfg = config::load_from_str("version: 1\nmetrics_configurators: \"\"\n").unwrap();
    assert!(cfg.configurators().is_none());
}

#[test]
fn env_overrides_file() {
    let dir = std::env::temp_dir().join(format!("jdbcmetrics-cfg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("jdbcmetrics.yaml");
    std::fs::write(&path, "version: 1\nmetrics_configurators: \"from::File\"\n").unwrap();

    let mut vars = HashMap::new();
    vars.insert(CONFIG_FILE_ENV, path.to_string_lossy().into_owned());
    let from_file = config::from_lookup(|k| vars.get(k).cloned()).unwrap();
    assert_eq!(from_file.configurators(), Some("from::File"));

    vars.insert(CONFIGURATORS_ENV, "from::Env".to_string());
    let overridden = config::from_lookup(|k| vars.get(k).cloned()).unwrap();
    assert_eq!(overridden.configurators(), Some("from::Env"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file_is_an_error() {
    let err = config::from_lookup(|k| {
        (k == CONFIG_FILE_ENV).then(|| "/nonexistent/jdbcmetrics.yaml".to_string())
    })
    .expect_err("must fail");
    assert_eq!(err.kind(), "invalid_config");
}
