// tests/config_env.rs
//
// Startup configuration from env + files. Env-mutating, hence #[serial].

use std::env;
use std::io::Write as _;

use serial_test::serial;
use tempfile::NamedTempFile;

use dialog_news_enricher::api::AppState;
use dialog_news_enricher::config::{AppConfig, MatcherConfig, ServiceMode};

const VARS: &[&str] = &[
    "SERVICE_MODE",
    "WORKSPACE_ID",
    "CREDENTIALS_PATH",
    "NEWS_FIXTURE_PATH",
    "CHAT_LOG_ENABLED",
    "LOG_USER",
    "LOG_PASS",
    "MATCHER_CONFIG_PATH",
    "MIN_PERSON_SIMILARITY",
    "MIN_KEYWORD_SIMILARITY",
    "MIN_KEYWORD_RELEVANCE",
];

fn clean_env() {
    for v in VARS {
        env::remove_var(v);
    }
}

fn temp_file(content: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("tempfile");
    f.write_all(content.as_bytes()).expect("write tempfile");
    f
}

#[test]
#[serial]
fn matcher_toml_then_env_override_clamped() {
    clean_env();
    let f = temp_file(
        r#"
[matcher]
min_person_similarity = 0.9
result_limit = 5
sort_by_relevance = true
"#,
    );
    env::set_var("MATCHER_CONFIG_PATH", f.path());
    env::set_var("MIN_KEYWORD_SIMILARITY", "1.7");

    let cfg = MatcherConfig::load().expect("load matcher config");
    assert_eq!(cfg.min_person_similarity, 0.9);
    assert_eq!(cfg.result_limit, 5);
    assert!(cfg.sort_by_relevance);
    assert_eq!(cfg.min_keyword_similarity, 1.0);
    // untouched keys keep their defaults
    assert_eq!(cfg.min_keyword_relevance, 0.5);

    clean_env();
}

#[test]
#[serial]
fn matcher_path_must_exist_when_named() {
    clean_env();
    env::set_var("MATCHER_CONFIG_PATH", "/definitely/not/here/matcher.toml");
    assert!(MatcherConfig::load().is_err());
    clean_env();
}

#[test]
#[serial]
fn chat_logging_requires_both_credentials() {
    clean_env();
    env::set_var("CHAT_LOG_ENABLED", "true");
    env::set_var("LOG_USER", "admin");
    let err = AppConfig::from_env().expect_err("missing LOG_PASS must fail");
    assert!(err.to_string().contains("LOG_PASS"), "{err}");

    env::set_var("LOG_PASS", "pw");
    let cfg = AppConfig::from_env().expect("both set");
    assert_eq!(cfg.chat_log.map(|a| a.user), Some("admin".to_string()));
    clean_env();
}

#[test]
#[serial]
fn mock_mode_wires_without_credentials() {
    clean_env();
    let corpus = temp_file(r#"[{"url":"u","title":"t","relations":[]}]"#);
    env::set_var("SERVICE_MODE", "mock");
    env::set_var("NEWS_FIXTURE_PATH", corpus.path());
    env::set_var("CREDENTIALS_PATH", "/definitely/not/here/credentials.json");

    let cfg = AppConfig::from_env().expect("config");
    assert_eq!(cfg.service_mode, ServiceMode::Mock);
    let state = AppState::from_config(&cfg).expect("mock state");
    assert!(state.workspace_configured);
    assert!(state.log_auth.is_none());
    assert_eq!(state.services.oracle.name(), "echo");
    assert_eq!(state.services.corpus.name(), "fixture");
    clean_env();
}

#[test]
#[serial]
fn live_mode_fails_fast_on_missing_credentials() {
    clean_env();
    env::set_var("WORKSPACE_ID", "ws-123");
    env::set_var("CREDENTIALS_PATH", "/definitely/not/here/credentials.json");

    let cfg = AppConfig::from_env().expect("config");
    assert_eq!(cfg.workspace_id.as_deref(), Some("ws-123"));
    let err = AppState::from_config(&cfg).err().expect("missing credentials must fail");
    assert!(err.to_string().contains("credentials"), "{err}");
    clean_env();
}

#[test]
#[serial]
fn live_mode_with_credentials_file() {
    clean_env();
    let creds = temp_file(r#"{ "credentials": { "apikey": "k-123" } }"#);
    env::set_var("CREDENTIALS_PATH", creds.path());

    let cfg = AppConfig::from_env().expect("config");
    let state = AppState::from_config(&cfg).expect("live state");
    // no workspace: the message endpoint only explains the setup
    assert!(!state.workspace_configured);
    assert_eq!(state.services.oracle.name(), "conversation");
    assert_eq!(state.services.annotator.name(), "combined-http");
    clean_env();
}
