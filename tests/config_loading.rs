// tests/config_loading.rs
use news_freshness::config::{load_default, load_from, ENV_CONFIG_PATH};
use news_freshness::policy::{FilterMode, TrustTier};
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("freshness.toml");
    fs::write(
        &p_toml,
        r#"
[engine]
max_fetches_per_run = 5

[sources."Korea Herald"]
max_age_hours = 12
trust_tier = "medium"
"#,
    )
    .unwrap();
    let cfg = load_from(&p_toml).unwrap();
    assert_eq!(cfg.engine.max_fetches_per_run, 5);
    let policies = cfg.source_policies();
    let o = policies.override_for("korea_herald_business").unwrap();
    assert_eq!(o.max_age_hours, Some(12));
    assert_eq!(o.trust_tier, Some(TrustTier::Medium));

    let p_json = dir.path().join("freshness.json");
    fs::write(
        &p_json,
        r#"{"inclusion": {"high": 0.9, "seed": 3}, "sources": {"wsj": {"filter_mode": "binary_search"}}}"#,
    )
    .unwrap();
    let cj = load_from(&p_json).unwrap();
    assert_eq!(cj.inclusion.high, 0.9);
    assert_eq!(cj.inclusion.seed, Some(3));
    assert_eq!(cj.sources["wsj"].filter_mode, Some(FilterMode::BinarySearch));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not read.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);

    // 1) Nothing on disk → defaults
    let c = load_default().unwrap();
    assert_eq!(c.engine.worker_pool_size, 4);
    assert!(c.sources.is_empty());

    // 2) JSON fallback in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("freshness.json"), r#"{"engine": {"worker_pool_size": 2}}"#).unwrap();
    assert_eq!(load_default().unwrap().engine.worker_pool_size, 2);

    // 3) TOML wins over JSON
    fs::write(cfg_dir.join("freshness.toml"), "[engine]\nworker_pool_size = 6\n").unwrap();
    assert_eq!(load_default().unwrap().engine.worker_pool_size, 6);

    // 4) ENV wins over both
    let p_env = tmp.path().join("custom.toml");
    fs::write(&p_env, "[engine]\nworker_pool_size = 9\n").unwrap();
    env::set_var(ENV_CONFIG_PATH, &p_env);
    assert_eq!(load_default().unwrap().engine.worker_pool_size, 9);

    // 5) ENV pointing nowhere is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(load_default().is_err());

    env::remove_var(ENV_CONFIG_PATH);
    env::set_current_dir(old).unwrap();
}

#[test]
fn shipped_config_parses() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/freshness.toml");
    let cfg = load_from(&path).unwrap();
    assert_eq!(cfg.inclusion.high, 0.3);
    assert!(cfg.sources.contains_key("bloomberg"));
}
