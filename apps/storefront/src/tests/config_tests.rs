use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_config(contents: &str) -> (PathBuf, PathBuf) {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let root = env::temp_dir().join(format!("storefront_config_test_{suffix}"));
    fs::create_dir_all(&root).expect("temp root");
    let path = root.join("storefront.toml");
    fs::write(&path, contents).expect("write config");
    (root, path)
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let missing = env::temp_dir().join("storefront_config_missing_dir");
    let settings = load_settings_with(None, env_from(&[])).expect("settings");
    assert_eq!(settings.cart_mode, CartMode::Session);
    assert_eq!(settings.notification_duration(), Duration::from_millis(3000));
    assert!(settings.cart_id_path.ends_with("storefront/cart.json"));

    let err = load_settings_with(Some(&missing.join("nope.toml")), env_from(&[]))
        .expect_err("explicit config must exist");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn file_values_override_defaults() {
    let (root, path) = temp_config(
        r#"
server_url = "http://shop.internal:9000"
cart_mode = "identifier"
cart_id_path = "/tmp/storefront-cart.json"
notification_ms = 1500
request_timeout_seconds = 0
"#,
    );

    let settings = load_settings_with(Some(&path), env_from(&[])).expect("settings");
    assert_eq!(settings.server_url, "http://shop.internal:9000");
    assert_eq!(settings.cart_mode, CartMode::Identifier);
    assert_eq!(
        settings.cart_id_path,
        PathBuf::from("/tmp/storefront-cart.json")
    );
    assert_eq!(settings.notification_ms, 1500);
    assert_eq!(settings.request_timeout(), None);
    assert_eq!(settings.log_filter, "info");

    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn env_overrides_file_and_prefixed_keys_win() {
    let (root, path) = temp_config("server_url = \"http://from-file\"\n");

    let settings = load_settings_with(
        Some(&path),
        env_from(&[
            ("STOREFRONT_SERVER_URL", "http://plain-env"),
            ("APP__SERVER_URL", "http://prefixed-env"),
            ("APP__CART_MODE", "identifier"),
            ("APP__NOTIFICATION_MS", "not-a-number"),
            ("RUST_LOG", "warn"),
            ("APP__LOG_FILTER", "client_core=debug"),
        ]),
    )
    .expect("settings");

    assert_eq!(settings.server_url, "http://prefixed-env");
    assert_eq!(settings.cart_mode, CartMode::Identifier);
    assert_eq!(settings.notification_ms, 3000);
    assert_eq!(settings.log_filter, "client_core=debug");

    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn unknown_keys_are_rejected() {
    let (root, path) = temp_config("sever_url = \"typo\"\n");

    let err = load_settings_with(Some(&path), env_from(&[])).expect_err("typo must fail");
    assert!(err.to_string().contains("invalid config file"));

    fs::remove_dir_all(root).expect("cleanup");
}
