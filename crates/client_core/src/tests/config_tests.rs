use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn defaults_target_local_upload_route() {
    let settings = ClientSettings::default();
    assert_eq!(
        settings.endpoint().expect("endpoint").url().as_str(),
        "http://127.0.0.1:5000/upload"
    );
    assert_eq!(settings.preview_delay_ms, 100);
    assert_eq!(settings.progress_tick_ms, 200);
}

#[test]
fn api_base_url_switches_to_predict_route() {
    let mut settings = ClientSettings::default();
    apply_env(
        &mut settings,
        env_from(&[("API_BASE_URL", "https://api.example.test/v1/")]),
    );
    assert_eq!(
        settings.endpoint().expect("endpoint").url().as_str(),
        "https://api.example.test/v1/predict"
    );

    apply_env(&mut settings, env_from(&[("API_BASE_URL", "   ")]));
    assert!(settings.api_base_url.is_none());
}

#[test]
fn bad_timing_overrides_are_ignored() {
    let mut settings = ClientSettings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("APP__PREVIEW_DELAY_MS", "soon"),
            ("APP__PROGRESS_TICK_MS", "0"),
        ]),
    );
    assert_eq!(settings, ClientSettings::default());

    apply_env(
        &mut settings,
        env_from(&[
            ("APP__PREVIEW_DELAY_MS", "0"),
            ("APP__PROGRESS_TICK_MS", "50"),
        ]),
    );
    let controller = settings.controller_settings();
    assert_eq!(controller.preview_delay, Duration::ZERO);
    assert_eq!(controller.progress_tick, Duration::from_millis(50));
}

#[test]
fn settings_file_is_applied_before_environment() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("leafscan_client_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("leafscan.toml");
    fs::write(
        &path,
        "server_url = \"http://10.0.0.2:5000\"\napi_base_url = \"\"\nprogress_tick_ms = 120\n",
    )
    .expect("write settings");

    let mut settings = ClientSettings::default();
    apply_file(&mut settings, &path);
    assert_eq!(settings.server_url, "http://10.0.0.2:5000");
    assert!(settings.api_base_url.is_none());
    assert_eq!(settings.progress_tick_ms, 120);

    apply_env(
        &mut settings,
        env_from(&[("APP__SERVER_URL", "http://leaf.local")]),
    );
    assert_eq!(settings.server_url, "http://leaf.local");

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_settings_file_keeps_defaults() {
    let mut settings = ClientSettings::default();
    apply_file(&mut settings, Path::new("definitely/not/here/leafscan.toml"));
    assert_eq!(settings, ClientSettings::default());
}
