use anyhow::Result;
use doorbell_remote::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("absent");

    let cfg = Config::load(path.to_str().unwrap())?;

    assert_eq!(cfg.broker.host, "192.168.220.124");
    assert_eq!(cfg.broker.endpoint(), "nats://192.168.220.124:9001");
    assert_eq!(cfg.stream.path, "/stream.mjpg");
    assert_eq!(cfg.stream.max_retries, 3);
    assert_eq!(cfg.stream.retry_delay().as_millis(), 1000);
    assert_eq!(cfg.ai.query, "describe this image");
    Ok(())
}

#[test]
fn test_file_overrides_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("doorbell.toml");
    fs::write(
        &path,
        r#"
[broker]
host = "doorbell.lan"
secure = true

[stream]
max_retries = 5

[http]
port = 9090
"#,
    )?;

    let cfg = Config::load(path.to_str().unwrap())?;

    assert_eq!(cfg.broker.host, "doorbell.lan");
    assert!(cfg.broker.secure);
    assert_eq!(cfg.broker.effective_port(), 9002);
    assert_eq!(cfg.broker.endpoint(), "tls://doorbell.lan:9002");
    assert_eq!(cfg.stream.max_retries, 5);
    assert_eq!(cfg.stream.retry_delay_ms, 1000);
    assert_eq!(cfg.http.port, 9090);
    Ok(())
}

#[test]
fn test_default_matches_loaded_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let loaded = Config::load(temp_dir.path().join("none").to_str().unwrap())?;
    let built = Config::default();

    assert_eq!(loaded.broker.endpoint(), built.broker.endpoint());
    assert_eq!(loaded.stream.base_url, built.stream.base_url);
    assert_eq!(loaded.sync.confirm_timeout_ms, built.sync.confirm_timeout_ms);
    assert_eq!(loaded.http.bind, built.http.bind);
    Ok(())
}
