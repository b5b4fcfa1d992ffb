use heliotrope::config::Config;

fn valid_config() -> Config {
    let mut cfg = Config::default();
    cfg.credentials.username = "user".to_string();
    cfg.credentials.password = "secret".to_string();
    cfg.credentials.company_key = "key".to_string();
    cfg.plant.plant_id = 12345;
    cfg
}

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = valid_config();
    cfg.portal.base_url = "http://portal.example".to_string();
    cfg.plant.plant_name = "Rooftop West".to_string();
    cfg.logging.file = path.with_extension("log").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.portal.base_url, "http://portal.example");
    assert_eq!(loaded.plant.plant_id, 12345);
    assert_eq!(loaded.plant.plant_name, "Rooftop West");
    assert_eq!(loaded.credentials.username, "user");
    assert_eq!(loaded.logging.file, cfg.logging.file);
}

#[test]
fn config_validation_errors() {
    let mut cfg = valid_config();

    // Missing credentials
    cfg.credentials.username.clear();
    assert!(cfg.validate().is_err());

    cfg = valid_config();
    cfg.credentials.password.clear();
    assert!(cfg.validate().is_err());

    cfg = valid_config();
    cfg.credentials.company_key.clear();
    assert!(cfg.validate().is_err());

    // Invalid portal settings
    cfg = valid_config();
    cfg.portal.base_url.clear();
    assert!(cfg.validate().is_err());

    cfg = valid_config();
    cfg.portal.timeout_secs = 0;
    assert!(cfg.validate().is_err());

    // Invalid polling settings
    cfg = valid_config();
    cfg.polling.update_interval_secs = 0;
    assert!(cfg.validate().is_err());

    cfg = valid_config();
    cfg.polling.reauth_interval_hours = 0;
    assert!(cfg.validate().is_err());

    assert!(valid_config().validate().is_ok());
}

#[test]
fn session_seed_defaults_to_empty() {
    // A config file without a session section still parses
    let yaml = r#"
portal:
  base_url: "http://portal.example"
  timeout_secs: 10
credentials:
  username: u
  password: p
  company_key: k
plant:
  plant_id: 7
  plant_name: Test
polling:
  update_interval_secs: 300
  reauth_interval_hours: 24
persistence:
  session_file: /tmp/session.json
logging:
  level: INFO
  file: /tmp/heliotrope.log
  backup_count: 5
  console_output: true
  json_format: false
"#;
    let cfg: Config = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.session.token.is_empty());
    assert!(cfg.session.secret.is_empty());
    assert!(cfg.validate().is_ok());
}

#[test]
fn missing_config_file_errors() {
    let res = Config::from_file("/definitely/missing/config.yaml");
    assert!(res.is_err());
}
