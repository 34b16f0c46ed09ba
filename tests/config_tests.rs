use serial_test::serial;
use std::env;
use tempfile::TempDir;

use taskmap::config::AppConfig;

fn clear_overrides() {
    unsafe {
        env::remove_var("TASKMAP_API_URL");
        env::remove_var("TASKMAP_DATABASE_PATH");
    }
}

#[test]
#[serial]
fn test_env_overrides_win_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "api_base_url = \"https://file.example.lv/api\"\ndatabase_path = \"from-file.db\"\n").unwrap();

    unsafe {
        env::set_var("TASKMAP_API_URL", "https://env.example.lv/api/");
        env::set_var("TASKMAP_DATABASE_PATH", "/tmp/taskmap-env.db");
    }

    let config = AppConfig::load_from(&path).unwrap().with_env_overrides();
    clear_overrides();

    assert_eq!(config.api_base_url, "https://env.example.lv/api");
    assert_eq!(config.database_path, "/tmp/taskmap-env.db");
}

#[test]
#[serial]
fn test_file_values_kept_without_env() {
    clear_overrides();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "api_base_url = \"https://file.example.lv/api/\"\n").unwrap();

    let config = AppConfig::load_from(&path).unwrap().with_env_overrides();
    assert_eq!(config.api_base_url, "https://file.example.lv/api");
    assert_eq!(config.database_path, "taskmap.db");
}

#[test]
fn test_written_file_parses_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    AppConfig::default().save_to(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[default_location]"));
    assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());
}
