//! 存储目录配置单元测试

use std::fs;
use std::time::Duration;

use crate::data::config::{FetchSettings, StorageConfig};
use crate::data::{DataError, RestoreOutcome};

#[test]
fn test_default_path_is_created() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());

    let path = config.get_path(false).expect("解析默认目录失败");

    assert_eq!(path, home.path().join("datasets"));
    assert!(path.is_dir());
    assert!(!config.config_file().exists());
}

#[test]
fn test_set_path_persists_across_instances() {
    let home = tempfile::tempdir().unwrap();
    let target = home.path().join("my_data");

    let stored = StorageConfig::with_home(home.path())
        .set_path(&target, true)
        .expect("设置目录失败");
    assert_eq!(stored, target);
    assert!(target.is_dir());

    // 模拟进程重启：新的实例重新读取同一个配置文件
    let reopened = StorageConfig::with_home(home.path());
    assert_eq!(reopened.get_path(false).unwrap(), target);
}

#[test]
fn test_config_file_has_header_and_path() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());
    let target = home.path().join("elsewhere");
    config.set_path(&target, false).unwrap();

    let content = fs::read_to_string(config.config_file()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('#'));
    assert_eq!(lines[1], target.to_string_lossy());
}

#[test]
fn test_configured_path_is_not_created() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());
    let target = home.path().join("not_yet");

    config.set_path(&target, false).unwrap();

    assert_eq!(config.get_path(false).unwrap(), target);
    assert!(!target.exists());
}

#[test]
fn test_set_path_makes_relative_path_absolute() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());

    let stored = config.set_path("relative/data", false).unwrap();

    assert!(stored.is_absolute());
    assert!(stored.ends_with("relative/data"));
    assert_eq!(config.get_path(false).unwrap(), stored);
}

#[test]
fn test_corrupt_config_file() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());
    fs::write(config.config_file(), "only one line").unwrap();

    let result = config.get_path(false);

    assert!(matches!(result, Err(DataError::ConfigError { .. })));
}

#[test]
fn test_restore_default_requires_confirmation() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());
    let target = home.path().join("custom");
    config.set_path(&target, true).unwrap();

    let outcome = config.restore_default(false).unwrap();

    assert_eq!(outcome, RestoreOutcome::NotConfirmed);
    assert!(config.config_file().exists());
    assert_eq!(config.get_path(false).unwrap(), target);
}

#[test]
fn test_restore_default() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());
    config.set_path(home.path().join("custom"), true).unwrap();

    let outcome = config.restore_default(true).unwrap();

    let default_dir = home.path().join("datasets");
    assert_eq!(outcome, RestoreOutcome::Restored(default_dir.clone()));
    assert!(!config.config_file().exists());
    assert!(default_dir.is_dir());
    assert_eq!(config.get_path(false).unwrap(), default_dir);
}

#[test]
fn test_restore_default_without_config_file_is_noop() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());

    let first = config.restore_default(true).unwrap();
    let second = config.restore_default(true).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, RestoreOutcome::Restored(home.path().join("datasets")));
}

#[test]
fn test_fetch_settings_timeout() {
    assert_eq!(FetchSettings::default().timeout, Duration::from_secs(60));
    assert_eq!(
        FetchSettings::parse_timeout(" 15 ").unwrap().timeout,
        Duration::from_secs(15)
    );
    assert!(matches!(
        FetchSettings::parse_timeout("abc"),
        Err(DataError::ConfigError { .. })
    ));
    assert!(FetchSettings::parse_timeout("0").is_err());
}

#[test]
fn test_path_with_surrounding_spaces_round_trips() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());
    let target = home.path().join(" spaced dir ");

    let stored = config.set_path(&target, true).unwrap();

    assert_eq!(stored, target);
    assert_eq!(
        StorageConfig::with_home(home.path()).get_path(false).unwrap(),
        target
    );
}

#[test]
fn test_config_file_with_crlf_line_endings() {
    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());
    let target = home.path().join("windows_edited");
    fs::write(
        config.config_file(),
        format!("# header\r\n{}\r\n", target.display()),
    )
    .unwrap();

    assert_eq!(config.get_path(false).unwrap(), target);
}

#[cfg(unix)]
#[test]
fn test_set_path_rejects_non_utf8_path() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let home = tempfile::tempdir().unwrap();
    let config = StorageConfig::with_home(home.path());
    let target = home.path().join(OsStr::from_bytes(b"data_\xff"));

    let result = config.set_path(&target, true);

    assert!(matches!(result, Err(DataError::ConfigError { .. })));
    assert!(!config.config_file().exists());
    assert!(!target.exists());
}
