//! 配置 - `~/.config/ax-context-monitor/config.json`
//!
//! 所有字段都有默认值，文件不存在时使用默认配置。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::notification::NotificationConfig;

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// 通知过滤
    pub notifications: NotificationConfig,
    /// 外部 helper 命令
    pub helpers: HelperConfig,
    /// 屏幕差分轮询
    pub watch: WatchConfig,
    /// 上下文日志路径，未设置时使用默认路径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_log: Option<PathBuf>,
}

/// 外部 helper 命令（命令名或路径）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelperConfig {
    pub darwin_capture: String,
    pub win32_capture: String,
    pub darwin_notify: String,
    pub win32_notify: String,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            darwin_capture: "ax-snapshot".to_string(),
            win32_capture: "ax-snapshot.exe".to_string(),
            darwin_notify: "ax-notify".to_string(),
            win32_notify: "ax-notify.exe".to_string(),
        }
    }
}

/// 屏幕差分轮询配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 3 }
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl AppConfig {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("ax-context-monitor")
            .join("config.json")
    }

    /// 从文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// 加载配置；未指定路径时读默认路径，默认路径不存在则使用默认配置
    ///
    /// 显式指定的路径不存在时返回错误。
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    debug!(path = %path.display(), "No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// 上下文日志路径
    pub fn context_log_path(&self) -> PathBuf {
        self.context_log
            .clone()
            .unwrap_or_else(crate::notification::store::JsonlFileSink::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.notifications.enabled);
        assert_eq!(config.watch.interval(), Duration::from_secs(3));
        assert_eq!(config.helpers.darwin_capture, "ax-snapshot");
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "notifications": {"appBlacklist": ["Slack"]},
            "helpers": {"darwinCapture": "/opt/ax/ax-snapshot"},
            "watch": {"intervalSecs": 0}
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert!(config.notifications.enabled);
        assert_eq!(config.notifications.blacklist(), ["Slack".to_string()]);
        assert_eq!(config.helpers.darwin_capture, "/opt/ax/ax-snapshot");
        assert_eq!(config.helpers.win32_capture, "ax-snapshot.exe");
        // 间隔至少 1 秒
        assert_eq!(config.watch.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"contextLog": "/tmp/ctx.jsonl"}"#).unwrap();

        let config = AppConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.context_log_path(), PathBuf::from("/tmp/ctx.jsonl"));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_or_default(Some(&dir.path().join("nope.json"))).is_err());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
