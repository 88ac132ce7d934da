//! 通知事件与过滤配置
//!
//! 事件由平台 provider 推送一次后即被丢弃，不做保留。

use serde::{Deserialize, Serialize};

/// 系统通知事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    /// provider 分配的通知 ID
    pub id: String,
    /// 来源应用名
    pub app_name: String,
    /// 来源应用 bundle id（Windows 上为 AUMID）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// 秒级 Unix 时间戳（可带小数）
    #[serde(default)]
    pub timestamp_seconds: f64,
}

impl NotificationEvent {
    /// 创建事件，时间戳取当前时间
    pub fn new(
        id: impl Into<String>,
        app_name: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            app_name: app_name.into(),
            bundle_id: None,
            title: title.into(),
            body: body.into(),
            timestamp_seconds: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
        }
    }

    /// 设置 bundle id
    pub fn with_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }

    /// 设置时间戳
    pub fn with_timestamp(mut self, timestamp_seconds: f64) -> Self {
        self.timestamp_seconds = timestamp_seconds;
        self
    }
}

/// 通知过滤配置，管道构造时加载一次，之后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_whitelist: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_blacklist: Option<Vec<String>>,
    /// 只对这些应用报告屏幕差分；为空表示所有应用
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_apps: Option<Vec<String>>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_whitelist: None,
            app_blacklist: None,
            diff_apps: None,
        }
    }
}

impl NotificationConfig {
    pub fn whitelist(&self) -> &[String] {
        self.app_whitelist.as_deref().unwrap_or(&[])
    }

    pub fn blacklist(&self) -> &[String] {
        self.app_blacklist.as_deref().unwrap_or(&[])
    }

    pub fn diff_apps(&self) -> &[String] {
        self.diff_apps.as_deref().unwrap_or(&[])
    }
}
