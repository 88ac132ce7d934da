//! AX 快照 - 前台应用的无障碍树（每个元素一行）
//!
//! # 组成
//! 1. `diff`：两次快照之间的多重集差分
//! 2. `noise`：按骨架键抵消刷新噪声，只留下真正的新内容
//! 3. `watcher`：定时采集、差分、过滤并推送到 MessageSink

pub mod diff;
pub mod noise;
pub mod watcher;

pub use diff::{diff_lines, LineDiff};
pub use noise::{filter_genuine, skeleton};
pub use watcher::SnapshotWatcher;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 一次采集得到的快照，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxSnapshot {
    pub app_name: String,
    pub bundle_id: String,
    /// 行顺序仅用于展示，差分时不考虑
    pub lines: Vec<String>,
}

impl AxSnapshot {
    pub fn new(app_name: impl Into<String>, bundle_id: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            app_name: app_name.into(),
            bundle_id: bundle_id.into(),
            lines,
        }
    }

    /// 是否与另一个快照来自同一个前台应用
    pub fn same_app(&self, other: &AxSnapshot) -> bool {
        self.bundle_id == other.bundle_id && self.app_name == other.app_name
    }
}

/// 采集程序 stdout 的 JSON 结构
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptureResponse {
    #[serde(default)]
    app_name: String,
    #[serde(default)]
    bundle_id: String,
    /// 缺失时整个响应视为不可用
    #[serde(default)]
    lines: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
}

/// 解析采集程序输出
///
/// 无法解析、缺少 `lines` 或带 `error` 字段时返回 `None`（视为本次不可用），不会返回错误。
pub fn parse_capture_output(stdout: &str) -> Option<AxSnapshot> {
    let response: CaptureResponse = match serde_json::from_str(stdout.trim()) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Capture output is not valid JSON");
            return None;
        }
    };

    if let Some(error) = response.error {
        debug!(error = %error, "Capture helper reported an error");
        return None;
    }

    let Some(lines) = response.lines else {
        warn!(app = %response.app_name, "Capture output has no lines");
        return None;
    };

    Some(AxSnapshot {
        app_name: response.app_name,
        bundle_id: response.bundle_id,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capture_output() {
        let json = r#"{"appName":"Slack","bundleId":"com.tinyspeck.slackmacgap","lines":["text|d=1|v=hi"]}"#;
        let snapshot = parse_capture_output(json).unwrap();
        assert_eq!(snapshot.app_name, "Slack");
        assert_eq!(snapshot.bundle_id, "com.tinyspeck.slackmacgap");
        assert_eq!(snapshot.lines, vec!["text|d=1|v=hi".to_string()]);
    }

    #[test]
    fn test_parse_capture_output_error_field_wins() {
        let json = r#"{"appName":"Slack","bundleId":"x","lines":["a"],"error":"no permission"}"#;
        assert!(parse_capture_output(json).is_none());
    }

    #[test]
    fn test_parse_capture_output_garbage() {
        assert!(parse_capture_output("").is_none());
        assert!(parse_capture_output("not json").is_none());
        assert!(parse_capture_output(r#"{"lines": "oops"}"#).is_none());
    }

    #[test]
    fn test_parse_capture_output_requires_lines() {
        assert!(parse_capture_output(r#"{"appName":"Slack","bundleId":"x"}"#).is_none());
        assert!(parse_capture_output("{}\n").is_none());
    }

    #[test]
    fn test_parse_capture_output_app_fields_default() {
        let snapshot = parse_capture_output(r#"{"lines":[]}"#).unwrap();
        assert!(snapshot.app_name.is_empty());
        assert!(snapshot.bundle_id.is_empty());
        assert!(snapshot.lines.is_empty());
    }

    #[test]
    fn test_same_app() {
        let a = AxSnapshot::new("Slack", "com.slack", vec![]);
        let b = AxSnapshot::new("Slack", "com.slack", vec!["x".to_string()]);
        let c = AxSnapshot::new("Mail", "com.apple.mail", vec![]);
        assert!(a.same_app(&b));
        assert!(!a.same_app(&c));
    }
}
