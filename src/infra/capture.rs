//! AX 快照采集 - 调用平台 helper 获取前台应用的无障碍树
//!
//! 采集失败（helper 缺失、超时、非零退出、输出无法解析、输出带 error）
//! 一律视为「本次不可用」，返回 `None`，不会向调用方返回错误。

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use super::helper::{resolve_helper, run_helper};
use crate::snapshot::{parse_capture_output, AxSnapshot};

/// macOS helper 超时
pub const DARWIN_CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);
/// Windows helper 超时（UI Automation 遍历较慢）
pub const WIN32_CAPTURE_TIMEOUT: Duration = Duration::from_secs(15);

/// 快照来源
///
/// 调用方需要串行调用 `capture`，并发调用可能启动多个 helper 进程。
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// 来源名称（用于日志）
    fn name(&self) -> &str;

    /// 当前环境是否能采集
    fn is_available(&self) -> bool;

    /// 采集一次快照，不可用时返回 `None`
    async fn capture(&self) -> Option<AxSnapshot>;
}

/// 通过外部 helper 进程采集
pub struct HelperSnapshotSource {
    name: String,
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl HelperSnapshotSource {
    pub fn new(name: impl Into<String>, command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            timeout,
        }
    }

    /// 设置 helper 参数
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// macOS 采集（AXUIElement helper）
    pub fn darwin(command: impl Into<String>) -> Self {
        Self::new("darwin-ax", command, DARWIN_CAPTURE_TIMEOUT)
    }

    /// Windows 采集（UI Automation helper）
    pub fn win32(command: impl Into<String>) -> Self {
        Self::new("win32-uia", command, WIN32_CAPTURE_TIMEOUT)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl SnapshotSource for HelperSnapshotSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        resolve_helper(&self.command).is_some()
    }

    async fn capture(&self) -> Option<AxSnapshot> {
        let Some(program) = resolve_helper(&self.command) else {
            debug!(source = %self.name, command = %self.command, "Capture helper not found");
            return None;
        };

        match run_helper(&program, &self.args, self.timeout).await {
            Ok(stdout) => parse_capture_output(&stdout),
            Err(e) => {
                warn!(source = %self.name, error = %e, "Capture failed");
                None
            }
        }
    }
}

/// 没有采集实现的平台（Linux 等），总是不可用
pub struct UnavailableSnapshotSource {
    name: String,
}

impl UnavailableSnapshotSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl SnapshotSource for UnavailableSnapshotSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn capture(&self) -> Option<AxSnapshot> {
        None
    }
}
