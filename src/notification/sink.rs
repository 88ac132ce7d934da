//! MessageSink trait 定义 - 推送给 agent 上下文的出口

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// 通知类消息
pub const CATEGORY_NOTIFICATION: &str = "notification";
/// 屏幕差分类消息
pub const CATEGORY_SCREEN: &str = "screen";

/// 推送到 sink 的一条上下文消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub ts: DateTime<Utc>,
    pub category: String,
    pub text: String,
}

impl ContextMessage {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            category: category.into(),
            text: text.into(),
        }
    }
}

/// 消息出口 trait
///
/// `push` 是 fire-and-forget：没有返回值，失败由实现自行记录日志，不重试。
pub trait MessageSink: Send + Sync {
    /// sink 名称（用于日志）
    fn name(&self) -> &str;

    /// 推送一条消息
    fn push(&self, category: &str, text: &str);
}

/// 标准输出 sink - 每条消息输出一行 JSON
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn push(&self, category: &str, text: &str) {
        let message = ContextMessage::new(category, text);
        let line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(e) => {
                warn!(sink = "stdout", error = %e, "Failed to serialize message");
                return;
            }
        };

        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
            warn!(sink = "stdout", error = %e, "Failed to write message");
        }
    }
}

/// 进程内 channel sink - 嵌入方从 receiver 读取消息
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ContextMessage>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ContextMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MessageSink for ChannelSink {
    fn name(&self) -> &str {
        "channel"
    }

    fn push(&self, category: &str, text: &str) {
        if self.tx.send(ContextMessage::new(category, text)).is_err() {
            debug!(sink = "channel", "Receiver dropped, message discarded");
        }
    }
}
