//! Sink 分发器 - 管理多个 sink 并把消息推送到每一个

use super::sink::MessageSink;
use std::sync::Arc;
use tracing::info;

/// Sink 分发器，本身也是一个 MessageSink
pub struct SinkDispatcher {
    /// 所有注册的 sink
    sinks: Vec<Arc<dyn MessageSink>>,
    /// 是否为 dry-run 模式
    dry_run: bool,
}

impl SinkDispatcher {
    /// 创建新的分发器
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 注册 sink
    pub fn register_sink(&mut self, sink: Arc<dyn MessageSink>) {
        info!(sink = sink.name(), "Registering message sink");
        self.sinks.push(sink);
    }

    /// 获取已注册的 sink 数量
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// 获取已注册的 sink 名称
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }
}

impl Default for SinkDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSink for SinkDispatcher {
    fn name(&self) -> &str {
        "dispatcher"
    }

    fn push(&self, category: &str, text: &str) {
        for sink in &self.sinks {
            if self.dry_run {
                info!(sink = sink.name(), category, chars = text.chars().count(), "[DRY-RUN] Would push message");
                continue;
            }
            sink.push(category, text);
        }
    }
}
