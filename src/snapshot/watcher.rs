//! 屏幕差分监控 - 定时采集快照，只推送真正新出现的内容
//!
//! 只保留上一次的快照作为基线。第一次成功采集、以及前台应用切换时，
//! 只更新基线不推送。采集不可用的 tick 直接跳过，基线保持不变。

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::diff::diff_lines;
use super::noise::filter_genuine;
use super::AxSnapshot;
use crate::infra::capture::SnapshotSource;
use crate::notification::filter::matches_app;
use crate::notification::formatter::format_screen_update;
use crate::notification::sink::{MessageSink, CATEGORY_SCREEN};

/// 屏幕差分监控器
pub struct SnapshotWatcher {
    source: Arc<dyn SnapshotSource>,
    sink: Arc<dyn MessageSink>,
    interval: Duration,
    /// 只对这些应用推送；为空表示所有应用
    diff_apps: Vec<String>,
    previous: Option<AxSnapshot>,
}

impl SnapshotWatcher {
    pub fn new(source: Arc<dyn SnapshotSource>, sink: Arc<dyn MessageSink>, interval: Duration) -> Self {
        Self {
            source,
            sink,
            interval,
            diff_apps: Vec::new(),
            previous: None,
        }
    }

    /// 限定推送的应用列表
    pub fn with_diff_apps(mut self, diff_apps: Vec<String>) -> Self {
        self.diff_apps = diff_apps;
        self
    }

    /// 当前基线
    pub fn baseline(&self) -> Option<&AxSnapshot> {
        self.previous.as_ref()
    }

    fn is_diff_app(&self, snapshot: &AxSnapshot) -> bool {
        self.diff_apps.is_empty()
            || matches_app(&self.diff_apps, &snapshot.app_name, Some(&snapshot.bundle_id))
    }

    /// 执行一次采集与差分，返回推送出去的新内容行
    pub async fn tick(&mut self) -> Vec<String> {
        let Some(current) = self.source.capture().await else {
            debug!(source = self.source.name(), "Snapshot unavailable this tick");
            return Vec::new();
        };

        let previous = match self.previous.replace(current) {
            Some(previous) => previous,
            None => {
                debug!("Snapshot baseline seeded");
                return Vec::new();
            }
        };
        let Some(current) = self.previous.as_ref() else {
            return Vec::new();
        };

        if !previous.same_app(current) {
            info!(
                from = %previous.app_name,
                to = %current.app_name,
                "Foreground app changed, baseline reset"
            );
            return Vec::new();
        }

        let diff = diff_lines(&previous.lines, &current.lines);
        if diff.is_empty() {
            return Vec::new();
        }

        let genuine = filter_genuine(&diff);
        debug!(
            app = %current.app_name,
            added = diff.added.len(),
            removed = diff.removed.len(),
            genuine = genuine.len(),
            "Snapshot diff classified"
        );

        if genuine.is_empty() || !self.is_diff_app(current) {
            return Vec::new();
        }

        self.sink.push(CATEGORY_SCREEN, &format_screen_update(current, &genuine));
        genuine
    }

    /// 按间隔循环执行 `tick`，直到 `shutdown` 变为 true 或发送端关闭
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        // 上一次采集超时时不补发 tick，避免并发采集
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            source = self.source.name(),
            interval_ms = self.interval.as_millis() as u64,
            "Snapshot watcher started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            // 采集可能持续到超时，关闭信号不等它结束；取消只发生在采集的 await 上，基线不受影响
            tokio::select! {
                _ = self.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Snapshot watcher stopped");
    }
}
