//! 通知过滤管道
//!
//! provider → 单消费者队列 → 黑白名单过滤 → 格式化 → MessageSink。
//! provider 可能从多个线程推送，队列保证处理是串行且有序的。

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::event::{NotificationConfig, NotificationEvent};
use super::filter::passes_filter;
use super::formatter::format_notification;
use super::provider::NotificationProvider;
use super::sink::{MessageSink, CATEGORY_NOTIFICATION};
use crate::platform::Platform;
use crate::registry::ProviderRegistry;

/// 管道状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Stopped,
    Started,
}

/// 活动的订阅
struct Subscription {
    provider: Arc<dyn NotificationProvider>,
    consumer: JoinHandle<()>,
}

/// 通知过滤管道
pub struct NotificationPipeline {
    config: Arc<NotificationConfig>,
    registry: Arc<ProviderRegistry>,
    platform: Platform,
    sink: Arc<dyn MessageSink>,
    subscription: Option<Subscription>,
}

impl NotificationPipeline {
    pub fn new(
        config: NotificationConfig,
        registry: Arc<ProviderRegistry>,
        platform: Platform,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            platform,
            sink,
            subscription: None,
        }
    }

    /// 当前状态；provider 的事件流结束（例如 helper 退出）后视为 `Stopped`
    pub fn state(&self) -> PipelineState {
        if self.is_subscribed() {
            PipelineState::Started
        } else {
            PipelineState::Stopped
        }
    }

    fn is_subscribed(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|subscription| !subscription.consumer.is_finished())
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// 启动管道
    ///
    /// 配置禁用、平台没有 provider 或 provider 不可用时只记录日志，保持 `Stopped`。
    /// 已经启动时不做任何事；事件流已结束的旧订阅会先被清理。需要在 tokio runtime 中调用。
    pub fn start(&mut self) -> PipelineState {
        if self.is_subscribed() {
            debug!("Notification pipeline already started");
            return PipelineState::Started;
        }
        if self.subscription.is_some() {
            info!("Notification stream ended, resubscribing");
            self.stop();
        }

        if !self.config.enabled {
            info!("Notification pipeline disabled by config");
            return PipelineState::Stopped;
        }

        let Some(provider) = self.registry.notification_provider(self.platform) else {
            info!(platform = %self.platform, "No notification provider for platform");
            return PipelineState::Stopped;
        };

        if !provider.is_available() {
            info!(
                platform = %self.platform,
                provider = provider.name(),
                "Notification provider unavailable, pipeline stays stopped"
            );
            return PipelineState::Stopped;
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<NotificationEvent>();
        if let Err(e) = provider.start(tx) {
            warn!(provider = provider.name(), error = %e, "Failed to start notification provider");
            return PipelineState::Stopped;
        }

        let config = Arc::clone(&self.config);
        let sink = Arc::clone(&self.sink);
        let consumer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                Self::handle_notification(&config, sink.as_ref(), &event);
            }
            debug!("Notification queue closed");
        });

        info!(platform = %self.platform, provider = provider.name(), "Notification pipeline started");
        self.subscription = Some(Subscription { provider, consumer });
        PipelineState::Started
    }

    /// 停止管道，已停止时不做任何事
    pub fn stop(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        subscription.provider.stop();
        subscription.consumer.abort();
        info!(provider = subscription.provider.name(), "Notification pipeline stopped");
    }

    /// 处理一条通知：过滤通过则格式化并推送，返回是否推送
    pub fn handle_notification(
        config: &NotificationConfig,
        sink: &dyn MessageSink,
        event: &NotificationEvent,
    ) -> bool {
        if !passes_filter(event, config) {
            debug!(id = %event.id, app = %event.app_name, "Notification filtered out");
            return false;
        }

        sink.push(CATEGORY_NOTIFICATION, &format_notification(event));
        debug!(id = %event.id, app = %event.app_name, sink = sink.name(), "Notification forwarded");
        true
    }
}

impl Drop for NotificationPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}
