//! 通知管道 - 订阅系统通知、过滤、格式化并推送到 agent 上下文
//!
//! # 设计目标
//! 1. 平台解耦：每个平台的 provider 实现 `NotificationProvider` trait，由 registry 选择
//! 2. 串行处理：provider 推送的事件经单消费者队列处理，保证顺序
//! 3. 出口统一：所有输出都经过 `MessageSink`，可以用 `SinkDispatcher` 同时推送到多个 sink
//! 4. 永不致命：provider 不可用只会让管道保持停止状态
//!
//! # 使用示例
//! ```ignore
//! use ax_context_monitor::notification::{NotificationConfig, NotificationPipeline, StdoutSink};
//!
//! let registry = Arc::new(ProviderRegistry::with_defaults(&HelperConfig::default()));
//! let mut pipeline = NotificationPipeline::new(
//!     NotificationConfig::default(),
//!     registry,
//!     Platform::current(),
//!     Arc::new(StdoutSink::new()),
//! );
//! pipeline.start();
//! ```

pub mod dispatcher;
pub mod event;
pub mod filter;
pub mod formatter;
pub mod pipeline;
pub mod provider;
pub mod sink;
pub mod store;

pub use dispatcher::SinkDispatcher;
pub use event::{NotificationConfig, NotificationEvent};
pub use filter::{matches_app, passes_filter};
pub use formatter::{format_local_time, format_notification, format_screen_update};
pub use pipeline::{NotificationPipeline, PipelineState};
pub use provider::{EventSender, HelperNotificationProvider, NotificationProvider, UnavailableProvider};
pub use sink::{ChannelSink, ContextMessage, MessageSink, StdoutSink, CATEGORY_NOTIFICATION, CATEGORY_SCREEN};
pub use store::JsonlFileSink;
