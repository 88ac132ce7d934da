//! AX Context Monitor - 对比无障碍树快照、过滤系统通知，为 agent 提供低噪声的屏幕上下文

pub mod config;
pub mod infra;
pub mod notification;
pub mod platform;
pub mod registry;
pub mod snapshot;

pub use config::{AppConfig, HelperConfig, WatchConfig};
pub use infra::{HelperSnapshotSource, SnapshotSource, UnavailableSnapshotSource};
pub use notification::{
    ChannelSink, ContextMessage, JsonlFileSink, MessageSink, NotificationConfig,
    NotificationEvent, NotificationPipeline, NotificationProvider, PipelineState, SinkDispatcher,
    StdoutSink,
};
pub use platform::Platform;
pub use registry::ProviderRegistry;
pub use snapshot::{diff_lines, filter_genuine, parse_capture_output, skeleton, AxSnapshot, LineDiff, SnapshotWatcher};
