//! Provider registry - 按平台选择通知 provider 与快照来源
//!
//! registry 是显式构造的值，由调用方传入管道和 watcher，没有全局状态。

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::HelperConfig;
use crate::infra::capture::{HelperSnapshotSource, SnapshotSource, UnavailableSnapshotSource};
use crate::notification::provider::{
    HelperNotificationProvider, NotificationProvider, UnavailableProvider,
};
use crate::platform::Platform;

/// 平台实现注册表
#[derive(Default)]
pub struct ProviderRegistry {
    notification_providers: HashMap<Platform, Arc<dyn NotificationProvider>>,
    snapshot_sources: HashMap<Platform, Arc<dyn SnapshotSource>>,
}

impl ProviderRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册默认实现：darwin / win32 走 helper 进程，linux 总是不可用
    pub fn with_defaults(helpers: &HelperConfig) -> Self {
        let mut registry = Self::new();

        registry.register_notification_provider(
            Platform::Darwin,
            Arc::new(HelperNotificationProvider::darwin(helpers.darwin_notify.clone())),
        );
        registry.register_notification_provider(
            Platform::Win32,
            Arc::new(HelperNotificationProvider::win32(helpers.win32_notify.clone())),
        );
        registry.register_notification_provider(
            Platform::Linux,
            Arc::new(UnavailableProvider::new("linux")),
        );

        registry.register_snapshot_source(
            Platform::Darwin,
            Arc::new(HelperSnapshotSource::darwin(helpers.darwin_capture.clone())),
        );
        registry.register_snapshot_source(
            Platform::Win32,
            Arc::new(HelperSnapshotSource::win32(helpers.win32_capture.clone())),
        );
        registry.register_snapshot_source(
            Platform::Linux,
            Arc::new(UnavailableSnapshotSource::new("linux")),
        );

        registry
    }

    /// 注册通知 provider（同平台覆盖旧的）
    pub fn register_notification_provider(
        &mut self,
        platform: Platform,
        provider: Arc<dyn NotificationProvider>,
    ) {
        debug!(%platform, provider = provider.name(), "Registering notification provider");
        self.notification_providers.insert(platform, provider);
    }

    /// 注册快照来源（同平台覆盖旧的）
    pub fn register_snapshot_source(&mut self, platform: Platform, source: Arc<dyn SnapshotSource>) {
        debug!(%platform, source = source.name(), "Registering snapshot source");
        self.snapshot_sources.insert(platform, source);
    }

    /// 平台对应的通知 provider，未注册返回 `None`
    pub fn notification_provider(&self, platform: Platform) -> Option<Arc<dyn NotificationProvider>> {
        self.notification_providers.get(&platform).cloned()
    }

    /// 平台对应的快照来源，未注册时返回一个总是不可用的来源
    pub fn snapshot_source(&self, platform: Platform) -> Arc<dyn SnapshotSource> {
        self.snapshot_sources
            .get(&platform)
            .cloned()
            .unwrap_or_else(|| Arc::new(UnavailableSnapshotSource::new(platform.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.notification_provider(Platform::Darwin).is_none());
        assert!(!registry.snapshot_source(Platform::Darwin).is_available());
    }

    #[test]
    fn test_defaults_cover_known_platforms() {
        let registry = ProviderRegistry::with_defaults(&HelperConfig::default());
        for platform in [Platform::Darwin, Platform::Win32, Platform::Linux] {
            assert!(registry.notification_provider(platform).is_some());
        }
        assert!(registry.notification_provider(Platform::Unsupported).is_none());
    }

    #[test]
    fn test_linux_is_always_unavailable() {
        let registry = ProviderRegistry::with_defaults(&HelperConfig::default());
        assert!(!registry.notification_provider(Platform::Linux).unwrap().is_available());
        assert!(!registry.snapshot_source(Platform::Linux).is_available());
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = ProviderRegistry::with_defaults(&HelperConfig::default());
        registry.register_notification_provider(
            Platform::Darwin,
            Arc::new(UnavailableProvider::new("override")),
        );
        assert_eq!(
            registry.notification_provider(Platform::Darwin).unwrap().name(),
            "override"
        );
    }
}
