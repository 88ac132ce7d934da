//! 应用黑白名单过滤

use super::event::{NotificationConfig, NotificationEvent};

/// 应用名或 bundle id 是否与列表中任一项相同（忽略大小写）
pub fn matches_app(list: &[String], app_name: &str, bundle_id: Option<&str>) -> bool {
    let app_name = app_name.to_lowercase();
    let bundle_id = bundle_id.map(str::to_lowercase);
    list.iter().any(|entry| {
        let entry = entry.to_lowercase();
        entry == app_name || bundle_id.as_deref() == Some(entry.as_str())
    })
}

/// 判断通知是否应该转发
///
/// 黑名单优先：命中黑名单直接拒绝；白名单非空时必须命中白名单。
/// 两个列表都为空表示不做限制。
pub fn passes_filter(event: &NotificationEvent, config: &NotificationConfig) -> bool {
    let bundle_id = event.bundle_id.as_deref();

    let blacklist = config.blacklist();
    if !blacklist.is_empty() && matches_app(blacklist, &event.app_name, bundle_id) {
        return false;
    }

    let whitelist = config.whitelist();
    if !whitelist.is_empty() && !matches_app(whitelist, &event.app_name, bundle_id) {
        return false;
    }

    true
}
