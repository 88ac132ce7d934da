//! 消息格式化 - 通知与屏幕差分转成推送给 agent 的文本块

use chrono::{Local, TimeZone};

use super::event::NotificationEvent;
use crate::snapshot::AxSnapshot;

/// 本地时间格式，固定为 C locale 的 `%c` 布局（如 `Tue Nov 14 22:13:20 2023`）
const LOCAL_TIME_FORMAT: &str = "%c";

/// 秒级时间戳转本地日期时间字符串
///
/// 超出可表示范围的时间戳原样输出秒数。
pub fn format_local_time(timestamp_seconds: f64) -> String {
    let millis = (timestamp_seconds * 1000.0).round() as i64;
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format(LOCAL_TIME_FORMAT).to_string(),
        None => format!("{}", timestamp_seconds),
    }
}

/// 格式化通知
///
/// `[App: {app}] [Time: {local}] [Title: {title}]\n{body}`
pub fn format_notification(event: &NotificationEvent) -> String {
    format!(
        "[App: {}] [Time: {}] [Title: {}]\n{}",
        event.app_name,
        format_local_time(event.timestamp_seconds),
        event.title,
        event.body
    )
}

/// 格式化屏幕上真正新出现的内容
pub fn format_screen_update(snapshot: &AxSnapshot, genuine: &[String]) -> String {
    let mut out = format!("[App: {}] [New on screen: {}]", snapshot.app_name, genuine.len());
    for line in genuine {
        out.push('\n');
        out.push_str(line);
    }
    out
}
