//! 通知 provider - 订阅平台的实时通知流
//!
//! macOS / Windows 由外部 helper 进程在 stdout 上逐行输出 JSON 事件；
//! Linux 没有实现，provider 总是不可用。

use anyhow::{anyhow, Context, Result};
use std::process::Stdio;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::event::NotificationEvent;
use crate::infra::helper::resolve_helper;

/// provider 推送事件的通道
pub type EventSender = mpsc::UnboundedSender<NotificationEvent>;

/// 通知 provider trait
pub trait NotificationProvider: Send + Sync {
    /// provider 名称（用于日志）
    fn name(&self) -> &str;

    /// 当前环境是否支持
    fn is_available(&self) -> bool;

    /// 开始订阅，事件写入 `events`
    ///
    /// 需要在 tokio runtime 中调用。
    fn start(&self, events: EventSender) -> Result<()>;

    /// 取消订阅，重复调用无副作用
    fn stop(&self);
}

/// 通过外部 helper 进程订阅通知
pub struct HelperNotificationProvider {
    name: String,
    command: String,
    args: Vec<String>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl HelperNotificationProvider {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            reader: Mutex::new(None),
        }
    }

    /// 设置 helper 参数
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// macOS 通知中心 helper
    pub fn darwin(command: impl Into<String>) -> Self {
        Self::new("darwin-usernotifications", command)
    }

    /// Windows UserNotificationListener helper
    pub fn win32(command: impl Into<String>) -> Self {
        Self::new("win32-usernotificationlistener", command)
    }

    /// 当前是否有活动的订阅
    pub fn is_running(&self) -> bool {
        self.reader
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl NotificationProvider for HelperNotificationProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        resolve_helper(&self.command).is_some()
    }

    fn start(&self, events: EventSender) -> Result<()> {
        let program = resolve_helper(&self.command)
            .ok_or_else(|| anyhow!("notification helper not found: {}", self.command))?;

        let mut child = Command::new(&program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {}", program.display()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("failed to capture stdout of {}", program.display()))?;

        let name = self.name.clone();
        info!(provider = %name, program = %program.display(), "Notification helper started");

        let handle = tokio::spawn(async move {
            // child 归此任务所有，任务被 abort 时随之 drop 并被杀掉
            let _child = child;
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<NotificationEvent>(&line) {
                            Ok(event) => {
                                if events.send(event).is_err() {
                                    debug!(provider = %name, "Event receiver dropped");
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(provider = %name, error = %e, "Skipping malformed notification line");
                            }
                        }
                    }
                    Ok(None) => {
                        info!(provider = %name, "Notification helper closed its output");
                        break;
                    }
                    Err(e) => {
                        warn!(provider = %name, error = %e, "Notification helper read error");
                        break;
                    }
                }
            }
        });

        let mut reader = self.reader.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = reader.replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    fn stop(&self) {
        if let Some(handle) = self.reader.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
            info!(provider = %self.name, "Notification helper stopped");
        }
    }
}

/// 没有通知实现的平台，总是不可用
pub struct UnavailableProvider {
    name: String,
}

impl UnavailableProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl NotificationProvider for UnavailableProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        false
    }

    fn start(&self, _events: EventSender) -> Result<()> {
        Err(anyhow!("{} has no notification support", self.name))
    }

    fn stop(&self) {}
}
