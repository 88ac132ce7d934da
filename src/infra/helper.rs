//! 外部 helper 进程 - 查找、带超时运行、超时后清理进程树

use anyhow::{anyhow, bail, Context, Result};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// 查找 helper 可执行文件
///
/// `command` 可以是绝对/相对路径，也可以是 PATH 中的命令名。找不到返回 `None`。
pub fn resolve_helper(command: &str) -> Option<PathBuf> {
    if command.trim().is_empty() {
        return None;
    }

    let path = Path::new(command);
    if path.components().count() > 1 || path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }

    which::which(command).ok()
}

/// 运行 helper 并返回 stdout
///
/// 超时后杀掉 helper 及其所有子进程，返回错误。非零退出码同样返回错误。
pub async fn run_helper(program: &Path, args: &[String], timeout: Duration) -> Result<String> {
    debug!(program = %program.display(), ?args, "Running helper");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {}", program.display()))?;

    let pid = child.id();
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("failed to capture stdout of {}", program.display()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("failed to capture stderr of {}", program.display()))?;

    let waited = tokio::time::timeout(timeout, async {
        let (out, err, status) = tokio::join!(
            read_all(&mut stdout),
            read_all(&mut stderr),
            child.wait()
        );
        Ok::<_, std::io::Error>((out?, err?, status?))
    })
    .await;

    let (stdout, stderr, status) = match waited {
        Ok(result) => result.with_context(|| format!("failed to wait for {}", program.display()))?,
        Err(_) => {
            // 先杀子孙进程，再杀 helper 本身，否则子孙会被 init 收养而找不到
            let killed = match pid {
                Some(pid) => tokio::task::spawn_blocking(move || kill_descendants(pid))
                    .await
                    .unwrap_or(0),
                None => 0,
            };
            if let Err(e) = child.kill().await {
                debug!(program = %program.display(), error = %e, "Helper already exited");
            }
            warn!(
                program = %program.display(),
                timeout_ms = timeout.as_millis() as u64,
                killed_descendants = killed,
                "Helper timed out and was killed"
            );
            bail!("{} timed out after {:?}", program.display(), timeout);
        }
    };

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr);
        return Err(anyhow!(
            "{} exited {}: {}",
            program.display(),
            status.code().unwrap_or(-1),
            stderr.trim()
        ));
    }

    String::from_utf8(stdout)
        .with_context(|| format!("{} wrote non-UTF-8 output", program.display()))
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// 杀掉 `root` 的所有子孙进程（不含 root 本身），返回杀掉的数量
pub fn kill_descendants(root: u32) -> usize {
    let mut system = System::new();
    system.refresh_processes_specifics(ProcessesToUpdate::All, ProcessRefreshKind::new());

    let mut children: HashMap<Pid, Vec<Pid>> = HashMap::new();
    for (pid, process) in system.processes() {
        if let Some(parent) = process.parent() {
            children.entry(parent).or_default().push(*pid);
        }
    }

    let mut killed = 0;
    let mut queue: VecDeque<Pid> = VecDeque::from([Pid::from_u32(root)]);
    while let Some(pid) = queue.pop_front() {
        for child in children.get(&pid).into_iter().flatten() {
            queue.push_back(*child);
            if let Some(process) = system.process(*child) {
                if process.kill() {
                    killed += 1;
                }
            }
        }
    }

    if killed > 0 {
        info!(root, killed, "Killed helper descendants");
    }
    killed
}
