//! AX Context Monitor CLI
//!
//! 对比无障碍树快照、过滤系统通知，输出给 agent 的上下文

use anyhow::{bail, Context, Result};
use ax_context_monitor::{
    diff_lines, filter_genuine, parse_capture_output, AppConfig, JsonlFileSink, MessageSink,
    NotificationEvent, NotificationPipeline, Platform, ProviderRegistry, SinkDispatcher,
    SnapshotWatcher, StdoutSink,
};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "axm")]
#[command(about = "AX Context Monitor - 屏幕差分与通知过滤")]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/ax-context-monitor/config.json）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖平台检测: darwin, win32, linux
    #[arg(long, global = true)]
    platform: Option<Platform>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 对比两个采集结果文件，输出真正新出现的行
    Diff {
        /// 旧快照（采集 helper 的 JSON 输出）
        old: PathBuf,
        /// 新快照
        new: PathBuf,
        /// 输出 JSON（包含 added / removed / genuine）
        #[arg(long)]
        json: bool,
    },
    /// 采集一次前台应用快照
    Capture,
    /// 持续监控屏幕差分和系统通知
    Watch {
        /// 轮询间隔（秒），默认取配置
        #[arg(long, short)]
        interval: Option<u64>,
        /// 不订阅系统通知
        #[arg(long)]
        no_notifications: bool,
        /// 不写入上下文日志
        #[arg(long)]
        no_log: bool,
        /// Dry-run 模式（只记录日志不推送）
        #[arg(long)]
        dry_run: bool,
    },
    /// 从 stdin 读取通知事件（每行一个 JSON），过滤后输出
    Filter,
    /// 查看上下文日志中最近的消息
    Log {
        /// 显示最近 N 条
        #[arg(long, short, default_value = "20")]
        limit: usize,
        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
    /// 输出生效的配置
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ax_context_monitor=info,axm=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    let platform = cli.platform.unwrap_or_else(Platform::current);

    match cli.command {
        Commands::Diff { old, new, json } => run_diff(&old, &new, json),
        Commands::Capture => run_capture(&config, platform).await,
        Commands::Watch {
            interval,
            no_notifications,
            no_log,
            dry_run,
        } => {
            let interval = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| config.watch.interval());
            run_watch(&config, platform, interval, !no_notifications, !no_log, dry_run).await
        }
        Commands::Filter => run_filter(&config),
        Commands::Log { limit, json } => run_log(&config, limit, json),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn run_diff(old: &Path, new: &Path, json: bool) -> Result<()> {
    let read = |path: &Path| -> Result<_> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        match parse_capture_output(&content) {
            Some(snapshot) => Ok(snapshot),
            None => bail!("{} is not a usable capture result", path.display()),
        }
    };
    let old = read(old)?;
    let new = read(new)?;

    let diff = diff_lines(&old.lines, &new.lines);
    let genuine = filter_genuine(&diff);

    if json {
        let out = serde_json::json!({
            "added": diff.added,
            "removed": diff.removed,
            "genuine": genuine,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in &genuine {
            println!("{}", line);
        }
        eprintln!(
            "{} added, {} removed, {} genuine",
            diff.added.len(),
            diff.removed.len(),
            genuine.len()
        );
    }
    Ok(())
}

async fn run_capture(config: &AppConfig, platform: Platform) -> Result<()> {
    let registry = ProviderRegistry::with_defaults(&config.helpers);
    let source = registry.snapshot_source(platform);

    match source.capture().await {
        Some(snapshot) => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        None => bail!("snapshot unavailable on {} ({})", platform, source.name()),
    }
}

async fn run_watch(
    config: &AppConfig,
    platform: Platform,
    interval: Duration,
    notifications: bool,
    context_log: bool,
    dry_run: bool,
) -> Result<()> {
    let registry = Arc::new(ProviderRegistry::with_defaults(&config.helpers));

    let mut dispatcher = SinkDispatcher::new().with_dry_run(dry_run);
    dispatcher.register_sink(Arc::new(StdoutSink::new()));
    if context_log {
        dispatcher.register_sink(Arc::new(JsonlFileSink::new(config.context_log_path())));
    }
    let sink: Arc<dyn MessageSink> = Arc::new(dispatcher);

    let mut pipeline = NotificationPipeline::new(
        config.notifications.clone(),
        Arc::clone(&registry),
        platform,
        Arc::clone(&sink),
    );
    if notifications {
        pipeline.start();
    }

    let source = registry.snapshot_source(platform);
    if !source.is_available() {
        warn!(%platform, source = source.name(), "Snapshot source unavailable, screen diffs disabled until it appears");
    }

    let watcher = SnapshotWatcher::new(source, sink, interval)
        .with_diff_apps(config.notifications.diff_apps().to_vec());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(watcher.run(shutdown_rx));

    info!(%platform, "Watching, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl+C")?;

    let _ = shutdown_tx.send(true);
    handle.await.context("snapshot watcher task failed")?;
    pipeline.stop();
    Ok(())
}

fn run_filter(config: &AppConfig) -> Result<()> {
    let sink = StdoutSink::new();
    let stdin = std::io::stdin();

    let mut forwarded = 0usize;
    let mut total = 0usize;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: NotificationEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Skipping malformed notification line");
                continue;
            }
        };
        total += 1;
        if NotificationPipeline::handle_notification(&config.notifications, &sink, &event) {
            forwarded += 1;
        }
    }

    info!(total, forwarded, "Filter finished");
    Ok(())
}

fn run_log(config: &AppConfig, limit: usize, json: bool) -> Result<()> {
    let store = JsonlFileSink::new(config.context_log_path());
    let records = store.read_recent(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        eprintln!("没有记录: {}", store.path().display());
        return Ok(());
    }

    for record in records {
        println!(
            "[{}] [{}] {}",
            record.ts.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"),
            record.category,
            record.text
        );
    }
    Ok(())
}
