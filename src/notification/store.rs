//! 上下文日志 - 本地 JSONL 文件读写

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use super::sink::{ContextMessage, MessageSink};

const MAX_RECORDS: usize = 500;
const KEEP_AFTER_CLEANUP: usize = 250;
const CLEANUP_CHECK_INTERVAL: usize = 20;
/// 估算行数时使用的平均每行字节数
const AVG_RECORD_BYTES: u64 = 200;

/// JSONL 文件 sink - 把推送过的消息追加写入本地文件
pub struct JsonlFileSink {
    path: PathBuf,
    write_count: AtomicUsize,
}

impl JsonlFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_count: AtomicUsize::new(0),
        }
    }

    /// 默认存储路径
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("ax-context-monitor")
            .join("context.jsonl")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加记录（带文件锁）
    pub fn append(&self, record: &ContextMessage) -> Result<()> {
        use fs2::FileExt;

        // 确保目录存在
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        file.lock_exclusive()?;
        let written = writeln!(file, "{}", serde_json::to_string(record)?);
        file.unlock()?;
        written?;

        self.maybe_cleanup();
        Ok(())
    }

    /// 读取最近 N 条记录
    pub fn read_recent(&self, n: usize) -> Vec<ContextMessage> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };

        let records = read_records(file);
        let start = records.len().saturating_sub(n);
        let mut recent = records[start..].to_vec();
        recent.sort_by_key(|r| r.ts);
        recent
    }

    /// 定期检查并清理
    fn maybe_cleanup(&self) {
        let count = self.write_count.fetch_add(1, Ordering::Relaxed);
        if count % CLEANUP_CHECK_INTERVAL != 0 {
            return;
        }

        if let Ok(metadata) = fs::metadata(&self.path) {
            let estimated = (metadata.len() / AVG_RECORD_BYTES) as usize;
            if estimated > MAX_RECORDS {
                if let Err(e) = self.cleanup() {
                    warn!(path = %self.path.display(), error = %e, "Context log cleanup failed");
                }
            }
        }
    }

    /// 执行清理（保留最近的记录）
    fn cleanup(&self) -> Result<()> {
        use fs2::FileExt;

        let file = File::open(&self.path)?;
        file.lock_exclusive()?;

        let records = read_records(&file);
        if records.len() <= MAX_RECORDS {
            file.unlock()?;
            return Ok(());
        }

        let start = records.len().saturating_sub(KEEP_AFTER_CLEANUP);
        let temp_path = self.path.with_extension("tmp");
        {
            let mut temp_file = File::create(&temp_path)?;
            for record in &records[start..] {
                writeln!(temp_file, "{}", serde_json::to_string(record)?)?;
            }
        }

        // 原子替换
        fs::rename(&temp_path, &self.path)?;
        file.unlock()?;

        debug!(kept = records.len() - start, "Context log trimmed");
        Ok(())
    }
}

impl MessageSink for JsonlFileSink {
    fn name(&self) -> &str {
        "jsonl_file"
    }

    fn push(&self, category: &str, text: &str) {
        let record = ContextMessage::new(category, text);
        if let Err(e) = self.append(&record) {
            warn!(sink = "jsonl_file", error = %e, "Failed to append context message");
        }
    }
}

fn read_records<R: std::io::Read>(reader: R) -> Vec<ContextMessage> {
    BufReader::new(reader)
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| serde_json::from_str(&line).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read_recent() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlFileSink::new(dir.path().join("nested").join("context.jsonl"));

        sink.push("notification", "one");
        sink.push("screen", "two");
        sink.push("notification", "three");

        let recent = sink.read_recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text, "two");
        assert_eq!(recent[1].text, "three");
    }

    #[test]
    fn test_read_recent_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlFileSink::new(dir.path().join("missing.jsonl"));
        assert!(sink.read_recent(10).is_empty());
    }

    #[test]
    fn test_read_recent_skips_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("context.jsonl");
        let good = serde_json::to_string(&ContextMessage::new("screen", "ok")).unwrap();
        fs::write(&path, format!("not json\n{}\n", good)).unwrap();

        let sink = JsonlFileSink::new(&path);
        let recent = sink.read_recent(10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].text, "ok");
    }

    #[test]
    fn test_cleanup_keeps_latest_records() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlFileSink::new(dir.path().join("context.jsonl"));
        let padding = "x".repeat(AVG_RECORD_BYTES as usize);

        for i in 0..(MAX_RECORDS + CLEANUP_CHECK_INTERVAL + 1) {
            sink.push("screen", &format!("{} {}", i, padding));
        }

        let all = sink.read_recent(usize::MAX);
        assert!(all.len() <= MAX_RECORDS);
        let last = all.last().unwrap();
        assert!(last.text.starts_with(&format!("{} ", MAX_RECORDS + CLEANUP_CHECK_INTERVAL)));
    }
}
