//! 行级多重集差分
//!
//! 两次 AX 快照之间按「行值 → 出现次数」比较，顺序无关、重复行按次数计。
//! 滚动位置变化（仅重排）不会产生差分。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 差分结果
///
/// `added` 与 `removed` 都是以序列形式给出的多重集：同一行出现 N 次表示 N 份。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl LineDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// 计算 `old` → `new` 的多重集对称差
///
/// 对每个不同的行值取 `delta = count(new) - count(old)`，正数进入 `added`，
/// 负数进入 `removed`，重复 `|delta|` 次。
/// `added` 按该行在 `new` 中首次出现的顺序排列，`removed` 按 `old` 中的顺序。
pub fn diff_lines<S: AsRef<str>>(old: &[S], new: &[S]) -> LineDiff {
    let mut delta: HashMap<&str, i64> = HashMap::with_capacity(old.len() + new.len());
    for line in old {
        *delta.entry(line.as_ref()).or_insert(0) -= 1;
    }
    for line in new {
        *delta.entry(line.as_ref()).or_insert(0) += 1;
    }

    let mut added = Vec::new();
    for line in new {
        let line = line.as_ref();
        if let Some(count) = delta.get_mut(line) {
            if *count > 0 {
                added.extend(std::iter::repeat(line.to_string()).take(*count as usize));
                // 已输出，后续重复出现不再计入
                *count = 0;
            }
        }
    }

    let mut removed = Vec::new();
    for line in old {
        let line = line.as_ref();
        if let Some(count) = delta.get_mut(line) {
            if *count < 0 {
                removed.extend(std::iter::repeat(line.to_string()).take(count.unsigned_abs() as usize));
                *count = 0;
            }
        }
    }

    LineDiff { added, removed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let a = lines(&["row|v=1", "row|v=1", "button|label=OK"]);
        assert!(diff_lines(&a, &a).is_empty());
    }

    #[test]
    fn test_diff_ignores_reordering() {
        let a = lines(&["a", "b", "c", "b"]);
        let b = lines(&["b", "c", "b", "a"]);
        assert!(diff_lines(&a, &b).is_empty());
    }

    #[test]
    fn test_diff_empty_old_adds_everything() {
        let empty: Vec<String> = Vec::new();
        let b = lines(&["x", "y", "x"]);
        let diff = diff_lines(&empty, &b);
        assert_eq!(diff.added, lines(&["x", "x", "y"]));
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_diff_empty_new_removes_everything() {
        let empty: Vec<String> = Vec::new();
        let a = lines(&["x", "y"]);
        let diff = diff_lines(&a, &empty);
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed, lines(&["x", "y"]));
    }

    #[test]
    fn test_diff_counts_duplicates() {
        let a = lines(&["row|v=1", "row|v=1"]);
        let b = lines(&["row|v=1"]);
        let diff = diff_lines(&a, &b);
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed, lines(&["row|v=1"]));

        let diff = diff_lines(&b, &lines(&["row|v=1", "row|v=1", "row|v=1"]));
        assert_eq!(diff.added, lines(&["row|v=1", "row|v=1"]));
    }

    #[test]
    fn test_diff_accepts_str_slices() {
        let diff = diff_lines(&["a", "b"], &["b", "c"]);
        assert_eq!(diff.added, vec!["c".to_string()]);
        assert_eq!(diff.removed, vec!["a".to_string()]);
    }
}
