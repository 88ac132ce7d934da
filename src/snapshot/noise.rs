//! 刷新噪声过滤
//!
//! 同一个元素（role + 稳定 id 相同）只是文本变化时，差分里会同时出现一条
//! removed（旧文本）和一条 added（新文本）。这类成对出现的行视为刷新噪声
//! （时钟、计数器、进度条），其余 added 行视为真正的新内容。

use std::collections::HashMap;

use super::diff::LineDiff;

/// 行内字段分隔符
pub const FIELD_DELIMITER: char = '|';
/// 稳定 id 字段前缀
pub const STABLE_ID_PREFIX: &str = "d=";

/// 计算一行的骨架键 `role|d=<id>`
///
/// 没有 `d=` 字段的行没有稳定身份，返回 `None`。格式不规范的行同样返回 `None`，不会 panic。
pub fn skeleton(line: &str) -> Option<String> {
    let mut fields = line.split(FIELD_DELIMITER);
    let role = fields.next()?;
    let id = fields.find(|field| field.starts_with(STABLE_ID_PREFIX))?;
    Some(format!("{}{}{}", role, FIELD_DELIMITER, id))
}

/// 从差分中去掉刷新噪声，返回真正新出现的行（保持 `added` 中的相对顺序）
///
/// 每条 removed 行的骨架最多抵消一条骨架相同的 added 行。
pub fn filter_genuine(diff: &LineDiff) -> Vec<String> {
    let mut removed_skeletons: HashMap<String, usize> = HashMap::new();
    for line in &diff.removed {
        if let Some(key) = skeleton(line) {
            *removed_skeletons.entry(key).or_insert(0) += 1;
        }
    }

    if removed_skeletons.is_empty() {
        return diff.added.clone();
    }

    diff.added
        .iter()
        .filter(|line| {
            let Some(key) = skeleton(line) else {
                return true;
            };
            match removed_skeletons.get_mut(&key) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    false
                }
                _ => true,
            }
        })
        .cloned()
        .collect()
}
