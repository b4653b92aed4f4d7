// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffOp};

/// 显著变更阈值（百分比）
pub const SIGNIFICANCE_THRESHOLD_PERCENT: f64 = 2.0;

/// 差异计算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// 新增的行（已去除首尾空白，不含空行）
    pub added: Vec<String>,
    /// 删除的行（已去除首尾空白，不含空行）
    pub removed: Vec<String>,
    /// 变更百分比，保留一位小数，可能超过100
    pub change_percent: f64,
    /// 以 `+ ` / `- ` 为前缀的差异轨迹
    pub raw_diff: String,
    /// 是否超过显著阈值
    pub significant: bool,
}

/// 计算两段文本之间的行级差异
///
/// 使用 Myers 算法得到最小的行插入/删除集合。每一条被插入或删除的行按
/// 字符数加一（行终止符）计入变更量，空行也计入。变更百分比为
/// `变更量 / (2 × max(旧文本长度, 1)) × 100`，不做上限截断。
///
/// # 参数
///
/// * `old_text` - 上一次快照的正文
/// * `new_text` - 本次抓取的正文
///
/// # 返回值
///
/// 差异结果，相同输入总是得到相同输出
pub fn compute_diff(old_text: &str, new_text: &str) -> DiffResult {
    let old_lines: Vec<&str> = old_text.lines().collect();
    let new_lines: Vec<&str> = new_text.lines().collect();

    let mut builder = DiffBuilder::default();
    for op in capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
        match op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                builder.removed(&old_lines[old_index..old_index + old_len]);
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                builder.inserted(&new_lines[new_index..new_index + new_len]);
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                builder.removed(&old_lines[old_index..old_index + old_len]);
                builder.inserted(&new_lines[new_index..new_index + new_len]);
            }
        }
    }

    let old_len = old_text.chars().count().max(1);
    let ratio = builder.changed_chars as f64 / (2 * old_len) as f64;
    let change_percent = (ratio * 1000.0).round() / 10.0;

    DiffResult {
        added: builder.added,
        removed: builder.removed,
        change_percent,
        raw_diff: builder.trace.join("\n"),
        significant: change_percent > SIGNIFICANCE_THRESHOLD_PERCENT,
    }
}

#[derive(Default)]
struct DiffBuilder {
    added: Vec<String>,
    removed: Vec<String>,
    trace: Vec<String>,
    changed_chars: usize,
}

impl DiffBuilder {
    fn inserted(&mut self, lines: &[&str]) {
        for line in lines {
            self.record(line, "+ ", true);
        }
    }

    fn removed(&mut self, lines: &[&str]) {
        for line in lines {
            self.record(line, "- ", false);
        }
    }

    fn record(&mut self, line: &str, prefix: &str, inserted: bool) {
        self.changed_chars += line.chars().count() + 1;

        let trimmed = line.trim();
        self.trace.push(format!("{}{}", prefix, trimmed));
        if trimmed.is_empty() {
            return;
        }
        if inserted {
            self.added.push(trimmed.to_string());
        } else {
            self.removed.push(trimmed.to_string());
        }
    }
}
