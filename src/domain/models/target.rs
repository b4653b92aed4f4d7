// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// 页面列表解析错误
#[derive(Error, Debug)]
pub enum PagesError {
    /// 不是合法的JSON字符串数组
    #[error("pages is not a JSON array of strings: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// 列表为空
    #[error("pages list is empty")]
    Empty,
    /// 某个页面不是合法的 http(s) URL
    #[error("invalid page url: {0}")]
    InvalidUrl(String),
}

/// 监控目标实体
///
/// 一个被监控的实体（例如竞争对手），包含名称、站点URL以及需要独立监控的页面列表。
/// 页面列表以JSON数组文本保存，读取时再校验，损坏的数据不会阻止其他目标的扫描。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// 目标唯一标识符
    pub id: Uuid,
    /// 显示名称
    pub name: String,
    /// 站点URL
    pub url: String,
    /// 页面URL列表（JSON数组文本）
    pub pages: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Target {
    /// 创建一个新的监控目标
    ///
    /// # 参数
    ///
    /// * `name` - 显示名称
    /// * `url` - 站点URL
    /// * `pages` - 需要监控的页面URL
    ///
    /// # 返回值
    ///
    /// 返回包含新ID和当前时间戳的目标实例
    pub fn new(name: String, url: String, pages: &[String]) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            url,
            pages: serde_json::Value::from(pages.to_vec()).to_string(),
            created_at: Utc::now(),
        }
    }

    /// 解析并校验页面列表
    ///
    /// 列表必须是非空的字符串数组，且每一项都是 http(s) URL
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<String>)` - 按原顺序排列的页面URL
    /// * `Err(PagesError)` - 页面数据损坏
    pub fn page_urls(&self) -> Result<Vec<String>, PagesError> {
        parse_page_list(&self.pages)
    }
}

/// 解析JSON数组形式的页面列表
pub fn parse_page_list(raw: &str) -> Result<Vec<String>, PagesError> {
    let pages: Vec<String> = serde_json::from_str(raw)?;
    if pages.is_empty() {
        return Err(PagesError::Empty);
    }

    for page in &pages {
        let valid = Url::parse(page)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            return Err(PagesError::InvalidUrl(page.clone()));
        }
    }

    Ok(pages)
}
