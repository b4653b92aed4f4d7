// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{FetchError, PageFetcher};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// 引擎路由器
///
/// 按顺序尝试各个抓取引擎，前一个引擎失败且错误可重试时交给下一个
pub struct EngineRouter {
    /// 引擎列表（按优先级排序）
    engines: Vec<Arc<dyn PageFetcher>>,
}

impl EngineRouter {
    /// 创建新的引擎路由器
    ///
    /// # 参数
    ///
    /// * `engines` - 引擎列表，第一个为首选引擎
    ///
    /// # 返回值
    ///
    /// 返回新的引擎路由器实例
    pub fn new(engines: Vec<Arc<dyn PageFetcher>>) -> Self {
        Self { engines }
    }

    /// 引擎名称，按尝试顺序
    pub fn engine_names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|engine| engine.name()).collect()
    }
}

#[async_trait]
impl PageFetcher for EngineRouter {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut last_error = None;

        for engine in &self.engines {
            match engine.fetch_text(url).await {
                Ok(text) => {
                    if last_error.is_some() {
                        info!("Engine {} succeeded for {} after fallback", engine.name(), url);
                    }
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Engine {} failed for {}: {}", engine.name(), url, e);
                    let retryable = e.is_retryable();
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Other("No fetch engines configured".into())))
    }

    fn name(&self) -> &'static str {
        "router"
    }
}
