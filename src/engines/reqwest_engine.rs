// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::settings::FetcherSettings;
use crate::engines::traits::{FetchError, PageFetcher};
use crate::utils::text_processing::extract_page_text;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取引擎，不执行JavaScript
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    /// 创建新的HTTP抓取引擎
    ///
    /// # 参数
    ///
    /// * `settings` - 抓取配置，使用其中的超时与User-Agent
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 引擎实例
    /// * `Err(FetchError)` - HTTP客户端构建失败
    pub fn new(settings: &FetcherSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// 非2xx响应视为抓取失败
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::RequestFailed(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let html = response.text().await?;
        let text = extract_page_text(&html);
        debug!(
            "Fetched {} via reqwest in {}ms ({} chars)",
            url,
            start.elapsed().as_millis(),
            text.len()
        );
        Ok(text)
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
