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

use async_trait::async_trait;
use thiserror::Error;

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非成功的HTTP状态码
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 浏览器错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl FetchError {
    /// 判断错误是否值得换一个引擎重试
    ///
    /// 明确的4xx响应说明页面本身不可用，换引擎也无济于事
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::HttpStatus(status) => *status >= 500 || *status == 403 || *status == 429,
            _ => true,
        }
    }
}

/// 页面抓取特质
///
/// 给定URL，返回规范化后的纯文本正文
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取页面并提取正文
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
