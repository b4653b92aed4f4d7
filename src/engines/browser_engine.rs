// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::FetcherSettings;
use crate::engines::traits::{FetchError, PageFetcher};
use crate::utils::text_processing::normalize_whitespace;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

// Strips non-content elements in the page before reading the rendered text.
const EXTRACT_TEXT_SCRIPT: &str = r#"(() => {
    document
        .querySelectorAll('script, style, noscript, nav, footer, header')
        .forEach((el) => el.remove());
    return document.body ? document.body.innerText : '';
})()"#;

/// 浏览器抓取引擎
///
/// 基于chromiumoxide的无头Chromium。页面加载后固定等待一段时间，
/// 再读取渲染后的正文。浏览器实例在首次使用时启动并复用。
///
/// 设置 `CHROMIUM_REMOTE_DEBUGGING_URL` 时连接远程实例而不是本地启动。
pub struct BrowserEngine {
    browser: OnceCell<Browser>,
    timeout: Duration,
    settle_delay: Duration,
    user_agent: String,
}

impl BrowserEngine {
    /// 创建新的浏览器抓取引擎，浏览器延迟到首次抓取时启动
    pub fn new(settings: &FetcherSettings) -> Self {
        Self {
            browser: OnceCell::new(),
            timeout: Duration::from_secs(settings.timeout_secs),
            settle_delay: Duration::from_millis(settings.settle_delay_ms),
            user_agent: settings.user_agent.clone(),
        }
    }

    async fn browser(&self) -> Result<&Browser, FetchError> {
        self.browser
            .get_or_try_init(|| async {
                let remote_debugging_url = std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL").ok();

                let (browser, mut handler) = if let Some(ref url) = remote_debugging_url {
                    tracing::info!("Connecting to remote Chrome instance at: {}", url);
                    Browser::connect(url).await.map_err(|e| {
                        FetchError::Browser(format!("Failed to connect to remote Chrome: {}", e))
                    })?
                } else {
                    let config = BrowserConfig::builder()
                        .no_sandbox()
                        .request_timeout(self.timeout)
                        .arg("--disable-gpu")
                        .arg("--disable-dev-shm-usage")
                        .build()
                        .map_err(FetchError::Browser)?;

                    Browser::launch(config)
                        .await
                        .map_err(|e| FetchError::Browser(e.to_string()))?
                };

                // Drive the CDP event loop for the lifetime of the browser
                tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if event.is_err() {
                            break;
                        }
                    }
                });

                Ok(browser)
            })
            .await
    }

    async fn read_page(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        page.set_user_agent(self.user_agent.as_str())
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        page.goto(url)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        // Give client-side rendering a fixed window to settle
        tokio::time::sleep(self.settle_delay).await;

        let text: String = page
            .evaluate(EXTRACT_TEXT_SCRIPT)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?
            .into_value()
            .map_err(|e| FetchError::Browser(format!("Unexpected page text: {}", e)))?;

        Ok(normalize_whitespace(&text))
    }
}

#[async_trait]
impl PageFetcher for BrowserEngine {
    /// 使用无头浏览器抓取页面
    ///
    /// # 参数
    ///
    /// * `url` - 页面URL
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 规范化后的正文
    /// * `Err(FetchError)` - 浏览器错误或超时
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let start = Instant::now();
        let browser = self.browser().await?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let result = tokio::time::timeout(
            self.timeout + self.settle_delay,
            self.read_page(&page, url),
        )
        .await
        .map_err(|_| FetchError::Timeout)
        .and_then(|inner| inner);

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page for {}: {}", url, e);
        }

        if result.is_ok() {
            tracing::debug!(
                "Fetched {} via browser in {}ms",
                url,
                start.elapsed().as_millis()
            );
        }
        result
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "browser"
    }
}
