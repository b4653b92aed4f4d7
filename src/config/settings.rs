// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 默认浏览器标识
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 应用程序配置设置
///
/// 包含服务器、数据库、调度、抓取、LLM 和指标等所有配置项。
/// 通知渠道配置不在此处，它保存在数据库 `settings` 表中，每次发送前重新读取。
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 调度配置
    pub scheduler: SchedulerSettings,
    /// 页面抓取配置
    pub fetcher: FetcherSettings,
    /// LLM 配置
    pub llm: LlmSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 周期扫描配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// 是否启动周期扫描
    pub enabled: bool,
    /// 扫描间隔（秒）
    pub interval_secs: u64,
}

impl SchedulerSettings {
    /// 扫描间隔
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// 页面抓取引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchEngineKind {
    /// 无头浏览器，渲染后等待固定时长
    Browser,
    /// 纯HTTP请求
    Http,
}

/// 页面抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherSettings {
    /// 首选引擎，另一种作为后备
    pub engine: FetchEngineKind,
    /// 单页超时时间（秒）
    pub timeout_secs: u64,
    /// 页面加载后的等待时间（毫秒）
    pub settle_delay_ms: u64,
    /// User-Agent
    pub user_agent: String,
}

/// LLM 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// API 密钥，未配置时读取 `ANTHROPIC_API_KEY`
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// API 基础URL
    pub api_base_url: String,
    /// 最大输出令牌数
    pub max_tokens: u32,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl LlmSettings {
    /// 解析最终使用的 API 密钥
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `COMPWATCH__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("COMPWATCH").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 仅使用内置默认值构建配置
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.url", "sqlite://compwatch.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Hourly scan
            .set_default("scheduler.enabled", true)?
            .set_default("scheduler.interval_secs", 3600)?
            // Default fetcher settings
            .set_default("fetcher.engine", "browser")?
            .set_default("fetcher.timeout_secs", 30)?
            .set_default("fetcher.settle_delay_ms", 2000)?
            .set_default("fetcher.user_agent", DEFAULT_USER_AGENT)?
            // Default LLM settings
            .set_default("llm.model", "claude-sonnet-4-6")?
            .set_default("llm.api_base_url", "https://api.anthropic.com/v1")?
            .set_default("llm.max_tokens", 1024)?
            .set_default("llm.timeout_secs", 60)?
            // Metrics exporter is opt-in
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}
