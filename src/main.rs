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

use compwatch::config::settings::{FetchEngineKind, FetcherSettings, Settings};
use compwatch::domain::repositories::change_repository::ChangeRepository;
use compwatch::domain::repositories::settings_repository::SettingsRepository;
use compwatch::domain::repositories::snapshot_repository::SnapshotRepository;
use compwatch::domain::repositories::target_repository::TargetRepository;
use compwatch::domain::services::classifier_service::LlmChangeClassifier;
use compwatch::domain::services::notification_service::NotificationDispatcher;
use compwatch::domain::services::scan_service::ScanService;
use compwatch::engines::browser_engine::BrowserEngine;
use compwatch::engines::reqwest_engine::ReqwestEngine;
use compwatch::engines::router::EngineRouter;
use compwatch::engines::traits::PageFetcher;
use compwatch::infrastructure::database::connection;
use compwatch::infrastructure::repositories::change_repo_impl::ChangeRepoImpl;
use compwatch::infrastructure::repositories::settings_repo_impl::SettingsRepoImpl;
use compwatch::infrastructure::repositories::snapshot_repo_impl::SnapshotRepoImpl;
use compwatch::infrastructure::repositories::target_repo_impl::TargetRepoImpl;
use compwatch::infrastructure::services::anthropic_client::AnthropicClient;
use compwatch::infrastructure::services::email_transport::LettreEmailTransport;
use compwatch::infrastructure::services::webhook_transport::{
    ReqwestWebhookTransport, DEFAULT_WEBHOOK_TIMEOUT,
};
use compwatch::presentation::routes::{self, AppComponents};
use compwatch::queue::scheduler::ScanScheduler;
use compwatch::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 按配置顺序构建抓取引擎，首选引擎失败时回退到另一个
fn build_fetcher(settings: &FetcherSettings) -> anyhow::Result<Arc<dyn PageFetcher>> {
    let http: Arc<dyn PageFetcher> = Arc::new(ReqwestEngine::new(settings)?);
    let browser: Arc<dyn PageFetcher> = Arc::new(BrowserEngine::new(settings));

    let engines = match settings.engine {
        FetchEngineKind::Browser => vec![browser, http],
        FetchEngineKind::Http => vec![http, browser],
    };

    let router = EngineRouter::new(engines);
    info!("Fetch engines: {:?}", router.engine_names());
    Ok(Arc::new(router))
}

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting compwatch...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    compwatch::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Connect to database and apply migrations
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);

    // 4. Repositories
    let target_repo: Arc<dyn TargetRepository> = Arc::new(TargetRepoImpl::new(db.clone()));
    let snapshot_repo: Arc<dyn SnapshotRepository> = Arc::new(SnapshotRepoImpl::new(db.clone()));
    let change_repo: Arc<dyn ChangeRepository> = Arc::new(ChangeRepoImpl::new(db.clone()));
    let settings_repo: Arc<dyn SettingsRepository> = Arc::new(SettingsRepoImpl::new(db.clone()));

    // 5. Pipeline services
    let fetcher = build_fetcher(&settings.fetcher)?;

    let llm_client = AnthropicClient::new(&settings.llm)?;
    if !llm_client.is_configured() {
        warn!("No LLM API key configured, every change will be classified with the fallback");
    }
    let classifier = Arc::new(LlmChangeClassifier::new(Arc::new(llm_client)));

    let dispatcher = Arc::new(NotificationDispatcher::new(
        settings_repo.clone(),
        Arc::new(ReqwestWebhookTransport::new(DEFAULT_WEBHOOK_TIMEOUT)?),
        Arc::new(LettreEmailTransport::default()),
    ));

    let scan_service = Arc::new(ScanService::new(
        target_repo.clone(),
        snapshot_repo.clone(),
        change_repo.clone(),
        fetcher,
        classifier,
        dispatcher.clone(),
    ));

    // 6. Recurring scans
    let scheduler = ScanScheduler::new(scan_service.clone(), settings.scheduler.interval());
    if settings.scheduler.enabled {
        scheduler.start();
        info!(
            "Scheduler started, scanning every {}s",
            settings.scheduler.interval_secs
        );
    } else {
        info!("Scheduler disabled");
    }

    // 7. Start HTTP server
    let app = routes::routes(AppComponents {
        target_repo,
        snapshot_repo,
        change_repo,
        settings_repo,
        scan_service,
        dispatcher,
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
