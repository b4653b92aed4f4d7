// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::change_repository::ChangeRepository;
use crate::domain::repositories::settings_repository::SettingsRepository;
use crate::domain::repositories::snapshot_repository::SnapshotRepository;
use crate::domain::repositories::target_repository::TargetRepository;
use crate::domain::services::notification_service::NotificationDispatcher;
use crate::domain::services::scan_service::ScanService;
use crate::presentation::handlers::{
    change_handler, scan_handler, settings_handler, target_handler,
};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 路由依赖的共享组件
#[derive(Clone)]
pub struct AppComponents {
    pub target_repo: Arc<dyn TargetRepository>,
    pub snapshot_repo: Arc<dyn SnapshotRepository>,
    pub change_repo: Arc<dyn ChangeRepository>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub scan_service: Arc<ScanService>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

/// 创建应用路由
///
/// # 参数
///
/// * `components` - 仓库与服务实例，以 `Extension` 注入处理器
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(components: AppComponents) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/competitors",
            get(target_handler::list_targets).post(target_handler::create_target),
        )
        .route(
            "/api/competitors/{id}",
            get(target_handler::get_target).delete(target_handler::delete_target),
        )
        .route("/api/changes", get(change_handler::list_changes))
        .route("/api/scan", post(scan_handler::scan_target))
        .route("/api/scan/all", post(scan_handler::scan_all))
        .route(
            "/api/settings",
            get(settings_handler::get_settings).post(settings_handler::update_settings),
        )
        .route(
            "/api/settings/test-webhook",
            post(settings_handler::test_webhook),
        )
        .route("/api/settings/test-email", post(settings_handler::test_email))
        .layer(Extension(components.target_repo))
        .layer(Extension(components.snapshot_repo))
        .layer(Extension(components.change_repo))
        .layer(Extension(components.settings_repo))
        .layer(Extension(components.scan_service))
        .layer(Extension(components.dispatcher));

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}
