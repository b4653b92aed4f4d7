// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 启动 Prometheus 指标导出器
///
/// 未启用或地址无效时只记录日志，不影响服务启动
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    metrics::describe_counter!("scan_pages_total", "Pages scanned, labelled by outcome");
    metrics::describe_counter!("changes_detected_total", "Significant changes persisted");
    metrics::describe_counter!("notifications_sent_total", "Notifications delivered per channel");
    metrics::describe_counter!("notifications_failed_total", "Notification failures per channel");
    metrics::describe_counter!("classifier_fallbacks_total", "Classifier replies that fell back");
    metrics::describe_histogram!("scan_duration_seconds", "Duration of full scan runs");
}
