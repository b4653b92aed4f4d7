// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::scan_service::ScanService;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// 周期执行的作业
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// 执行一次作业，错误由作业自行记录
    async fn run(&self);

    /// 作业名称
    fn name(&self) -> &'static str;
}

#[async_trait]
impl ScheduledJob for ScanService {
    async fn run(&self) {
        match self.scan_all().await {
            Ok(response) => info!(
                "Scheduled scan finished: {} target(s), {} page(s), {} error(s)",
                response.results.len(),
                response.page_count(),
                response.error_count()
            ),
            Err(e) => error!("Scheduled scan failed: {}", e),
        }
    }

    fn name(&self) -> &'static str {
        "scan_all"
    }
}

/// 扫描调度器
///
/// 持有唯一的周期触发器。`start` 在进程生命周期内只生效一次，
/// 之后的调用不会再启动第二个定时器。
pub struct ScanScheduler {
    /// 周期作业
    job: Arc<dyn ScheduledJob>,
    /// 触发间隔
    period: Duration,
    /// 是否已启动
    started: AtomicBool,
}

impl ScanScheduler {
    /// 创建新的扫描调度器
    ///
    /// # 参数
    ///
    /// * `job` - 每次触发执行的作业
    /// * `period` - 触发间隔
    pub fn new(job: Arc<dyn ScheduledJob>, period: Duration) -> Self {
        Self {
            job,
            period,
            started: AtomicBool::new(false),
        }
    }

    /// 是否已经启动
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// 启动调度器后台任务
    ///
    /// 第一次触发发生在一个完整间隔之后。上一轮未结束时错过的触发会被跳过。
    ///
    /// # 返回值
    ///
    /// 首次调用返回后台任务句柄，之后的调用返回 `None`
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Scheduler already started; ignoring");
            return None;
        }

        let job = self.job.clone();
        let period = self.period;
        info!("Scheduling {} every {:?}", job.name(), period);

        Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                info!("Running scheduled {}", job.name());
                job.run().await;
            }
        }))
    }
}
