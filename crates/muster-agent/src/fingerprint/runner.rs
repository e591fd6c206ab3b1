//! 探针运行器
//!
//! 首轮：所有启用的探针作为独立任务并发执行，单探针有超时，整轮
//! 受启动截止时间约束——注册流程不能被一个挂死的 provider 端点
//! 无限阻塞。首轮之后，带周期标记的探针各自挂在重复定时器上跑到
//! Agent 停机，每次触发都经合并器重新提交。
//!
//! 单个探针的失败永远不会中止运行器；运行器只汇总并记录失败。

use crate::fingerprint::{NodeMerger, Probe, Registry};
use muster_core::config::FingerprintConfig;
use muster_core::error::{CoreError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, interval, timeout, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 没有任何探针成功时，这些探针在启用集合中会导致整轮失败
const MANDATORY_PROBES: &[&str] = &["host"];

/// 一轮探测的按探针结果汇总
#[derive(Debug, Default)]
pub struct PassReport {
    /// 适用并已提交数据的探针
    pub applied: Vec<String>,
    /// 目标环境不存在的探针（预期情况，非失败）
    pub skipped: Vec<String>,
    /// 超时或异常失败的探针
    pub failed: Vec<String>,
}

pub struct Runner {
    registry: Arc<Registry>,
    cfg: Arc<FingerprintConfig>,
    merger: NodeMerger,
    shutdown: CancellationToken,
    periodic: Vec<JoinHandle<()>>,
}

impl Runner {
    pub fn new(
        registry: Registry,
        cfg: FingerprintConfig,
        merger: NodeMerger,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            cfg: Arc::new(cfg),
            merger,
            shutdown,
            periodic: Vec::new(),
        }
    }

    /// 执行首轮探测
    ///
    /// 只有在零个探针成功且强制探针在启用集合中时才返回错误；
    /// 其余情况下失败的探针仅记入报告与日志。
    pub async fn run_initial_pass(&self) -> Result<PassReport> {
        let probe_timeout = Duration::from_secs(self.cfg.probe_timeout_sec);
        let deadline = Instant::now() + Duration::from_secs(self.cfg.startup_deadline_sec);

        let mut set: JoinSet<(&'static str, Result<bool>)> = JoinSet::new();
        for probe in self.registry.probes() {
            let probe = probe.clone();
            let cfg = self.cfg.clone();
            let merger = self.merger.clone();
            set.spawn(async move {
                let name = probe.name();
                match timeout(probe_timeout, probe.fingerprint(&cfg, &merger)).await {
                    Ok(result) => (name, result),
                    Err(_) => (
                        name,
                        Err(CoreError::probe_error(
                            name,
                            format!("timed out after {probe_timeout:?}"),
                        )),
                    ),
                }
            });
        }

        let mut report = PassReport::default();
        loop {
            let joined = match timeout_at(deadline, set.join_next()).await {
                Ok(Some(joined)) => joined,
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        pending = set.len(),
                        "fingerprint pass exceeded startup deadline, aborting remaining probes"
                    );
                    set.abort_all();
                    break;
                }
            };

            match joined {
                Ok((name, Ok(true))) => {
                    info!(probe = name, "fingerprint applied");
                    report.applied.push(name.to_string());
                }
                Ok((name, Ok(false))) => {
                    debug!(probe = name, "fingerprint not applicable");
                    report.skipped.push(name.to_string());
                }
                Ok((name, Err(e))) => {
                    warn!(probe = name, error = %e, "fingerprint failed");
                    report.failed.push(name.to_string());
                }
                Err(e) => {
                    warn!(error = %e, "fingerprint task panicked");
                }
            }
        }

        // 全军覆没且强制探针本应运行：整轮失败
        if report.applied.is_empty() {
            if let Some(mandatory) = MANDATORY_PROBES
                .iter()
                .find(|name| self.registry.contains(name))
            {
                return Err(CoreError::probe_error(
                    *mandatory,
                    "no fingerprint applied and mandatory probe did not succeed",
                ));
            }
        }

        Ok(report)
    }

    /// 启动周期层：每个周期探针一个独立定时器任务
    pub fn spawn_periodic(&mut self) {
        for probe in self.registry.probes() {
            let Some(period) = probe.period() else {
                continue;
            };

            let probe = probe.clone();
            let cfg = self.cfg.clone();
            let merger = self.merger.clone();
            let token = self.shutdown.clone();

            info!(probe = probe.name(), ?period, "starting periodic fingerprint");
            self.periodic.push(tokio::spawn(async move {
                let mut timer = interval(period);
                // interval 的首个 tick 立即到期；首轮已经覆盖过一次，先消费掉
                timer.tick().await;

                loop {
                    tokio::select! {
                        _ = token.cancelled() => {
                            debug!(probe = probe.name(), "periodic fingerprint cancelled");
                            break;
                        }
                        _ = timer.tick() => {
                            match probe.fingerprint(&cfg, &merger).await {
                                Ok(true) => debug!(probe = probe.name(), "periodic fingerprint recommitted"),
                                Ok(false) => debug!(probe = probe.name(), "periodic fingerprint not applicable"),
                                Err(e) => warn!(probe = probe.name(), error = %e, "periodic fingerprint failed"),
                            }
                        }
                    }
                }
            }));
        }
    }

    /// 取消所有周期定时器并等它们退出；返回后不再有任何 Node 变更
    ///
    /// 在途的探针调用允许跑完当前一次（select 只在等待 tick 时响应
    /// 取消），但不会被重新调度。
    pub async fn shutdown(&mut self) {
        self.shutdown.cancel();
        for handle in self.periodic.drain(..) {
            let _ = handle.await;
        }
    }
}
