//! 节点指纹探测子系统
//!
//! 一个探针负责一族环境（云 provider、内核/OS、网络接口、CPU/内存）的
//! 检测：自行判定适用性，适用时把一组带命名空间的属性/链接/资源写到
//! 共享的 Node 上。所有写入都经过 [`merger::NodeMerger`] 这个唯一的
//! 同步写入口。
//!
//! 适用性与成败是两回事：裸金属主机够不到云元数据端点是最常见的
//! 预期情况，表现为 `Ok(false)`，绝不是错误。

pub mod gce;
pub mod host;
pub mod merger;
pub mod metadata;
pub mod network;
pub mod registry;
pub mod resources;
pub mod runner;

pub use merger::NodeMerger;
pub use registry::Registry;
pub use runner::{PassReport, Runner};

use async_trait::async_trait;
use muster_core::config::FingerprintConfig;
use muster_core::error::Result;
use muster_core::node::{ComputeResources, NetworkResource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// 单次探针调用积累的输出，经合并器一次性提交
#[derive(Debug, Clone, Default)]
pub struct ProbeBatch {
    pub attributes: HashMap<String, String>,
    pub links: HashMap<String, String>,
    pub networks: Vec<NetworkResource>,
    pub compute: Option<ComputeResources>,
}

impl ProbeBatch {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
            && self.links.is_empty()
            && self.networks.is_empty()
            && self.compute.is_none()
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn set_link(&mut self, provider: impl Into<String>, id: impl Into<String>) {
        self.links.insert(provider.into(), id.into());
    }

    pub fn push_network(&mut self, net: NetworkResource) {
        self.networks.push(net);
    }
}

/// 环境探针的能力契约
///
/// 探针在多次调用之间无状态；每次调用把产出积累进一个
/// [`ProbeBatch`] 并恰好提交一次（部分失败路径上也先提交再返回
/// 错误，已取到的字段不因后续子请求失败而丢失）。
#[async_trait]
pub trait Probe: Send + Sync {
    /// 探针名，注册表内唯一，允许/拒绝名单按它过滤
    fn name(&self) -> &'static str;

    /// 限定运行平台（`std::env::consts::OS` 取值）；空表示全平台
    fn platforms(&self) -> &'static [&'static str] {
        &[]
    }

    /// 周期性探针的重跑间隔；None 表示只在首轮跑一次
    fn period(&self) -> Option<Duration> {
        None
    }

    /// 探测并通过合并器提交结果
    ///
    /// `Ok(true)` 适用且已提交数据；`Ok(false)` 目标环境不存在，
    /// Node 未被改动；`Err(_)` 尝试过但异常失败。
    async fn fingerprint(&self, cfg: &FingerprintConfig, node: &NodeMerger) -> Result<bool>;
}

/// 内置探针集合，按固定顺序构建
pub fn built_in_probes(cfg: &FingerprintConfig) -> Vec<Arc<dyn Probe>> {
    vec![
        Arc::new(host::HostProbe),
        Arc::new(resources::ResourcesProbe),
        Arc::new(network::NetworkProbe::new(Duration::from_secs(
            cfg.network_refresh_interval_sec,
        ))),
        Arc::new(gce::GceProbe),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch() {
        let mut batch = ProbeBatch::default();
        assert!(batch.is_empty());

        batch.set_attribute("os.name", "linux");
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_built_in_probe_names_are_unique() {
        let probes = built_in_probes(&FingerprintConfig::default());
        let mut names: Vec<&str> = probes.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), probes.len());
    }
}
