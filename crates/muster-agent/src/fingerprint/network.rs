//! 网络接口探针
//!
//! 取第一个非回环的 IPv4 接口写入通用的 network.ip-address 键，
//! 并登记一条 /32 的网络资源。周期性重跑让被重新分配的地址自行
//! 修正，不需要重启 Agent。

use crate::fingerprint::{NodeMerger, Probe, ProbeBatch};
use async_trait::async_trait;
use muster_core::config::FingerprintConfig;
use muster_core::constants::ATTR_NETWORK_IP;
use muster_core::error::{CoreError, Result};
use muster_core::node::NetworkResource;
use std::time::Duration;
use tracing::debug;

pub struct NetworkProbe {
    refresh_interval: Duration,
}

impl NetworkProbe {
    pub fn new(refresh_interval: Duration) -> Self {
        Self { refresh_interval }
    }

    /// 第一个非回环 IPv4 接口：探测顺序即接口报告顺序
    fn detect_primary_interface(&self) -> Result<Option<(String, String)>> {
        let interfaces = if_addrs::get_if_addrs()
            .map_err(|e| CoreError::probe_error(self.name(), e.to_string()))?;

        Ok(interfaces
            .into_iter()
            .filter(|iface| !iface.is_loopback())
            .find_map(|iface| match iface.addr {
                if_addrs::IfAddr::V4(v4) => Some((iface.name, v4.ip.to_string())),
                _ => None,
            }))
    }
}

#[async_trait]
impl Probe for NetworkProbe {
    fn name(&self) -> &'static str {
        "network"
    }

    fn period(&self) -> Option<Duration> {
        if self.refresh_interval.is_zero() {
            None
        } else {
            Some(self.refresh_interval)
        }
    }

    async fn fingerprint(&self, _cfg: &FingerprintConfig, node: &NodeMerger) -> Result<bool> {
        let Some((device, ip)) = self.detect_primary_interface()? else {
            debug!("no non-loopback IPv4 interface present");
            return Ok(false);
        };

        let mut batch = ProbeBatch::default();
        batch.set_attribute(ATTR_NETWORK_IP, ip.clone());
        batch.push_network(NetworkResource::single_address(device, ip));

        node.commit(batch).await;
        Ok(true)
    }
}
