//! 主机基础探针：OS / 内核 / 架构 / 主机名
//!
//! 这是强制探针：整轮探测里一个探针都没成功且 host 在启用集合中时，
//! 首轮按失败处理。

use crate::fingerprint::{NodeMerger, Probe, ProbeBatch};
use async_trait::async_trait;
use muster_core::config::FingerprintConfig;
use muster_core::constants::{
    ATTR_CPU_ARCH, ATTR_HOSTNAME, ATTR_KERNEL_NAME, ATTR_KERNEL_VERSION, ATTR_OS_NAME,
    ATTR_OS_VERSION,
};
use muster_core::error::Result;
use sysinfo::System;

pub struct HostProbe;

#[async_trait]
impl Probe for HostProbe {
    fn name(&self) -> &'static str {
        "host"
    }

    async fn fingerprint(&self, _cfg: &FingerprintConfig, node: &NodeMerger) -> Result<bool> {
        let mut batch = ProbeBatch::default();

        batch.set_attribute(ATTR_KERNEL_NAME, std::env::consts::OS);
        batch.set_attribute(ATTR_CPU_ARCH, std::env::consts::ARCH);

        if let Some(name) = System::name() {
            batch.set_attribute(ATTR_OS_NAME, name);
        }
        if let Some(version) = System::os_version() {
            batch.set_attribute(ATTR_OS_VERSION, version);
        }
        if let Some(kernel) = System::kernel_version() {
            batch.set_attribute(ATTR_KERNEL_VERSION, kernel);
        }

        if let Some(name) = hostname::get().ok().and_then(|s| s.into_string().ok()) {
            batch.set_attribute(ATTR_HOSTNAME, name);
        }

        node.commit(batch).await;
        Ok(true)
    }
}
