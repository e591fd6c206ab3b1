//! CPU / 内存 / 磁盘资源探针

use crate::fingerprint::{NodeMerger, Probe, ProbeBatch};
use async_trait::async_trait;
use muster_core::config::FingerprintConfig;
use muster_core::constants::{ATTR_CPU_FREQUENCY, ATTR_CPU_NUMCORES, ATTR_MEMORY_TOTALBYTES};
use muster_core::error::Result;
use muster_core::node::ComputeResources;
use sysinfo::{Disks, System};

const BYTES_PER_MB: u64 = 1024 * 1024;

pub struct ResourcesProbe;

#[async_trait]
impl Probe for ResourcesProbe {
    fn name(&self) -> &'static str {
        "resources"
    }

    async fn fingerprint(&self, _cfg: &FingerprintConfig, node: &NodeMerger) -> Result<bool> {
        let mut sys = System::new_all();
        sys.refresh_all();

        let disks = Disks::new_with_refreshed_list();

        let cpu_cores = sys.cpus().len() as u32;
        let cpu_mhz = sys.cpus().first().map(|cpu| cpu.frequency()).unwrap_or(0);
        let memory_bytes = sys.total_memory();
        let disk_bytes: u64 = disks.iter().map(|disk| disk.total_space()).sum();

        let mut batch = ProbeBatch::default();
        batch.set_attribute(ATTR_CPU_NUMCORES, cpu_cores.to_string());
        batch.set_attribute(ATTR_CPU_FREQUENCY, cpu_mhz.to_string());
        batch.set_attribute(ATTR_MEMORY_TOTALBYTES, memory_bytes.to_string());
        batch.compute = Some(ComputeResources {
            cpu_cores,
            cpu_mhz,
            memory_mb: memory_bytes / BYTES_PER_MB,
            disk_mb: disk_bytes / BYTES_PER_MB,
        });

        node.commit(batch).await;
        Ok(true)
    }
}
