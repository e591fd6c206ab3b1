//! 节点属性合并器 - 所有 Node 变更的唯一入口
//!
//! 并发的探针任务把各自的批量输出交到这里串行提交；读者在任何时刻
//! 看到的都是若干完整批次的并集，不存在写了一半的探针输出。

use crate::fingerprint::ProbeBatch;
use muster_core::node::Node;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct NodeMerger {
    node: Arc<RwLock<Node>>,
}

impl NodeMerger {
    pub fn new(node: Node) -> Self {
        Self {
            node: Arc::new(RwLock::new(node)),
        }
    }

    /// 原子提交一个探针批次
    ///
    /// 属性键与链接键均为后写覆盖；网络资源按设备名就地替换，
    /// 首次见到的设备追加，周期性重探不会造成同一设备的重复条目。
    pub async fn commit(&self, batch: ProbeBatch) {
        if batch.is_empty() {
            return;
        }

        let mut node = self.node.write().await;

        for (key, value) in batch.attributes {
            node.attributes.insert(key, value);
        }
        for (provider, id) in batch.links {
            node.links.insert(provider, id);
        }

        if let Some(compute) = batch.compute {
            node.resources.cpu_cores = compute.cpu_cores;
            node.resources.cpu_mhz = compute.cpu_mhz;
            node.resources.memory_mb = compute.memory_mb;
            node.resources.disk_mb = compute.disk_mb;
        }

        for net in batch.networks {
            match node
                .resources
                .networks
                .iter_mut()
                .find(|existing| existing.device == net.device)
            {
                Some(existing) => *existing = net,
                None => node.resources.networks.push(net),
            }
        }
    }

    /// 当前节点记录的一致快照
    pub async fn snapshot(&self) -> Node {
        self.node.read().await.clone()
    }
}
