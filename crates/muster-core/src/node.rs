//! 节点记录 - 探测结果汇聚成的环境无关数据模型
//!
//! Node 由 Agent 持有整个生命周期；探针只能通过合并器修改它，
//! 任何读者看到的都是已完成提交的探针输出的并集。

use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 待注册的节点记录
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Node {
    pub id: NodeId,
    /// 点分键 -> 值，键唯一，后写覆盖
    pub attributes: HashMap<String, String>,
    /// provider 名 -> 外部实例 ID，用于与外部资产系统互查
    pub links: HashMap<String, String>,
    pub resources: Resources,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            attributes: HashMap::new(),
            links: HashMap::new(),
            resources: Resources::default(),
        }
    }
}

/// 节点资源概况
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Resources {
    pub cpu_cores: u32,
    pub cpu_mhz: u64,
    pub memory_mb: u64,
    pub disk_mb: u64,
    /// 按探测顺序排列；多网卡主机上跨次运行的顺序不作保证
    pub networks: Vec<NetworkResource>,
}

/// 探针算出的标量资源事实，整体覆盖 Resources 的对应字段
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct ComputeResources {
    pub cpu_cores: u32,
    pub cpu_mhz: u64,
    pub memory_mb: u64,
    pub disk_mb: u64,
}

/// 单个被观测到的网络地址
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkResource {
    /// 设备名，非空
    pub device: String,
    pub ip: String,
    /// 单地址块 <ip>/32：探针观测到的是一个地址，不是整个子网
    pub cidr: String,
    /// 链路速率（Mbit/s），未知时为 0
    pub mbits: u64,
}

impl NetworkResource {
    /// 以全主机掩码构造一条单地址记录
    pub fn single_address(device: impl Into<String>, ip: impl Into<String>) -> Self {
        let ip = ip.into();
        let cidr = format!("{ip}/32");
        Self {
            device: device.into(),
            ip,
            cidr,
            mbits: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_empty() {
        let node = Node::new(NodeId::new("n1"));
        assert!(node.attributes.is_empty());
        assert!(node.links.is_empty());
        assert_eq!(node.resources, Resources::default());
    }

    #[test]
    fn test_single_address_cidr() {
        let net = NetworkResource::single_address("eth0", "10.240.0.5");
        assert_eq!(net.ip, "10.240.0.5");
        assert_eq!(net.cidr, "10.240.0.5/32");
        assert_eq!(net.mbits, 0);
    }

    #[test]
    fn test_node_serializes_to_json() {
        let mut node = Node::new(NodeId::new("n1"));
        node.attributes
            .insert("os.name".to_string(), "linux".to_string());
        node.resources
            .networks
            .push(NetworkResource::single_address("eth0", "10.0.0.1"));

        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"os.name\":\"linux\""));
        assert!(json.contains("\"cidr\":\"10.0.0.1/32\""));
    }
}
