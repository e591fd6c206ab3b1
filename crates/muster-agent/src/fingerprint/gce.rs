//! GCE 云探针
//!
//! 先做一次廉价的可达性检查（取实例 ID）；多数主机不在 GCE 上，
//! 这条路径必须快且对 Node 零副作用。可达后再取一组众知子资源，
//! 逐项写入 platform.gce.* 命名空间。

use crate::fingerprint::metadata::{MetadataClient, MetadataValue};
use crate::fingerprint::{NodeMerger, Probe, ProbeBatch};
use async_trait::async_trait;
use muster_core::config::FingerprintConfig;
use muster_core::constants::{
    ATTR_NETWORK_IP, platform_attr_key, platform_key, platform_tag_key,
};
use muster_core::error::{CoreError, Result};
use muster_core::node::NetworkResource;
use std::collections::HashMap;
use tracing::{debug, warn};

const PROVIDER: &str = "gce";

/// 标量子资源：相对路径、属性字段名、body 是否为资源路径形式
const SCALAR_FIELDS: &[(&str, &str, bool)] = &[
    ("hostname", "hostname", false),
    // zone 与 machine-type 返回 projects/<n>/zones/<zone> 形式的
    // 资源路径，属性只保留末段
    ("zone", "zone", true),
    ("machine-type", "machine-type", true),
];

const PRIVATE_IP_PATH: &str = "network-interfaces/0/ip";
const EXTERNAL_IP_PATH: &str = "network-interfaces/0/access-configs/0/external-ip";
const TAGS_PATH: &str = "tags";
const ATTRIBUTES_PATH: &str = "attributes/?recursive=true";

pub struct GceProbe;

#[async_trait]
impl Probe for GceProbe {
    fn name(&self) -> &'static str {
        "gce"
    }

    async fn fingerprint(&self, cfg: &FingerprintConfig, node: &NodeMerger) -> Result<bool> {
        let client = MetadataClient::new(cfg)?;

        // 可达性检查：拿不到实例 ID 就不在 GCE 上
        let instance_id = match client.get("id").await? {
            MetadataValue::Body(id) => id,
            MetadataValue::Unreachable => {
                debug!("GCE metadata service unreachable, not a GCE host");
                return Ok(false);
            }
            MetadataValue::Absent => {
                debug!("GCE metadata service has no instance id, not a GCE host");
                return Ok(false);
            }
        };

        let mut batch = ProbeBatch::default();
        let mut partial_errors: Vec<String> = Vec::new();

        batch.set_attribute(platform_key(PROVIDER, "id"), instance_id.clone());
        // 实例 ID 记入 Links，供外部资产系统互查
        batch.set_link(PROVIDER, instance_id);

        for &(path, field, is_resource_path) in SCALAR_FIELDS {
            match client.get(path).await {
                Ok(MetadataValue::Body(body)) => {
                    let value = if is_resource_path {
                        last_path_segment(&body).to_string()
                    } else {
                        body
                    };
                    batch.set_attribute(platform_key(PROVIDER, field), value);
                }
                // 不存在的可选子资源：对应键整个不设，而不是设成空串
                Ok(MetadataValue::Absent) | Ok(MetadataValue::Unreachable) => {}
                Err(e) => partial_errors.push(e.to_string()),
            }
        }

        match client.get(PRIVATE_IP_PATH).await {
            Ok(MetadataValue::Body(ip)) => {
                batch.set_attribute(ATTR_NETWORK_IP, ip.clone());
                batch.push_network(NetworkResource::single_address("eth0", ip));
            }
            Ok(_) => {}
            Err(e) => partial_errors.push(e.to_string()),
        }

        // 外网 IP 是尽力而为的可选项
        match client.get(EXTERNAL_IP_PATH).await {
            Ok(MetadataValue::Body(ip)) => {
                batch.set_attribute(platform_key(PROVIDER, "external-ip"), ip);
            }
            Ok(_) => {}
            Err(e) => partial_errors.push(e.to_string()),
        }

        match client.get(TAGS_PATH).await {
            Ok(MetadataValue::Body(body)) => match serde_json::from_str::<Vec<String>>(&body) {
                Ok(tags) => {
                    for tag in tags {
                        batch.set_attribute(platform_tag_key(PROVIDER, &tag), "true");
                    }
                }
                Err(e) => partial_errors.push(format!("malformed tags body: {e}")),
            },
            Ok(_) => {}
            Err(e) => partial_errors.push(e.to_string()),
        }

        match client.get(ATTRIBUTES_PATH).await {
            Ok(MetadataValue::Body(body)) => {
                match serde_json::from_str::<HashMap<String, String>>(&body) {
                    Ok(attrs) => {
                        for (name, value) in attrs {
                            batch.set_attribute(platform_attr_key(PROVIDER, &name), value);
                        }
                    }
                    Err(e) => partial_errors.push(format!("malformed attributes body: {e}")),
                }
            }
            Ok(_) => {}
            Err(e) => partial_errors.push(e.to_string()),
        }

        // 部分失败不回滚：已取到的字段照常提交，错误单独上报
        node.commit(batch).await;

        if partial_errors.is_empty() {
            Ok(true)
        } else {
            warn!(
                probe = self.name(),
                errors = partial_errors.len(),
                "GCE fingerprint committed with partial errors"
            );
            Err(CoreError::probe_error(
                self.name(),
                partial_errors.join("; "),
            ))
        }
    }
}

/// 资源路径（projects/<n>/zones/<zone>）的末段
fn last_path_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
