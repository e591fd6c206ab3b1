//! 探针注册表
//!
//! Agent 启动时显式构建一次的有序探针集合，支持运维方的允许/拒绝
//! 名单过滤与平台过滤。名单里出现未知探针名属于致命配置错误，在
//! 任何探测开始之前就报出来。

use crate::fingerprint::{Probe, built_in_probes};
use muster_core::config::FingerprintConfig;
use muster_core::error::{CoreError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub struct Registry {
    probes: Vec<Arc<dyn Probe>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "probes",
                &self.probes.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Registry {
    /// 用内置探针集按配置构建注册表
    pub fn build(cfg: &FingerprintConfig) -> Result<Self> {
        Self::from_probes(built_in_probes(cfg), cfg)
    }

    /// 用给定探针集构建注册表；测试用缩减集也走同一条路径
    pub fn from_probes(all: Vec<Arc<dyn Probe>>, cfg: &FingerprintConfig) -> Result<Self> {
        let known: HashSet<&str> = all.iter().map(|probe| probe.name()).collect();

        for name in cfg.allowlist.iter().chain(cfg.denylist.iter()) {
            if !known.contains(name.as_str()) {
                return Err(CoreError::config_error(format!(
                    "unknown probe '{name}' in fingerprint allowlist/denylist"
                )));
            }
        }

        let current_os = std::env::consts::OS;
        let probes = all
            .into_iter()
            .filter(|probe| {
                cfg.allowlist.is_empty() || cfg.allowlist.iter().any(|n| n == probe.name())
            })
            .filter(|probe| !cfg.denylist.iter().any(|n| n == probe.name()))
            .filter(|probe| {
                let platforms = probe.platforms();
                let supported = platforms.is_empty() || platforms.contains(&current_os);
                if !supported {
                    debug!(probe = probe.name(), os = current_os, "probe not supported on this platform");
                }
                supported
            })
            .collect();

        Ok(Self { probes })
    }

    pub fn probes(&self) -> &[Arc<dyn Probe>] {
        &self.probes
    }

    pub fn contains(&self, name: &str) -> bool {
        self.probes.iter().any(|probe| probe.name() == name)
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}
