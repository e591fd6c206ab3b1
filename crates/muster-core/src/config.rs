//! The unified configuration module for the entire Muster application.

use serde::{Deserialize, Serialize};

/// The unified configuration for the Muster agent.
/// This structure is loaded from the muster.toml file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct MusterConfig {
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
}

impl MusterConfig {
    /// 从指定路径或当前目录中的 muster.toml 加载配置；支持以 MUSTER__ 为前缀的环境变量覆盖（Figment）
    pub fn load_config(path: Option<&str>) -> Result<Self, anyhow::Error> {
        use figment::{Figment, providers::Env, providers::Format, providers::Toml};
        use std::path::Path;

        // 基础：默认配置
        let mut figment = Figment::from(figment::providers::Serialized::defaults(
            MusterConfig::default(),
        ));

        // 文件层：显式路径优先，否则尝试工作目录下 muster.toml
        if let Some(p) = path {
            figment = figment.merge(Toml::file(Path::new(p)));
        } else {
            let default_path = Path::new("muster.toml");
            if default_path.exists() {
                figment = figment.merge(Toml::file(default_path));
            }
        }

        // 环境变量层
        figment = figment.merge(Env::prefixed("MUSTER__").split("__"));

        let cfg: MusterConfig = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load config via Figment: {}", e))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// 验证配置参数的有效性
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let fp = &self.fingerprint;

        if fp.startup_deadline_sec == 0 || fp.startup_deadline_sec > 300 {
            return Err(anyhow::anyhow!(
                "startup_deadline_sec must be between 1 and 300"
            ));
        }

        if fp.probe_timeout_sec == 0 || fp.probe_timeout_sec > fp.startup_deadline_sec {
            return Err(anyhow::anyhow!(
                "probe_timeout_sec must be between 1 and startup_deadline_sec"
            ));
        }

        // 同时出现在允许和拒绝名单中的探针没有明确语义，按配置错误处理
        for name in &fp.allowlist {
            if fp.denylist.contains(name) {
                return Err(anyhow::anyhow!(
                    "probe '{}' appears in both allowlist and denylist",
                    name
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String, // info|debug
    #[serde(default = "default_log_format")]
    pub log_format: String, // text|json
    #[serde(default)]
    pub no_ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            no_ansi: false,
        }
    }
}

/// 指纹子系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FingerprintConfig {
    /// 允许运行的探针名单；空表示全部启用
    #[serde(default)]
    pub allowlist: Vec<String>,
    /// 禁止运行的探针名单
    #[serde(default)]
    pub denylist: Vec<String>,
    /// 首轮探测整体上限（秒）：注册不能被挂死的 provider 端点无限阻塞
    #[serde(default = "default_startup_deadline")]
    pub startup_deadline_sec: u64,
    /// 单个探针的超时（秒）
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_sec: u64,
    /// 周期性网络探针的间隔（秒）；0 表示关闭周期层
    #[serde(default = "default_network_refresh_interval")]
    pub network_refresh_interval_sec: u64,
    /// 元数据服务基址覆盖，仅用于测试替身服务；
    /// 未设置时回退到 GCE_METADATA_URL 环境变量，再回退到众知地址
    #[serde(default)]
    pub metadata_base_url: Option<String>,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            allowlist: Vec::new(),
            denylist: Vec::new(),
            startup_deadline_sec: default_startup_deadline(),
            probe_timeout_sec: default_probe_timeout(),
            network_refresh_interval_sec: default_network_refresh_interval(),
            metadata_base_url: None,
        }
    }
}

// --- Default value functions ---

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_startup_deadline() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_network_refresh_interval() -> u64 {
    60
}
