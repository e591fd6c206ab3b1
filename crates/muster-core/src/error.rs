//! 统一错误处理系统

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 核心错误类型 - 统一的错误处理
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CoreError {
    // === 配置错误 ===
    #[error("Config error: {message}")]
    Config { message: String },

    // === 元数据服务错误 ===
    #[error("Metadata request failed: {path} - {message}")]
    Metadata { path: String, message: String },

    // === 探针错误 ===
    #[error("Probe failed: {probe} - {message}")]
    Probe { probe: String, message: String },

    // === 序列化错误 ===
    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    // === 系统错误 ===
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// 判断错误是否为启动期致命错误
    ///
    /// 只有配置错误会在探测开始前中止 Agent；单个探针的失败
    /// 永远不会升级为致命错误。
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::Config { .. })
    }

    /// 创建配置错误
    pub fn config_error(message: impl Into<String>) -> Self {
        CoreError::Config {
            message: message.into(),
        }
    }

    /// 创建元数据服务错误（带请求路径上下文）
    pub fn metadata_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// 创建探针错误（带探针名上下文）
    pub fn probe_error(probe: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Probe {
            probe: probe.into(),
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        CoreError::Internal {
            message: message.into(),
        }
    }
}

/// Core 操作的 Result 类型别名
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Internal {
            message: err.to_string(),
        }
    }
}
