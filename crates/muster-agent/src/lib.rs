pub mod fingerprint;

// 重新导出错误类型
pub use muster_core::error::{CoreError, Result};
