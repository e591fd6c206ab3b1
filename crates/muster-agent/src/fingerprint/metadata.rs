//! 元数据服务客户端
//!
//! 对 provider 元数据服务发起短超时的 GET 请求，并把结果分为三类：
//! 拿到 body、路径不存在（404）、服务整体不可达。不可达折叠为
//! "不适用"交给调用方，绝不作为硬错误上抛——启动路径上挂死一台
//! 非云主机是不可接受的。

use muster_core::config::FingerprintConfig;
use muster_core::error::{CoreError, Result};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// GCE 元数据服务的众知地址
pub const DEFAULT_BASE_URL: &str = "http://169.254.169.254/computeMetadata/v1/instance/";

/// 基址覆盖环境变量，最外层的测试替身适配器
pub const BASE_URL_ENV: &str = "GCE_METADATA_URL";

/// 元数据服务要求的身份标识头，防止请求被普通代理意外转发
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
const METADATA_FLAVOR_VALUE: &str = "Google";

/// 单请求超时：此路径在 Agent 启动期运行
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// 一次元数据请求的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    /// HTTP 200，body 原样返回（去掉尾部换行）；JSON 由调用方解析
    Body(String),
    /// HTTP 404：该属性在这台实例上不存在（如未分配外网 IP）
    Absent,
    /// 连接拒绝 / 超时 / DNS 失败：服务整体不可达
    Unreachable,
}

#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataClient {
    /// 构造客户端；基址优先级：显式配置 > 环境变量 > 众知地址
    pub fn new(cfg: &FingerprintConfig) -> Result<Self> {
        let base_url = cfg
            .metadata_base_url
            .clone()
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CoreError::internal(format!("failed to build http client: {e}")))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 对基址下的相对路径发起 GET 并分类结果
    ///
    /// 200/404 之外的状态码说明服务可达但行为异常，作为错误上抛，
    /// 让运维看得见；网络层失败只降级为 `Unreachable`。
    pub async fn get(&self, path: &str) -> Result<MetadataValue> {
        let url = format!("{}{}", self.base_url, path);

        let response = match self
            .http
            .get(&url)
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "metadata service unreachable");
                return Ok(MetadataValue::Unreachable);
            }
        };

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| CoreError::metadata_error(path, e.to_string()))?;
                Ok(MetadataValue::Body(body.trim().to_string()))
            }
            StatusCode::NOT_FOUND => Ok(MetadataValue::Absent),
            status => Err(CoreError::metadata_error(
                path,
                format!("unexpected status {status}"),
            )),
        }
    }
}
