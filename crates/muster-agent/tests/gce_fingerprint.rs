//! GCE 探针端到端测试
//!
//! 用一个本地 HTTP 替身服务复刻真实元数据服务的契约：固定的相对
//! 路径、任意 content-type、未映射路径 404、必须携带 Metadata-Flavor
//! 请求头。

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use muster_agent::fingerprint::gce::GceProbe;
use muster_agent::fingerprint::{NodeMerger, Probe};
use muster_core::config::FingerprintConfig;
use muster_core::node::Node;
use muster_core::types::NodeId;
use serde::Deserialize;
use std::sync::Arc;

/// 路由替身：URI + content type + body
#[derive(Clone, Deserialize)]
struct Endpoint {
    uri: String,
    #[serde(rename = "content-type")]
    content_type: String,
    body: String,
}

#[derive(Clone, Deserialize)]
struct Routes {
    endpoints: Vec<Endpoint>,
}

const GCE_ROUTES: &str = r#"
{
  "endpoints": [
    {
      "uri": "/computeMetadata/v1/instance/id",
      "content-type": "text/plain",
      "body": "12345"
    },
    {
      "uri": "/computeMetadata/v1/instance/hostname",
      "content-type": "text/plain",
      "body": "instance-1.c.project.internal"
    },
    {
      "uri": "/computeMetadata/v1/instance/zone",
      "content-type": "text/plain",
      "body": "projects/555555/zones/us-central1-f"
    },
    {
      "uri": "/computeMetadata/v1/instance/machine-type",
      "content-type": "text/plain",
      "body": "projects/555555/machineTypes/n1-standard-1"
    },
    {
      "uri": "/computeMetadata/v1/instance/network-interfaces/0/ip",
      "content-type": "text/plain",
      "body": "10.240.0.5"
    },
    {
      "uri": "/computeMetadata/v1/instance/tags",
      "content-type": "application/json",
      "body": "[\"abc\", \"def\"]"
    },
    {
      "uri": "/computeMetadata/v1/instance/attributes/?recursive=true",
      "content-type": "application/json",
      "body": "{\"ghi\":\"111\",\"jkl\":\"222\"}"
    }
  ]
}
"#;

const EXTERNAL_IP_URI: &str =
    "/computeMetadata/v1/instance/network-interfaces/0/access-configs/0/external-ip";

async fn serve_fixture(
    State(routes): State<Arc<Routes>>,
    req: Request<Body>,
) -> Response<Body> {
    // 真实元数据服务拒绝不带身份头的请求
    let flavor = req
        .headers()
        .get("Metadata-Flavor")
        .and_then(|v| v.to_str().ok());
    if flavor != Some("Google") {
        return Response::builder()
            .status(StatusCode::FORBIDDEN)
            .body(Body::from("missing Metadata-Flavor header"))
            .unwrap();
    }

    let path_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    for endpoint in &routes.endpoints {
        if endpoint.uri == path_query {
            // 与真实服务一致：body 以换行结尾
            return Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", endpoint.content_type.clone())
                .body(Body::from(format!("{}\n", endpoint.body)))
                .unwrap();
        }
    }

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::empty())
        .unwrap()
}

/// 启动替身服务，返回元数据基址
async fn start_fixture_server(routes: Routes) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .fallback(serve_fixture)
        .with_state(Arc::new(routes));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/computeMetadata/v1/instance/")
}

fn fixture_routes(with_external_ip: bool) -> Routes {
    let mut routes: Routes = serde_json::from_str(GCE_ROUTES).unwrap();
    if with_external_ip {
        routes.endpoints.push(Endpoint {
            uri: EXTERNAL_IP_URI.to_string(),
            content_type: "text/plain".to_string(),
            body: "104.44.55.66".to_string(),
        });
    }
    routes
}

fn config_for(base_url: String) -> FingerprintConfig {
    FingerprintConfig {
        metadata_base_url: Some(base_url),
        ..Default::default()
    }
}

fn fresh_merger() -> NodeMerger {
    NodeMerger::new(Node::new(NodeId::new("test-node")))
}

async fn run_gce_fixture(with_external_ip: bool) -> Node {
    let base_url = start_fixture_server(fixture_routes(with_external_ip)).await;
    let merger = fresh_merger();

    let applied = GceProbe
        .fingerprint(&config_for(base_url), &merger)
        .await
        .unwrap();
    assert!(applied, "probe should apply against the fixture server");

    let node = merger.snapshot().await;

    // 文档化的键逐个核对，值必须与替身数据逐字一致
    let mut expected = vec![
        ("platform.gce.id", "12345"),
        ("platform.gce.hostname", "instance-1.c.project.internal"),
        ("platform.gce.zone", "us-central1-f"),
        ("platform.gce.machine-type", "n1-standard-1"),
        ("platform.gce.tag.abc", "true"),
        ("platform.gce.tag.def", "true"),
        ("platform.gce.attr.ghi", "111"),
        ("platform.gce.attr.jkl", "222"),
        ("network.ip-address", "10.240.0.5"),
    ];
    if with_external_ip {
        expected.push(("platform.gce.external-ip", "104.44.55.66"));
    }

    for (key, value) in &expected {
        assert_eq!(
            node.attributes.get(*key),
            Some(&value.to_string()),
            "attribute {key}"
        );
    }
    // 不得出现多余键
    assert_eq!(node.attributes.len(), expected.len());

    assert_eq!(node.links.get("gce"), Some(&"12345".to_string()));
    assert_eq!(node.links.len(), 1);

    assert_eq!(node.resources.networks.len(), 1);
    let net = &node.resources.networks[0];
    assert!(!net.device.is_empty());
    assert_eq!(net.ip, "10.240.0.5");
    assert_eq!(net.cidr, "10.240.0.5/32");

    node
}

#[tokio::test]
async fn test_gce_with_external_ip() {
    let node = run_gce_fixture(true).await;
    assert!(node.attributes.contains_key("platform.gce.external-ip"));
}

#[tokio::test]
async fn test_gce_without_external_ip() {
    let node = run_gce_fixture(false).await;
    // 可选子资源 404：键整个不存在，而不是空串
    assert!(!node.attributes.contains_key("platform.gce.external-ip"));
}

#[tokio::test]
async fn test_non_gce_host_is_not_applicable() {
    // 保留端口 1 上没有监听者：连接被拒绝，等同于裸金属主机
    let merger = fresh_merger();
    let cfg = config_for("http://127.0.0.1:1/computeMetadata/v1/instance/".to_string());

    let applied = GceProbe.fingerprint(&cfg, &merger).await.unwrap();
    assert!(!applied);

    // Node 不得有任何改动
    let node = merger.snapshot().await;
    assert!(node.attributes.is_empty());
    assert!(node.links.is_empty());
    assert!(node.resources.networks.is_empty());
}

#[tokio::test]
async fn test_malformed_tags_commit_partial_and_report_error() {
    let mut routes = fixture_routes(false);
    for endpoint in &mut routes.endpoints {
        if endpoint.uri.ends_with("/tags") {
            endpoint.body = "definitely-not-json".to_string();
        }
    }
    let base_url = start_fixture_server(routes).await;
    let merger = fresh_merger();

    let result = GceProbe.fingerprint(&config_for(base_url), &merger).await;
    assert!(result.is_err(), "malformed tags body must surface an error");

    // 已取到的字段照常提交，不随解析失败回滚
    let node = merger.snapshot().await;
    assert_eq!(
        node.attributes.get("platform.gce.id"),
        Some(&"12345".to_string())
    );
    assert_eq!(
        node.attributes.get("platform.gce.zone"),
        Some(&"us-central1-f".to_string())
    );
    assert_eq!(node.links.get("gce"), Some(&"12345".to_string()));
    // tags 一个都不该出现
    assert!(
        !node
            .attributes
            .keys()
            .any(|k| k.starts_with("platform.gce.tag."))
    );
}

#[tokio::test]
async fn test_fixture_server_rejects_missing_flavor_header() {
    let base_url = start_fixture_server(fixture_routes(false)).await;
    let response = reqwest::Client::new()
        .get(format!("{base_url}id"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
}
