use anyhow::Result;
use muster_agent::fingerprint::{NodeMerger, Registry, Runner};
use muster_core::config::MusterConfig;
use muster_core::node::Node;
use muster_core::shutdown::GracefulShutdown;
use muster_core::telemetry::init_tracing_with;
use muster_core::types::NodeId;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 统一配置加载（文件 + 环境变量覆盖）
    let cfg = MusterConfig::load_config(None)?;

    // 初始化遥测
    init_tracing_with(&cfg.telemetry);

    info!("Starting Muster agent...");
    info!("  Log level: {}", cfg.telemetry.log_level);
    info!(
        "  Startup deadline: {}s, probe timeout: {}s",
        cfg.fingerprint.startup_deadline_sec, cfg.fingerprint.probe_timeout_sec
    );

    // 生成唯一的 Node ID
    let node_id = NodeId::generate();
    info!("Generated Node ID: {}", node_id);

    let merger = NodeMerger::new(Node::new(node_id));

    // 注册表构建失败属于致命配置错误，在任何探测开始之前退出
    let registry = Registry::build(&cfg.fingerprint)?;
    info!("Fingerprint registry built with {} probes", registry.len());

    let shutdown = GracefulShutdown::new();
    let mut runner = Runner::new(
        registry,
        cfg.fingerprint.clone(),
        merger.clone(),
        shutdown.child_token(),
    );

    // 首轮探测：整轮受启动截止时间约束
    let report = runner.run_initial_pass().await?;
    info!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "Initial fingerprint pass complete"
    );

    // 注册客户端在本仓库范围之外：把就绪的节点记录按约定形状输出
    let node = merger.snapshot().await;
    info!(node = %serde_json::to_string(&node)?, "Node record ready for registration");

    // 周期层：被重新分配的网络地址等事实自行修正
    runner.spawn_periodic();

    shutdown.wait_for_signal().await;
    runner.shutdown().await;

    info!("Muster agent stopped");
    Ok(())
}
