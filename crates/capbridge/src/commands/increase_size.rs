use capbridge_autoscalr::CapacityBridge;
use capbridge_cloud::NodeGroup;
use colored::Colorize;

pub async fn handle(bridge: &CapacityBridge, delta: i64) -> anyhow::Result<()> {
    bridge.increase_size(delta).await?;

    let size = bridge.target_size().await?;
    println!(
        "{} {} のターゲット: {} ノード (max: {})",
        "✓".green(),
        bridge.id().cyan(),
        size,
        bridge.max_size()
    );
    Ok(())
}
