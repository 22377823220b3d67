use capbridge_autoscalr::CapacityBridge;
use capbridge_cloud::NodeGroup;

pub async fn handle(bridge: &CapacityBridge) -> anyhow::Result<()> {
    let size = bridge.target_size().await?;
    println!("{}", size);
    Ok(())
}
