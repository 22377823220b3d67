use capbridge_autoscalr::CapacityBridge;
use capbridge_cloud::NodeGroup;
use colored::Colorize;

pub async fn handle(bridge: &CapacityBridge) -> anyhow::Result<()> {
    println!("{} を削除中...", bridge.id().cyan());

    bridge.delete().await?;

    println!("{}", "✓ アプリ定義を削除しました".green());
    Ok(())
}
