use capbridge_autoscalr::CapacityBridge;
use capbridge_cloud::NodeGroup;
use colored::Colorize;

pub async fn handle(bridge: &CapacityBridge) -> anyhow::Result<()> {
    let definition = bridge.definition_from_config()?;
    println!(
        "{} を作成中... (target: {} vCPUs)",
        definition.group_id.cyan(),
        definition.target_capacity
    );

    bridge.create().await?;

    println!("{}", "✓ アプリ定義を作成しました".green());
    Ok(())
}
