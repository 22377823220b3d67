use capbridge_autoscalr::CapacityBridge;
use capbridge_cloud::{Node, NodeGroup};
use colored::Colorize;

pub async fn handle(bridge: &CapacityBridge, provider_ids: Vec<String>) -> anyhow::Result<()> {
    let nodes: Vec<Node> = provider_ids
        .into_iter()
        .map(|id| Node::new(id.clone(), id))
        .collect();

    println!("{} ノードを削除中...", nodes.len());
    for node in &nodes {
        println!("  - {}", node.provider_id.dimmed());
    }

    bridge.delete_nodes(&nodes).await?;

    println!("{}", "✓ 削除を依頼しました".green());
    Ok(())
}
