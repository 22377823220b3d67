use capbridge_autoscalr::CapacityBridge;
use capbridge_cloud::NodeGroup;
use colored::Colorize;

/// stdout には true / false だけを出す
pub async fn handle(bridge: &CapacityBridge) -> anyhow::Result<()> {
    // 読み取りエラーも「存在しない」として報告される
    let exists = bridge.exist().await;
    if exists {
        eprintln!("{} {}", "✓".green(), bridge.id().cyan());
    } else {
        eprintln!("{} {}", "✗".yellow(), bridge.id().cyan());
    }
    println!("{}", exists);
    Ok(())
}
