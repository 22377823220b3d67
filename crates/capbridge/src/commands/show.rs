use capbridge_autoscalr::{CapacityBridge, Lookup};
use colored::Colorize;

pub async fn handle(bridge: &CapacityBridge) -> anyhow::Result<()> {
    match bridge.lookup().await {
        Lookup::Present(definition) => {
            println!("{}", serde_json::to_string_pretty(&definition)?);
            Ok(())
        }
        Lookup::Absent => {
            eprintln!("{}", "アプリ定義はありません".yellow());
            Ok(())
        }
        Lookup::ReadFailed(e) => Err(e.into()),
    }
}
