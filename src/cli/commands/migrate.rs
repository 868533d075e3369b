use serde_json::json;

use crate::cli::{connect, OutputFormat};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let manager = connect().await?;
    let result = manager.migrate().await;
    manager.close().await;
    result?;

    output_format.emit(&json!({ "migrated": true }), || "Migrations applied".to_string())
}
