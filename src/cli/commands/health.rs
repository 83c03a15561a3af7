use std::time::Duration;

use serde_json::{json, Value};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;

/// Ask a running server for `/health`; defaults to the configured public URL
pub async fn handle(url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = url.unwrap_or_else(|| config().reports.public_base_url.clone());
    let endpoint = format!("{}/health", base.trim_end_matches('/'));

    let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
    let response = client.get(&endpoint).send().await?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        anyhow::bail!("{} answered {} ({})", endpoint, status, body["data"]["database"].as_str().unwrap_or("unknown"));
    }

    output_success(
        &output_format,
        &format!("{} is healthy", base),
        Some(json!({ "health": body["data"] })),
    )
}
