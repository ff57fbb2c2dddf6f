//! CLI Status Command
//!
//! Asks a running server for its health report.

use std::time::Duration;

use anyhow::Result;

pub async fn run(port: u16) -> Result<()> {
    println!("Charmline status: checking port {port}...");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    match client
        .get(format!("http://127.0.0.1:{port}/api/health"))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Ok(resp) => {
            println!("Charmline answered with HTTP {}", resp.status());
        }
        Err(_) => {
            println!("Charmline is not running on port {port}");
        }
    }

    Ok(())
}
