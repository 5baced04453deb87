use anyhow::Context;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

pub async fn handle(url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let health_url = format!("{}/health", url.trim_end_matches('/'));
    let started = Instant::now();
    let response = client
        .get(&health_url)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", health_url))?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        let mut data = body.get("data").cloned().unwrap_or(Value::Null);
        if let Some(obj) = data.as_object_mut() {
            obj.insert("elapsed_ms".into(), elapsed_ms.into());
        }
        output_success(&output_format, &format!("{} is healthy ({} ms)", url, elapsed_ms), Some(data))
    } else {
        output_error(
            &output_format,
            &format!("{} responded {}", url, status),
            body.get("message").and_then(Value::as_str),
        )?;
        anyhow::bail!("server unhealthy")
    }
}
