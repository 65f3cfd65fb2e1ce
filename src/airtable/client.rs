//! Thin Airtable REST client: fetch every row of the attendance poll table.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

use crate::config;

static HTTP: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .build()
        .expect("http client")
});

#[derive(Debug, Clone, Deserialize)]
pub struct AirtableRecord {
    pub id: String,
    #[serde(rename = "createdTime")]
    pub created_time: String,
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AirtablePage {
    records: Vec<AirtableRecord>,
    offset: Option<String>,
}

async fn fetch_page(offset: Option<&str>) -> Result<AirtablePage> {
    let s = config::settings();
    let url = format!(
        "https://api.airtable.com/v0/{}/{}",
        s.airtable_base_id, s.airtable_table
    );

    let mut req = HTTP
        .get(&url)
        .bearer_auth(&s.airtable_api_key);
    if let Some(offset) = offset {
        req = req.query(&[("offset", offset)]);
    }

    let resp = req.send().await.context("airtable request failed")?;
    let resp = resp
        .error_for_status()
        .context("airtable returned an error status")?;
    resp.json::<AirtablePage>()
        .await
        .context("decoding airtable response")
}

/// Fetch the whole table, following pagination offsets. Transient failures
/// are retried a couple of times before giving up.
pub async fn fetch_all_records() -> Result<Vec<AirtableRecord>> {
    let strategy = FixedInterval::from_millis(500).take(2);

    let mut records = Vec::new();
    let mut offset: Option<String> = None;
    loop {
        let page = Retry::spawn(strategy.clone(), || fetch_page(offset.as_deref())).await?;
        records.extend(page.records);
        match page.offset {
            Some(next) => offset = Some(next),
            None => break,
        }
    }
    Ok(records)
}
