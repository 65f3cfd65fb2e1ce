//! Runtime configuration for the club points server.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug)]
pub struct Settings {
    /// Airtable base holding the attendance poll table.
    pub airtable_base_id: String,
    pub airtable_api_key: String,
    pub airtable_table: String,
    /// Seconds between background poll re-syncs of draft events.
    pub sync_interval: u64,
    /// Redis TTL (seconds) for the cached leaderboard response.
    pub leaderboard_ttl: u64,
}

impl Settings {
    fn from_env() -> Self {
        let airtable_base_id = env::var("AIRTABLE_BASE_ID").unwrap_or_default();
        let airtable_api_key = env::var("AIRTABLE_API_KEY").unwrap_or_default();
        let airtable_table =
            env::var("AIRTABLE_TABLE_NAME").unwrap_or_else(|_| "Attendance".into());

        let sync_interval = env::var("POLL_SYNC_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let leaderboard_ttl = env::var("LEADERBOARD_TTL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Settings {
            airtable_base_id,
            airtable_api_key,
            airtable_table,
            sync_interval,
            leaderboard_ttl,
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
