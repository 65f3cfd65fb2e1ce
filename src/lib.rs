pub mod airtable;
pub mod cache;
pub mod config;
pub mod db;
pub mod engine;
pub mod http;
pub mod metrics;
pub mod sync;
