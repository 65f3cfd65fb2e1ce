//! Poll-import integration: fetch attendance polls from Airtable and turn
//! them into draft events.

pub mod client;
pub mod detect;
pub mod import;
pub mod mapping;
