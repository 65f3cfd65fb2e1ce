pub mod airtable;
pub mod attendance;
pub mod events;
pub mod health;
pub mod members;
pub mod points;
pub mod routes;
