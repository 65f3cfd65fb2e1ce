pub mod event_repo;
pub mod history_repo;
pub mod ledger;
pub mod member_repo;
pub mod models;
