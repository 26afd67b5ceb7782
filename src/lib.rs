#![doc = "The `tasklist` library crate."]
#![doc = ""]
#![doc = "Domain models, the SQLite stores, bearer-token authentication, the task-list"]
#![doc = "cache and the HTTP routes of the task-list service. The binary (`main.rs`)"]
#![doc = "loads the configuration, builds an `AppState` and serves `routes::config`."]

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use error::AppError;
pub use state::AppState;
