pub mod config;
pub mod consumers;
pub mod database;
pub mod entity;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod state;
pub mod store;
pub mod utils;
