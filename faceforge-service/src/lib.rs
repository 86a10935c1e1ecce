pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
