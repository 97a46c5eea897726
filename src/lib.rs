pub mod analytics;
pub mod app;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod reconciler;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
