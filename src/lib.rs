pub mod app;
pub mod config;
pub mod context;
pub mod cookies;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod tenant;
