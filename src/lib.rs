pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod logging;
pub mod logview;
pub mod mailer;
pub mod middleware;
pub mod reports;
pub mod services;
pub mod state;

#[cfg(test)]
pub mod testing;
