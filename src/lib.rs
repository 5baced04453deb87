pub mod aggregate;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod relations;
pub mod services;
pub mod storage;

#[cfg(test)]
pub mod testing;
