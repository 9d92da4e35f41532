pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod recommend;
pub mod seed;
pub mod services;
pub mod validation;

pub use app::{app, AppState};
