pub mod api;
pub mod app_error;
pub mod app_state;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod models;
pub mod params;
pub mod repositories;
pub mod routes;
pub mod schema;
pub mod services;
