//! HTTP route handlers.

pub mod alerts;
pub mod cities;
pub mod dashboard;
pub mod entries;
pub mod forecast;
pub mod health;
pub mod settings;
