mod app;
pub mod config;
mod effects;
mod i18n;
mod persistence;
mod ui;

pub use app::run_app;
