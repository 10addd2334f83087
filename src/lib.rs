//! Modstrap - installs and launches a BepInEx-bootstrapped game mod
//!
//! This crate provides:
//! - Mod manifest reading with placeholder values for missing fields
//! - Per-mod persisted game path (remembered across runs)
//! - Install (copy staging tree) / uninstall (remove marker files)
//! - Steam library detection of the game executable
//! - Direct or elevated game launch

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod config;
pub mod error;
pub mod games;
pub mod mods;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
