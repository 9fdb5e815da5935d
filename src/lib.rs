// Shared library for the sculpture, fetch and dancer binaries
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub mod demo;

pub use error::{AssetError, DemoError};
