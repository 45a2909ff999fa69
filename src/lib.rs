// Re-export all public modules so they can be used from main.rs
pub mod assets;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;
