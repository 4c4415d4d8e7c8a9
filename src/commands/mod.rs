pub mod charts;
pub mod config;
pub mod export;
pub mod orders;
pub mod ui;
