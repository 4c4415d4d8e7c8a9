pub mod panels;

pub use app::{run_tui, App};

mod app;
mod db;
mod search;
mod state;
