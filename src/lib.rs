//! Restaurant revenue dashboard client.
//!
//! Data flows one way: the [`controller`] issues requests through the
//! [`api`] gateway, [`transform`] turns responses into chart points and
//! table rows, and the [`tui`] renders them.

pub mod api;
pub mod config;
pub mod controller;
pub mod datefmt;
pub mod error;
pub mod export;
pub mod logging;
pub mod transform;
pub mod tui;
