//! Request handlers, grouped by resource.

pub mod auth;
pub mod extract;
pub mod tasks;
pub mod views;
