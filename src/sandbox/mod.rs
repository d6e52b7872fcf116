//! Sandbox module containing the allow-list, path and formula guards.

pub mod config;
pub mod formula;
pub mod guard;
pub mod limits;
pub mod path;
pub mod roots;
