// src/cli/mod.rs

pub mod console;
pub mod handlers;
