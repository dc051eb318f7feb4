// src/core/mod.rs

pub mod action;
pub mod errors;
pub mod exit_code;
pub(crate) mod grammar;
pub mod parameters;
pub mod parser;
