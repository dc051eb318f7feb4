// src/system/mod.rs

pub mod executor;
