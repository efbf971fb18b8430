// src/models/mod.rs
pub mod generate;
pub mod profile;
