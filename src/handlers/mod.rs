// src/handlers/mod.rs
pub mod entitlement;
pub mod generate;
pub mod output;
pub mod ui;
pub mod webhook;
