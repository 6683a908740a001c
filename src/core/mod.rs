// src/core/mod.rs

pub mod config_loader;
pub mod errors;
pub mod generator;
pub mod interpolator;
pub mod options;
pub mod orchestrator;
pub mod processors;
pub mod runner;
