#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
pub mod aggregate;
pub mod config;
pub mod error;
pub mod join;
pub mod overlap;
pub mod pipeline;
pub mod progress;
pub mod stats;
pub mod types;

#[path = "../shared/files.rs"]
pub mod files;
