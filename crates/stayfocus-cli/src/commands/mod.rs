pub mod config;
pub mod stats;
pub mod study;
pub mod timer;
