pub mod analyzers;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod model;
pub mod output;
pub mod service;
pub mod source;
