pub mod classify;
pub mod config;
pub mod console;
pub mod error;
pub mod metrics;
pub mod network;
pub mod poller;
pub mod rate;
pub mod runtime;
pub mod sink;
pub mod source;
pub mod status;
pub mod storage;
pub mod token;
