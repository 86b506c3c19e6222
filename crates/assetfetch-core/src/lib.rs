pub mod config;
pub mod logging;

pub mod batch;
pub mod catalog;
pub mod control;
pub mod fetcher;
pub mod http;
pub mod media;
pub mod placeholder;
pub mod resolver;
pub mod retry;
pub mod storage;
