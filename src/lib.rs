pub mod config;
pub mod engine;
pub mod manager;
pub mod model;
pub mod notify;
pub mod query;
pub mod reloader;
pub mod ruledoc;
pub mod store;
