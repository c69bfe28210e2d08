pub mod config;
pub mod http;
pub mod model;
pub mod service;
pub mod sqlite;
pub mod store;
