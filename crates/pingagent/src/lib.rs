pub mod agent;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod logging;
pub mod models;
pub mod persona;
pub mod providers;
pub mod tools;
