pub mod base;
pub mod catalog;
pub mod configs;
pub mod openai;
pub mod utils;

#[cfg(test)]
pub mod mock;
