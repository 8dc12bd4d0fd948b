pub mod config;
pub mod error;
pub mod metrics;
pub mod reader;
pub mod report;
pub mod retry;
pub mod runner;

#[cfg(test)]
mod tests;
