pub mod dynamodb;
pub mod error;
pub mod memory;
pub mod requests;
pub mod store;
