pub mod adapter;
pub mod convert;
mod error;

pub use adapter::{DynamoDbConfig, DynamoDbStore};
