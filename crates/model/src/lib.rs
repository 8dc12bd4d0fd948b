pub mod core;
pub mod errors;
pub mod pagination;
pub mod records;
