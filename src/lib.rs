pub mod cli;
pub mod engine;
pub mod entity;
pub mod error;
pub mod store;

pub use error::{Result, StashError};
pub use store::SqliteStore;
