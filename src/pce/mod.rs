pub mod client;
pub mod error;
pub mod source;
pub mod types;

pub use client::PceClient;
pub use source::{FileSource, WorkloadSource};
pub use types::Inventory;
