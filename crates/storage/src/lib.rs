#![forbid(unsafe_code)]

pub mod memory;
pub mod repository;
pub mod seed;

pub use memory::InMemoryRepository;
pub use repository::{Storage, StorageError};
