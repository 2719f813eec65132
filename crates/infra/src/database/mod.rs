//! Database implementations

pub mod activity_repository;
pub mod block_repository;
pub mod manager;
pub mod outbox_repository;
pub mod repository;
pub mod segment_repository;
pub mod sqlcipher_pool;

pub use activity_repository::*;
pub use block_repository::*;
pub use manager::*;
pub use outbox_repository::*;
pub use repository::*;
pub use segment_repository::*;
pub use sqlcipher_pool::*;
