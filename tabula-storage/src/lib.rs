//! TABULA Storage - Store Contract and Mock Implementation
//!
//! Defines the async store abstraction screens and forms load from and save
//! to. Real backends live with the application; `MockStore` keeps everything
//! in memory.

pub mod mock;
pub mod store;

pub use mock::{MockStore, StoreOp};
pub use store::{page_count, page_offset, EntityStore};
