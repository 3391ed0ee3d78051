//! Persistence layer: flat record storage for approvals.

pub mod json_file;
pub mod memory;
pub mod traits;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::ApprovalStore;
