//! Thread model, dataset loading, and the summarized thread catalog.

pub mod catalog;
pub mod crm;
pub mod loader;
pub mod model;

pub use catalog::{CatalogEntry, ThreadCatalog};
pub use crm::{CrmIndex, CrmRecord};
pub use model::{Message, SenderRole, Thread};
