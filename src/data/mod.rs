//! Data acquisition and cleaning.
//!
//! - local-era date conversion (`roc_date`)
//! - object-store access (`storage`)
//! - CSV parsing, cleaning and the memoized dataset service (`loader`)

pub mod loader;
pub mod roc_date;
pub mod storage;

pub use loader::{DatasetService, LoadedDataset, parse_transactions};
pub use storage::{MemoryStore, ObjectStore, SupabaseStorage};
