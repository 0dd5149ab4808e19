//! Convenient imports for typical `lectern` usage.
//!
//! ```ignore
//! use lectern::prelude::*;
//! ```

pub use crate::{
    BookPatch, CatalogError, CatalogLookup, CatalogResult, ConditionalUpdate, EntityKind,
    Executor, Mode, Page, PageRequest, PgCatalog, ReadPatch, StoreClient, UpdateOutcome,
    UserPatch, ValidationEngine, ValidationRequest, Violation, Violations,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_with_config};
