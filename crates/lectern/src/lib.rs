//! # lectern
//!
//! The data layer behind a small library catalog (users, books, reads):
//! patch-aware validation plus dynamic query construction over PostgreSQL.
//!
//! ## Features
//!
//! - **Patch-aware validation**: per-entity ordered rule tables with create
//!   vs. patch semantics; uniqueness and existence checks run against the
//!   store through an injected lookup capability
//! - **Complete reporting**: every applicable rule runs and the violation
//!   list comes back whole, in declaration order — never fail-fast
//! - **Dynamic queries**: partial `UPDATE .. RETURNING *` statements built
//!   from candidate pairs, and offset/limit pagination appended after any
//!   existing placeholders
//! - **Scoped execution**: one connection per statement, released on every
//!   exit path, with a per-call deadline
//!
//! ```ignore
//! use lectern::{Executor, Mode, PgCatalog, ValidationEngine};
//!
//! let exec = Executor::new(&database_url)?;
//! let engine = ValidationEngine::new(PgCatalog::new(&exec));
//!
//! let violations = engine.validate_book(&fields, None, Mode::Create).await?;
//! if violations.is_empty() {
//!     // proceed to persistence
//! } else {
//!     // surface the {field, message} list as a 400-style response
//! }
//! ```

pub mod catalog;
pub mod client;
pub mod entities;
pub mod error;
pub mod executor;
pub mod paging;
pub mod prelude;
pub mod update;
pub mod validate;

pub use catalog::{CatalogLookup, PgCatalog};
pub use client::StoreClient;
pub use entities::{BookPatch, ReadPatch, UserPatch};
pub use error::{CatalogError, CatalogResult};
pub use executor::{DEFAULT_TIMEOUT, Executor};
pub use paging::{DEFAULT_LIMIT, Page, PageRequest, paged_statement};
pub use update::{ConditionalUpdate, UpdateOutcome};
pub use validate::{
    EntityKind, Mode, ValidationEngine, ValidationRequest, Violation, Violations,
};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
