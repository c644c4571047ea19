//! # energy-subgraphs
//!
//! GraphQL services for the energy platform.
//!
//! ## Features
//!
//! - **Accounts Subgraph** - Federated `User` entity, `me` and `customer` lookups
//! - **Energy API** - Bounded, cursor-paginated fuel inventory
//! - **Federation Helpers** - Entity reference resolution and subgraph SDL export
//! - **Cursor Pagination** - Relay-style connections over offset cursors
//! - **Repositories** - Keyed read-only lookups with batched loading
//!
//! ## Usage
//!
//! ```rust,no_run
//! use energy_subgraphs::accounts::{self, AccountsCatalog};
//! use energy_subgraphs::server;
//!
//! # fn main() -> energy_subgraphs::Result<()> {
//! let schema = accounts::build_schema(AccountsCatalog::seeded()?, true);
//! let app = server::router(schema);
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod auth;
pub mod config;
pub mod federation;
pub mod inventory;
pub mod pagination;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;
pub mod server;
pub mod telemetry;
pub mod types;

pub use accounts::{AccountsCatalog, AccountsQuery, AccountsSchema};
pub use auth::{extract_principal, get_principal, graphql_handler, Principal};
pub use config::{LogFormat, ServerConfig};
pub use federation::{subgraph_sdl, EntityResolver, UserReference, UserReferenceResolver};
pub use inventory::{EnergySchema, FuelInventory, InMemoryInventory, InventoryQuery, InventoryStore};
pub use pagination::{Connection, CursorCodec, Edge, PageInfo, PageWindow, PaginationInput};
#[cfg(feature = "postgres")]
pub use postgres::PostgresInventory;
pub use repository::{InMemoryRepository, Keyed, Repository, RepositoryLoader};
pub use types::{Customer, CustomerStatus, User};

use thiserror::Error;

/// Service errors
///
/// Lookups that find nothing are not errors; these cover bad input, bad
/// configuration and failing infrastructure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubgraphError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Pagination error: {0}")]
    Pagination(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Startup error: {0}")]
    Startup(String),
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, SubgraphError>;
