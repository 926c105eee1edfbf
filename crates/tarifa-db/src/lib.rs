//! # tarifa-db: Storage Layer for Tarifa
//!
//! This crate provides database access for the pricing engine. It uses
//! SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tarifa Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (PUT /api/markup-rules, POST /api/lots/{id}/apply, ...)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tarifa-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌──────────────┐     │   │
//! │  │   │   Database    │   │  Repositories │   │  Migrations  │     │   │
//! │  │   │   (pool.rs)   │   │ (item, rules, │   │  (embedded)  │     │   │
//! │  │   │               │   │  lists, ...)  │   │              │     │   │
//! │  │   └───────┬───────┘   └───────┬───────┘   └──────────────┘     │   │
//! │  │           │                   │                                 │   │
//! │  │   ┌───────▼───────┐   ┌───────▼────────┐                       │   │
//! │  │   │ PricingStore  │   │ RepricingEngine│                       │   │
//! │  │   │ (snapshot.rs) │   │  (engine.rs)   │                       │   │
//! │  │   │ resolve +     │   │ simulate/apply │                       │   │
//! │  │   │ dashboard     │   │ /revert        │                       │   │
//! │  │   └───────────────┘   └────────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys on)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`repository`] - Repository implementations
//! - [`snapshot`] - Pricing snapshot assembly and resolution facade
//! - [`engine`] - Repricing lot engine (simulate / apply / revert)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tarifa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tarifa.db")).await?;
//!
//! db.markup_rules().upsert(Category::Frenos, 4000, true).await?;
//! let resolved = db.pricing().resolve_item(&item_id, None, Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::{RepricingEngine, SimulationLine, SimulationReport};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use snapshot::PricingStore;

// Repository re-exports for convenience
pub use repository::customer_group::CustomerGroupRepository;
pub use repository::item::{ItemRepository, NewItem};
pub use repository::lot::{LotRepository, LotSnapshot, NewLot};
pub use repository::price_list::{NewPriceList, PriceListRepository};
pub use repository::rules::MarkupRuleRepository;
