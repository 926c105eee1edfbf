//! # tarifa-core: Pure Pricing Logic
//!
//! This crate is the **heart** of the Tarifa pricing layer. It contains all
//! pricing business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tarifa Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Admin UI (external)                          │   │
//! │  │    Rules screen ──► Lists ──► Groups ──► Repricing wizard       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/admin-api (axum)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tarifa-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │ resolver  │  │    lot    │   │   │
//! │  │   │   Item    │  │   Money   │  │ resolve() │  │ LotState  │   │   │
//! │  │   │ PriceList │  │  bps math │  │ Snapshot  │  │ Adjustment│   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tarifa-db (Storage Layer)                    │   │
//! │  │         SQLite repositories, repricing engine, migrations       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, MarkupRule, PriceList, CustomerGroup)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`resolver`] - The price resolution function and its snapshot input
//! - [`lot`] - Repricing lot state machine and adjustment math
//! - [`dashboard`] - Margin statistics over resolved prices
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: resolution is a function of (item, snapshot, time)
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Basis Points**: all percentages are integer bps, so math is exact
//! 5. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dashboard;
pub mod error;
pub mod lot;
pub mod money;
pub mod resolver;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dashboard::{DashboardStats, MarginBucket, MarginDistribution, PricedItem, compute_margin_stats};
pub use error::{CoreError, CoreResult, ValidationError};
pub use lot::{Adjustment, AdjustmentType, LotState, RepricingLot};
pub use money::Money;
pub use resolver::{GroupRoster, PriceList, PriceSource, PricingSnapshot, ResolvedPrice, resolve};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum category markup in basis points (500%).
///
/// ## Business Reason
/// Rules above this are almost certainly data-entry mistakes
/// (e.g. typing 4000 where 40.00 was meant).
pub const MAX_MARKUP_BPS: u32 = 50_000;

/// Maximum customer-group discount in basis points (100%).
pub const MAX_DISCOUNT_BPS: u32 = 10_000;

/// Maximum length of a repricing lot label.
pub const MAX_LABEL_LEN: usize = 120;
