//! # Repository Module
//!
//! Database repository implementations for Tarifa.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                       │
//! │       │                                                             │
//! │       │  db.markup_rules().upsert(rule)                             │
//! │       ▼                                                             │
//! │  MarkupRuleRepository                                               │
//! │       │  SQL                                                        │
//! │       ▼                                                             │
//! │  SQLite                                                             │
//! │                                                                     │
//! │  SQL stays in one place; handlers never see a query string.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`item::ItemRepository`] - catalog items
//! - [`rules::MarkupRuleRepository`] - per-category markup rules
//! - [`price_list::PriceListRepository`] - lists and their overrides
//! - [`customer_group::CustomerGroupRepository`] - groups and rosters
//! - [`lot::LotRepository`] - repricing lot records

pub mod customer_group;
pub mod item;
pub mod lot;
pub mod price_list;
pub mod rules;
