//! # Markup Rule Repository
//!
//! Database operations for per-category markup rules.
//!
//! The `markup_rules` table keys on category, so "at most one rule per
//! category" is a schema fact, not application code. Updating a rule is
//! always an upsert.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tarifa_core::validation::validate_markup_bps;
use tarifa_core::{Category, MarkupRule};

/// Repository for markup rule operations.
#[derive(Debug, Clone)]
pub struct MarkupRuleRepository {
    pool: SqlitePool,
}

impl MarkupRuleRepository {
    /// Creates a new MarkupRuleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MarkupRuleRepository { pool }
    }

    /// Creates or replaces the rule for a category.
    pub async fn upsert(&self, category: Category, markup_bps: u32, is_active: bool) -> DbResult<MarkupRule> {
        validate_markup_bps(markup_bps).map_err(tarifa_core::CoreError::from)?;

        let rule = MarkupRule { category, markup_bps, is_active, updated_at: Utc::now() };

        sqlx::query(
            r#"
            INSERT INTO markup_rules (category, markup_bps, is_active, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(category) DO UPDATE SET
                markup_bps = excluded.markup_bps,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(rule.category)
        .bind(rule.markup_bps)
        .bind(rule.is_active)
        .bind(rule.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(category = %rule.category, markup_bps = rule.markup_bps, "Markup rule upserted");
        Ok(rule)
    }

    /// Fetches the rule for a category, if one exists.
    pub async fn get(&self, category: Category) -> DbResult<Option<MarkupRule>> {
        let rule = sqlx::query_as::<_, MarkupRule>("SELECT * FROM markup_rules WHERE category = ?1")
            .bind(category)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rule)
    }

    /// Lists all rules, active or not, ordered by category.
    pub async fn list(&self) -> DbResult<Vec<MarkupRule>> {
        let rules = sqlx::query_as::<_, MarkupRule>("SELECT * FROM markup_rules ORDER BY category")
            .fetch_all(&self.pool)
            .await?;
        Ok(rules)
    }

    /// Lists active rules only (snapshot assembly).
    pub async fn list_active(&self) -> DbResult<Vec<MarkupRule>> {
        let rules = sqlx::query_as::<_, MarkupRule>(
            "SELECT * FROM markup_rules WHERE is_active = 1 ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rules)
    }
}
