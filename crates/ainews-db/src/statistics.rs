use sqlx::PgPool;

use crate::DbError;

/// Store-wide aggregates.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Statistics {
    pub total_articles: i64,
    pub total_deals: i64,
    /// Distinct company names across deals, compared case-insensitively.
    pub total_companies: i64,
    /// Distinct investor names across deals, compared case-insensitively.
    pub total_investors: i64,
    /// Sum of every non-null deal amount in whole units, whatever its
    /// currency. No FX conversion is applied; see [`funding_by_currency`]
    /// for the split. Saturates at `i64::MAX`.
    pub total_funding_usd: i64,
    /// Mean relevance over all articles; `0.0` for an empty store.
    pub avg_relevance_score: f64,
    pub total_categories: i64,
}

/// Compute [`Statistics`] in a single statement, so every figure comes from
/// the same snapshot.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn statistics(pool: &PgPool) -> Result<Statistics, DbError> {
    let stats = sqlx::query_as::<_, Statistics>(
        "SELECT \
             (SELECT COUNT(*) FROM articles) AS total_articles, \
             (SELECT COUNT(*) FROM deals) AS total_deals, \
             (SELECT COUNT(DISTINCT lower(company_name)) FROM deals \
               WHERE company_name IS NOT NULL) AS total_companies, \
             (SELECT COUNT(DISTINCT lower(inv.name)) \
               FROM deals d CROSS JOIN LATERAL unnest(d.investors) AS inv(name)) \
               AS total_investors, \
             (SELECT LEAST(COALESCE(SUM(funding_amount::NUMERIC), 0), \
                           9223372036854775807)::BIGINT FROM deals \
               WHERE funding_amount IS NOT NULL) AS total_funding_usd, \
             (SELECT COALESCE(AVG(relevance_score), 0)::FLOAT8 FROM articles) \
               AS avg_relevance_score, \
             (SELECT COUNT(*) FROM categories) AS total_categories",
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Funded deals and their summed amount for one currency.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CurrencyTotalRow {
    pub currency: String,
    pub deals: i64,
    /// Whole units of `currency`. Saturates at `i64::MAX`.
    pub total_amount: i64,
}

/// Deal funding split by currency, largest total first. Amountless deals
/// are left out.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn funding_by_currency(pool: &PgPool) -> Result<Vec<CurrencyTotalRow>, DbError> {
    let rows = sqlx::query_as::<_, CurrencyTotalRow>(
        "SELECT funding_currency AS currency, \
                COUNT(*) AS deals, \
                LEAST(SUM(funding_amount::NUMERIC), 9223372036854775807)::BIGINT \
                  AS total_amount \
         FROM deals \
         WHERE funding_amount IS NOT NULL \
         GROUP BY funding_currency \
         ORDER BY total_amount DESC, currency",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
