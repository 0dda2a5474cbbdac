use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::query::{offset, Page};
use crate::{begin_snapshot, like_pattern, non_blank, validate_paging, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from `deals`, joined with the article it was extracted from.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DealRow {
    pub id: i64,
    pub article_id: i64,
    pub company_name: Option<String>,
    pub funding_amount: Option<i64>,
    pub funding_currency: String,
    pub amount_text: Option<String>,
    pub round_type: Option<String>,
    pub investors: Vec<String>,
    pub announcement_date: Option<NaiveDate>,
    pub article_title: String,
    pub article_url: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Filters and paging for [`query_deals`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealQuery {
    pub min_amount: Option<i64>,
    /// Case-insensitive substring of the company name or article title.
    pub search: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for DealQuery {
    fn default() -> Self {
        Self {
            min_amount: None,
            search: None,
            page: 1,
            page_size: 20,
        }
    }
}

const DEAL_COLUMNS: &str = "d.id, d.article_id, d.company_name, d.funding_amount, \
     d.funding_currency, d.amount_text, d.round_type, d.investors, d.announcement_date, \
     a.title AS article_title, a.url AS article_url, a.published_at";

const DEAL_FILTERS: &str = "\
    d.funding_amount IS NOT NULL \
    AND ($1::BIGINT IS NULL OR d.funding_amount >= $1) \
    AND ($2::TEXT IS NULL OR d.company_name ILIKE $2 OR a.title ILIKE $2)";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// List deals that carry an amount, newest announcement first.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for bad paging or a negative
/// `min_amount`, or [`DbError`] if a statement fails.
pub async fn query_deals(pool: &PgPool, query: &DealQuery) -> Result<Page<DealRow>, DbError> {
    validate_paging(query.page, query.page_size)?;
    if query.min_amount.is_some_and(|m| m < 0) {
        return Err(DbError::Validation(
            "min_amount must not be negative".to_string(),
        ));
    }

    let search = non_blank(query.search.as_deref()).map(like_pattern);

    let count_sql = format!(
        "SELECT COUNT(*) FROM deals d JOIN articles a ON a.id = d.article_id \
         WHERE {DEAL_FILTERS}"
    );
    let page_sql = format!(
        "SELECT {DEAL_COLUMNS} FROM deals d JOIN articles a ON a.id = d.article_id \
         WHERE {DEAL_FILTERS} \
         ORDER BY d.announcement_date DESC NULLS LAST, a.published_at DESC NULLS LAST, \
                  d.id DESC \
         LIMIT $3 OFFSET $4"
    );

    let mut tx = begin_snapshot(pool).await?;

    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(query.min_amount)
        .bind(search.as_deref())
        .fetch_one(&mut *tx)
        .await?;

    let items = sqlx::query_as::<_, DealRow>(&page_sql)
        .bind(query.min_amount)
        .bind(search.as_deref())
        .bind(i64::from(query.page_size))
        .bind(offset(query.page, query.page_size))
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Page::new(
        items,
        u64::try_from(total).unwrap_or(0),
        query.page,
        query.page_size,
    ))
}

/// All deals extracted from one article, in extraction order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_article_deals(pool: &PgPool, article_id: i64) -> Result<Vec<DealRow>, DbError> {
    let sql = format!(
        "SELECT {DEAL_COLUMNS} FROM deals d JOIN articles a ON a.id = d.article_id \
         WHERE d.article_id = $1 \
         ORDER BY d.id"
    );
    let rows = sqlx::query_as::<_, DealRow>(&sql)
        .bind(article_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
