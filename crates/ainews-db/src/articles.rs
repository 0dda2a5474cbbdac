use ainews_core::{url_hash, ExtractedDeal, NewArticle, ParseResult, RoundType, UrlStatus};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub url: String,
    pub url_hash: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub source: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub scraped_at: DateTime<Utc>,
    pub relevance_score: f32,
    pub is_deal_news: bool,
    pub url_status: String,
    pub url_last_checked: Option<DateTime<Utc>>,
}

impl ArticleRow {
    /// Parsed `url_status`; `None` only if the column holds a value this
    /// build does not know.
    #[must_use]
    pub fn status(&self) -> Option<UrlStatus> {
        self.url_status.parse().ok()
    }
}

/// Result of [`insert_article`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// An article with the same normalized URL is already stored.
    Duplicate,
}

impl InsertOutcome {
    #[must_use]
    pub fn id(self) -> Option<i64> {
        match self {
            InsertOutcome::Inserted(id) => Some(id),
            InsertOutcome::Duplicate => None,
        }
    }
}

pub(crate) const ARTICLE_COLUMNS: &str = "a.id, a.url, a.url_hash, a.title, a.summary, \
     a.content, a.source, a.published_at, a.scraped_at, a.relevance_score, a.is_deal_news, \
     a.url_status, a.url_last_checked";

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Store an article with its categories and deals in one transaction.
///
/// Deduplication is on the hash of the normalized URL. A known URL rolls the
/// transaction back and returns [`InsertOutcome::Duplicate`]; the stored row
/// is never updated. Category names missing from `categories` are created.
///
/// # Errors
///
/// Returns [`DbError::StorageUnavailable`] if the database cannot be reached,
/// or [`DbError::Sqlx`] if any statement fails. Nothing is written on error.
pub async fn insert_article(
    pool: &PgPool,
    article: &NewArticle,
    parsed: &ParseResult,
) -> Result<InsertOutcome, DbError> {
    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO articles \
             (url, url_hash, title, summary, content, source, published_at, \
              relevance_score, is_deal_news, url_status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (url_hash) DO NOTHING \
         RETURNING id",
    )
    .bind(&article.url)
    .bind(url_hash(&article.url))
    .bind(&article.title)
    .bind(&parsed.summary)
    .bind(&article.content)
    .bind(article.source.as_deref())
    .bind(article.published_at)
    .bind(bounded_score(parsed.relevance_score))
    .bind(parsed.is_deal_news)
    .bind(article.url_status.as_str())
    .fetch_optional(&mut *tx)
    .await?;

    let Some(id) = id else {
        tx.rollback().await?;
        return Ok(InsertOutcome::Duplicate);
    };

    for category in &parsed.categories {
        let weight = bounded_score(category.weight);
        if weight <= 0.0 {
            continue;
        }
        link_category(&mut tx, id, &category.name, weight).await?;
    }

    let fallback_date = article.published_at.map(|p| p.date_naive());
    for deal in &parsed.deals {
        insert_deal(&mut tx, id, deal, fallback_date).await?;
    }

    tx.commit().await?;
    Ok(InsertOutcome::Inserted(id))
}

async fn link_category(
    tx: &mut Transaction<'static, Postgres>,
    article_id: i64,
    name: &str,
    weight: f32,
) -> Result<(), DbError> {
    // DO UPDATE rather than DO NOTHING so RETURNING yields the existing id.
    let category_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO categories (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(name)
    .fetch_one(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO article_categories (article_id, category_id, weight) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (article_id, category_id) DO NOTHING",
    )
    .bind(article_id)
    .bind(category_id)
    .bind(weight)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_deal(
    tx: &mut Transaction<'static, Postgres>,
    article_id: i64,
    deal: &ExtractedDeal,
    fallback_date: Option<NaiveDate>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO deals \
             (article_id, company_name, funding_amount, funding_currency, amount_text, \
              round_type, investors, announcement_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(article_id)
    .bind(deal.company_name.as_deref())
    .bind(whole_amount(deal.amount))
    .bind(&deal.currency)
    .bind(deal.amount_text.as_deref())
    .bind(deal.round_type.map(RoundType::label))
    .bind(&deal.investors)
    .bind(deal.announcement_date.or(fallback_date))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Update the accessibility status of an article and stamp the check time.
///
/// Returns `false` when no article has the given id.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub async fn update_url_status(
    pool: &PgPool,
    article_id: i64,
    status: UrlStatus,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE articles \
         SET url_status = $2, url_last_checked = NOW() \
         WHERE id = $1",
    )
    .bind(article_id)
    .bind(status.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Whether an article with the same normalized URL is stored.
///
/// # Errors
///
/// Returns [`DbError`] if the lookup fails.
pub async fn article_exists(pool: &PgPool, url: &str) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM articles WHERE url_hash = $1)",
    )
    .bind(url_hash(url))
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Fetch one article by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no article has the id, or [`DbError`] if
/// the query fails.
pub async fn get_article(pool: &PgPool, article_id: i64) -> Result<ArticleRow, DbError> {
    let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles a WHERE a.id = $1");
    sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(article_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Articles in `status`, least recently checked first (never-checked first of
/// all), for the URL validator to work through.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if `limit` is not positive, or
/// [`DbError`] if the query fails.
pub async fn list_articles_by_url_status(
    pool: &PgPool,
    status: UrlStatus,
    limit: i64,
) -> Result<Vec<ArticleRow>, DbError> {
    if limit < 1 {
        return Err(DbError::Validation(format!(
            "limit must be positive, got {limit}"
        )));
    }

    let sql = format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles a \
         WHERE a.url_status = $1 \
         ORDER BY a.url_last_checked ASC NULLS FIRST, a.id ASC \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, ArticleRow>(&sql)
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Clamp to `[0, 1]`, mapping NaN to zero.
fn bounded_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// 2^63, the first whole value a `BIGINT` cannot hold.
const BIGINT_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Round to whole currency units. Negative, non-finite and out-of-range
/// amounts are dropped rather than saturated.
#[allow(clippy::cast_possible_truncation)]
fn whole_amount(amount: Option<f64>) -> Option<i64> {
    amount
        .map(f64::round)
        .filter(|a| a.is_finite() && *a >= 0.0 && *a < BIGINT_LIMIT)
        .map(|a| a as i64)
}
