//! Filtered, paginated article listing.

use std::str::FromStr;

use ainews_core::UrlStatus;
use sqlx::PgPool;

use crate::articles::{ArticleRow, ARTICLE_COLUMNS};
use crate::{begin_snapshot, like_pattern, non_blank, validate_paging, DbError};

pub const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Result ordering. Every order ends with `id DESC` so pages are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Newest publish date first; undated articles last.
    #[default]
    PublishedDate,
    Relevance,
    /// Most recently scraped first.
    Recent,
}

impl SortBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::PublishedDate => "published_date",
            SortBy::Relevance => "relevance",
            SortBy::Recent => "recent",
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            SortBy::PublishedDate => "a.published_at DESC NULLS LAST, a.id DESC",
            SortBy::Relevance => "a.relevance_score DESC, a.id DESC",
            SortBy::Recent => "a.scraped_at DESC, a.id DESC",
        }
    }
}

impl FromStr for SortBy {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published_date" => Ok(SortBy::PublishedDate),
            "relevance" => Ok(SortBy::Relevance),
            "recent" => Ok(SortBy::Recent),
            other => Err(DbError::Validation(format!("unknown sort order '{other}'"))),
        }
    }
}

/// Filters and paging for [`query_articles`]. `None` filters match everything.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    pub category: Option<String>,
    pub min_relevance: Option<f32>,
    /// Case-insensitive substring of the title or content.
    pub search: Option<String>,
    pub deals_only: bool,
    pub url_status: Option<UrlStatus>,
    pub sort_by: SortBy,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            category: None,
            min_relevance: None,
            search: None,
            deals_only: false,
            url_status: None,
            sort_by: SortBy::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ArticleQuery {
    /// # Errors
    ///
    /// Returns [`DbError::Validation`] for paging out of range or a
    /// `min_relevance` outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), DbError> {
        validate_paging(self.page, self.page_size)?;
        if let Some(min) = self.min_relevance {
            if !(0.0..=1.0).contains(&min) {
                return Err(DbError::Validation(format!(
                    "min_relevance must be within [0, 1], got {min}"
                )));
            }
        }
        Ok(())
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total.div_ceil(u64::from(page_size))
        };
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

pub(crate) fn offset(page: u32, page_size: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(page_size)
}

const ARTICLE_FILTERS: &str = "\
    ($1::TEXT IS NULL OR EXISTS ( \
        SELECT 1 FROM article_categories ac \
        JOIN categories c ON c.id = ac.category_id \
        WHERE ac.article_id = a.id AND c.name = $1)) \
    AND ($2::REAL IS NULL OR a.relevance_score >= $2) \
    AND ($3::TEXT IS NULL OR a.title ILIKE $3 OR a.content ILIKE $3) \
    AND ($4::BOOLEAN IS NULL OR a.is_deal_news = $4) \
    AND ($5::TEXT IS NULL OR a.url_status = $5)";

/// List articles matching `query`, one page at a time.
///
/// The total count and the page are read from the same snapshot, so
/// concurrent inserts cannot make them disagree.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if the query is invalid (checked before
/// touching the database), or [`DbError`] if a statement fails.
pub async fn query_articles(
    pool: &PgPool,
    query: &ArticleQuery,
) -> Result<Page<ArticleRow>, DbError> {
    query.validate()?;

    let category = query.category.as_deref();
    let search = non_blank(query.search.as_deref()).map(like_pattern);
    let deal_flag = query.deals_only.then_some(true);
    let url_status = query.url_status.map(UrlStatus::as_str);

    let count_sql = format!("SELECT COUNT(*) FROM articles a WHERE {ARTICLE_FILTERS}");
    let page_sql = format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles a WHERE {ARTICLE_FILTERS} \
         ORDER BY {} LIMIT $6 OFFSET $7",
        query.sort_by.order_clause()
    );

    let mut tx = begin_snapshot(pool).await?;

    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(category)
        .bind(query.min_relevance)
        .bind(search.as_deref())
        .bind(deal_flag)
        .bind(url_status)
        .fetch_one(&mut *tx)
        .await?;

    let items = sqlx::query_as::<_, ArticleRow>(&page_sql)
        .bind(category)
        .bind(query.min_relevance)
        .bind(search.as_deref())
        .bind(deal_flag)
        .bind(url_status)
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
