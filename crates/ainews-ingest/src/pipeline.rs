use std::sync::Arc;

use ainews_core::NewArticle;
use ainews_db::{insert_article, InsertOutcome};
use ainews_parser::ArticleParser;
use futures::stream::{self, StreamExt};
use sqlx::PgPool;

use crate::IngestError;

/// Per-batch counters returned by [`ingest_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub parsed: usize,
    pub inserted: usize,
    pub duplicates: usize,
    /// Deals stored with newly inserted articles.
    pub deals: usize,
    /// Articles that failed to store for a reason other than an unreachable
    /// database.
    pub failed: usize,
}

/// Parse `articles` on the blocking pool, at most `concurrency` at a time,
/// and store each result through [`insert_article`] as it completes.
///
/// Inserts run sequentially on this task. Known URLs are counted as
/// duplicates. A `concurrency` of zero is treated as one.
///
/// # Errors
///
/// Returns [`IngestError::Storage`] on the first retryable storage failure,
/// leaving the remaining articles unprocessed, or [`IngestError::ParseTask`]
/// if a parse task panicked. Other per-article storage errors are logged and
/// counted in [`IngestSummary::failed`].
pub async fn ingest_batch(
    pool: &PgPool,
    parser: Arc<ArticleParser>,
    articles: Vec<NewArticle>,
    concurrency: usize,
) -> Result<IngestSummary, IngestError> {
    let batch_size = articles.len();
    let mut summary = IngestSummary::default();

    let mut parsed_articles = stream::iter(articles)
        .map(|article| {
            let parser = Arc::clone(&parser);
            tokio::task::spawn_blocking(move || {
                let parsed = parser.parse(&article.url, &article.title, &article.content);
                (article, parsed)
            })
        })
        .buffer_unordered(concurrency.max(1));

    while let Some(joined) = parsed_articles.next().await {
        let (article, parsed) = joined?;
        summary.parsed += 1;

        match insert_article(pool, &article, &parsed).await {
            Ok(InsertOutcome::Inserted(article_id)) => {
                summary.inserted += 1;
                summary.deals += parsed.deals.len();
                tracing::info!(
                    url = %article.url,
                    article_id,
                    relevance = parsed.relevance_score,
                    categories = parsed.categories.len(),
                    deals = parsed.deals.len(),
                    "article stored"
                );
            }
            Ok(InsertOutcome::Duplicate) => {
                summary.duplicates += 1;
                tracing::debug!(url = %article.url, "duplicate article skipped");
            }
            Err(err) if err.is_retryable() => {
                tracing::error!(
                    url = %article.url,
                    error = %err,
                    processed = summary.parsed,
                    batch_size,
                    "storage unavailable, aborting batch"
                );
                return Err(IngestError::Storage(err));
            }
            Err(err) => {
                summary.failed += 1;
                tracing::warn!(url = %article.url, error = %err, "failed to store article");
            }
        }
    }

    tracing::info!(
        batch_size,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        deals = summary.deals,
        failed = summary.failed,
        "ingest batch complete"
    );

    Ok(summary)
}
