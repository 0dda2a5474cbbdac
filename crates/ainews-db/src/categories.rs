use sqlx::PgPool;

use crate::DbError;

/// A category with the number of articles linked to it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryCountRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub article_count: i64,
}

/// One category link of an article.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleCategoryRow {
    pub name: String,
    pub weight: f32,
}

/// Every category in the store with its article count, in creation order.
/// Categories with no articles are included with a zero count.
///
/// The nine seeded taxonomy categories come first. Names introduced by a
/// taxonomy override are created by [`insert_article`](crate::insert_article)
/// on first use and are listed after them, since the articles linked to them
/// are queryable too.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryCountRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryCountRow>(
        "SELECT c.id, c.name, c.description, COUNT(ac.article_id) AS article_count \
         FROM categories c \
         LEFT JOIN article_categories ac ON ac.category_id = c.id \
         GROUP BY c.id, c.name, c.description \
         ORDER BY c.id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Categories linked to one article, highest weight first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn get_article_categories(
    pool: &PgPool,
    article_id: i64,
) -> Result<Vec<ArticleCategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleCategoryRow>(
        "SELECT c.name, ac.weight \
         FROM article_categories ac \
         JOIN categories c ON c.id = ac.category_id \
         WHERE ac.article_id = $1 \
         ORDER BY ac.weight DESC, c.id",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
