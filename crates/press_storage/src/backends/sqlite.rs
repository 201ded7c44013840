use async_trait::async_trait;
use chrono::SecondsFormat;
use press_core::{ensure_identity, Article, ArticleRepository, ArticleStatus, Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        excerpt TEXT NOT NULL,
        content TEXT NOT NULL,
        category TEXT NOT NULL,
        date TEXT NOT NULL,
        tags TEXT NOT NULL,
        meta_title TEXT NOT NULL,
        meta_description TEXT NOT NULL,
        image TEXT NOT NULL,
        author TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_articles_status_created
    ON articles (status, created_at DESC)
    "#,
    // Add future migrations here
];

pub struct SqliteRepository {
    pool: SqlitePool,
    db_path: Option<PathBuf>,
}

fn storage_error(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

impl SqliteRepository {
    /// Opens (creating if needed) the database file at `db_path`.
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| storage_error("Failed to create database directory", e))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        let repository = Self {
            pool,
            db_path: Some(db_path.to_path_buf()),
        };
        repository.migrate().await?;
        Ok(repository)
    }

    /// Connects with a sqlx url such as `sqlite://articles.db` or `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| storage_error("Invalid database url", e))?
            .create_if_missing(true);

        // every connection to `:memory:` is a separate database, so keep exactly one alive
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        let repository = Self { pool, db_path: None };
        repository.migrate().await?;
        Ok(repository)
    }

    async fn migrate(&self) -> Result<()> {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error(&format!("Failed to run migration {}", i), e))?;
        }
        Ok(())
    }

    pub fn get_db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let get = |column: &str| -> Result<String> {
        row.try_get::<String, _>(column)
            .map_err(|e| storage_error(&format!("Failed to read column {}", column), e))
    };

    let tags: Vec<String> = serde_json::from_str(&get("tags")?)?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&get("created_at")?)
        .map_err(|e| storage_error("Failed to parse created_at", e))?
        .with_timezone(&chrono::Utc);

    Ok(Article {
        id: get("id")?,
        slug: get("slug")?,
        title: get("title")?,
        excerpt: get("excerpt")?,
        content: get("content")?,
        category: get("category")?,
        date: get("date")?,
        tags,
        meta_title: get("meta_title")?,
        meta_description: get("meta_description")?,
        image: get("image")?,
        author: get("author")?,
        status: get("status")?.parse::<ArticleStatus>()?,
        created_at,
    })
}

#[async_trait]
impl ArticleRepository for SqliteRepository {
    async fn upsert(&self, article: &Article) -> Result<()> {
        ensure_identity(article)?;
        let tags = serde_json::to_string(&article.tags)?;

        sqlx::query(
            r#"
            INSERT INTO articles
            (id, slug, title, excerpt, content, category, date, tags,
             meta_title, meta_description, image, author, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                slug = excluded.slug,
                title = excluded.title,
                excerpt = excluded.excerpt,
                content = excluded.content,
                category = excluded.category,
                date = excluded.date,
                tags = excluded.tags,
                meta_title = excluded.meta_title,
                meta_description = excluded.meta_description,
                image = excluded.image,
                author = excluded.author,
                status = excluded.status
            "#,
        )
        .bind(&article.id)
        .bind(&article.slug)
        .bind(&article.title)
        .bind(&article.excerpt)
        .bind(&article.content)
        .bind(&article.category)
        .bind(&article.date)
        .bind(tags)
        .bind(&article.meta_title)
        .bind(&article.meta_description)
        .bind(&article.image)
        .bind(&article.author)
        .bind(article.status.as_str())
        .bind(article.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to store article", e))?;

        Ok(())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get article by slug", e))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn list(&self, status: Option<ArticleStatus>) -> Result<Vec<Article>> {
        let rows = match status {
            Some(status) => {
                sqlx::query("SELECT * FROM articles WHERE status = ? ORDER BY created_at DESC")
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM articles ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| storage_error("Failed to list articles", e))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete article", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    fn article(id: &str, slug: &str) -> Article {
        Article {
            id: id.to_string(),
            slug: slug.to_string(),
            title: "Test Article".to_string(),
            excerpt: "Excerpt".to_string(),
            content: "<p>Test content</p>".to_string(),
            category: "AI".to_string(),
            date: "2025-02-01".to_string(),
            tags: vec!["ai".to_string(), "chips".to_string()],
            meta_title: "Meta".to_string(),
            meta_description: "Meta description".to_string(),
            image: "https://example.com/i.png".to_string(),
            author: "Editorial Team".to_string(),
            status: ArticleStatus::Published,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_upsert_and_read_back() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let repo = SqliteRepository::new_with_path(&db_path).await.unwrap();
        assert_eq!(repo.get_db_path(), Some(db_path.as_path()));

        let first = article("a1", "first");
        repo.upsert(&first).await.unwrap();
        repo.upsert(&first).await.unwrap();

        let mut changed = first.clone();
        changed.title = "Changed".to_string();
        repo.upsert(&changed).await.unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 1);
        let found = repo.get_by_slug("first").await.unwrap().unwrap();
        assert_eq!(found.title, "Changed");
        assert_eq!(found.tags, vec!["ai", "chips"]);
        assert_eq!(found.status, ArticleStatus::Published);
    }

    #[tokio::test]
    async fn test_sqlite_slug_conflict_passes_store_message() {
        let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
        repo.upsert(&article("a1", "same")).await.unwrap();
        let err = repo.upsert(&article("a2", "same")).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().contains("UNIQUE"));
    }

    #[tokio::test]
    async fn test_sqlite_list_orders_and_filters() {
        let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
        let now = Utc::now();
        let mut older = article("older", "older");
        older.created_at = now - Duration::hours(3);
        let mut newer = article("newer", "newer");
        newer.created_at = now;
        let mut draft = article("draft", "draft");
        draft.status = ArticleStatus::Draft;

        for a in [&older, &newer, &draft] {
            repo.upsert(a).await.unwrap();
        }

        let published: Vec<String> = repo
            .list(Some(ArticleStatus::Published))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(published, vec!["newer", "older"]);

        repo.delete_by_id("newer").await.unwrap();
        assert!(repo.get_by_slug("newer").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_edit_keeps_creation_time() {
        let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
        let now = Utc::now();
        let mut old = article("old", "old");
        old.created_at = now - Duration::days(30);
        let mut new = article("new", "new");
        new.created_at = now - Duration::days(1);
        repo.upsert(&old).await.unwrap();
        repo.upsert(&new).await.unwrap();

        let mut edited = old.clone();
        edited.title = "Old, edited".to_string();
        edited.created_at = now;
        repo.upsert(&edited).await.unwrap();

        let listed = repo.list(None).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(listed[1].title, "Old, edited");
        assert_eq!(
            listed[1].created_at.timestamp_micros(),
            old.created_at.timestamp_micros()
        );
    }

    #[tokio::test]
    async fn test_sqlite_requires_identity() {
        let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
        let err = repo.upsert(&article("", "slug")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
