use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ns_core::{Article, ArticleStore, Comment, Error, NewArticle, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::Row;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        headline TEXT,
        url TEXT NOT NULL UNIQUE,
        summary TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        article_id TEXT NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
        body TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_comments_article_id ON comments(article_id)",
];

fn db_error(context: &str, e: sqlx::Error) -> Error {
    Error::Database(format!("{}: {}", context, e))
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date {:?}: {}", value, e)))
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.get("id"),
        body: row.get("body"),
        date: parse_date(row.get::<&str, _>("created_at"))?,
    })
}

fn article_from_row(row: &SqliteRow, comments: Vec<Comment>) -> Result<Article> {
    Ok(Article {
        id: row.get("id"),
        headline: row.get::<Option<String>, _>("headline"),
        url: row.get("url"),
        summary: row.get::<Option<String>, _>("summary"),
        comments,
        date: parse_date(row.get::<&str, _>("created_at"))?,
    })
}

async fn fetch_article(conn: &mut SqliteConnection, id: &str) -> Result<Option<Article>> {
    let row = sqlx::query("SELECT id, headline, url, summary, created_at FROM articles WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to fetch article", e))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let comments = sqlx::query(
        "SELECT id, body, created_at FROM comments WHERE article_id = ? ORDER BY seq",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to fetch comments", e))?
    .iter()
    .map(comment_from_row)
    .collect::<Result<Vec<_>>>()?;

    article_from_row(&row, comments).map(Some)
}

pub struct SQLiteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
}

const IN_MEMORY: &str = ":memory:";

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &PathBuf) -> Result<Self> {
        let pool = if db_path.as_os_str() == IN_MEMORY {
            // every pooled connection would otherwise open its own empty database
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| db_error("Invalid in-memory options", e))?
                .foreign_keys(true);
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(db_path)
                .create_if_missing(true)
                .foreign_keys(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));

            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await
        }
        .map_err(|e| db_error("Failed to connect to database", e))?;

        for (i, statement) in SCHEMA.iter().enumerate() {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| db_error(&format!("Failed to apply schema statement {}", i), e))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.clone(),
        })
    }

    pub fn get_db_path(&self) -> &PathBuf {
        &self.db_path
    }

    async fn get(&self, id: &str) -> Result<Option<Article>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        fetch_article(&mut conn, id).await
    }
}

#[async_trait]
impl ArticleStore for SQLiteStorage {
    async fn create(&self, data: NewArticle) -> Result<Article> {
        let article = Article::from_new(data)?;

        sqlx::query(
            r#"
            INSERT INTO articles (id, headline, url, summary, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.id)
        .bind(article.headline.as_deref())
        .bind(&article.url)
        .bind(article.summary.as_deref())
        .bind(article.date.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::DuplicateKey(article.url.clone())
            }
            e => db_error("Failed to store article", e),
        })?;

        Ok(article)
    }

    async fn find_all(&self) -> Result<Vec<Article>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let article_rows = sqlx::query("SELECT id, headline, url, summary, created_at FROM articles ORDER BY rowid")
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to list articles", e))?;

        let comment_rows = sqlx::query("SELECT id, article_id, body, created_at FROM comments ORDER BY seq")
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to list comments", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        let mut comments: HashMap<String, Vec<Comment>> = HashMap::new();
        for row in &comment_rows {
            comments
                .entry(row.get("article_id"))
                .or_default()
                .push(comment_from_row(row)?);
        }

        article_rows
            .iter()
            .map(|row| {
                let id: String = row.get("id");
                article_from_row(row, comments.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Article>> {
        self.get(id).await
    }

    async fn add_comment(&self, id: &str, body: &str) -> Result<Option<Article>> {
        let comment = Comment::new(body)?;

        // inserts nothing when the article is missing
        let inserted = sqlx::query(
            r#"
            INSERT INTO comments (id, article_id, body, created_at)
            SELECT ?, id, ?, ? FROM articles WHERE id = ?
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.body)
        .bind(comment.date.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to add comment", e))?
        .rows_affected();

        if inserted == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn remove_comment(&self, article_id: &str, comment_id: &str) -> Result<Option<Article>> {
        sqlx::query("DELETE FROM comments WHERE id = ? AND article_id = ?")
            .bind(comment_id)
            .bind(article_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to remove comment", e))?;

        self.get(article_id).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Article>> {
        let Some(article) = self.get(id).await? else {
            return Ok(None);
        };

        let deleted = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete article", e))?
            .rows_affected();

        Ok((deleted > 0).then_some(article))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn article(url: &str) -> NewArticle {
        NewArticle::new(url).with_headline("Test Article")
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();

        let created = storage.create(article("http://example.com/1")).await.unwrap();
        let found = storage.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.summary, None);

        let err = storage.create(article("http://example.com/1")).await.unwrap_err();
        assert!(err.is_duplicate_key());

        storage.create(article("http://example.com/2")).await.unwrap();
        let urls: Vec<_> = storage.find_all().await.unwrap().into_iter().map(|a| a.url).collect();
        assert_eq!(urls, ["http://example.com/1", "http://example.com/2"]);
    }

    #[tokio::test]
    async fn test_comments_keep_order() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap();
        let created = storage.create(article("http://example.com/1")).await.unwrap();

        for body in ["first", "second", "third"] {
            storage.add_comment(&created.id, body).await.unwrap().unwrap();
        }
        let updated = storage.find_by_id(&created.id).await.unwrap().unwrap();
        let bodies: Vec<_> = updated.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, ["first", "second", "third"]);

        let removed = updated.comments[1].id.clone();
        let updated = storage.remove_comment(&created.id, &removed).await.unwrap().unwrap();
        let bodies: Vec<_> = updated.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, ["first", "third"]);

        let all = storage.find_all().await.unwrap();
        assert_eq!(all[0].comments.len(), 2);

        assert_eq!(storage.add_comment("missing", "x").await.unwrap(), None);
        assert!(matches!(
            storage.add_comment(&created.id, "  ").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_comments() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap();
        let created = storage.create(article("http://example.com/1")).await.unwrap();
        storage.add_comment(&created.id, "bye").await.unwrap();

        let deleted = storage.delete_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(deleted.comments.len(), 1);
        assert_eq!(storage.find_by_id(&created.id).await.unwrap(), None);
        assert_eq!(storage.delete_by_id(&created.id).await.unwrap(), None);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&storage.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_create_one_record() {
        let temp_dir = tempdir().unwrap();
        let storage = Arc::new(SQLiteStorage::new_with_path(&temp_dir.path().join("test.db")).await.unwrap());

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let storage = storage.clone();
                tokio::spawn(async move { storage.create(article("http://example.com/race")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(e.is_duplicate_key(), "unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");
        let id = {
            let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();
            storage.create(article("http://example.com/1")).await.unwrap().id
        };

        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();
        assert_eq!(storage.get_db_path(), &db_path);
        assert!(storage.find_by_id(&id).await.unwrap().is_some());
    }
}
