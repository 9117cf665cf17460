use async_trait::async_trait;
use ns_core::{ArticleStore, Error, Result};
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn new() -> Result<Self> where Self: Sized;
}

/// Backend selected by the scheme of a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    SQLite(String),
}

impl StorageKind {
    pub fn from_url(database_url: &str) -> Result<Self> {
        let url = database_url.trim();
        if url == "memory" || url.starts_with("memory:") {
            return Ok(Self::Memory);
        }
        if let Some(path) = url.strip_prefix("sqlite:") {
            let path = path.trim_start_matches("//");
            if path.is_empty() {
                return Err(Error::Storage("sqlite connection string has no path".to_string()));
            }
            return Ok(Self::SQLite(path.to_string()));
        }
        Err(Error::Storage(format!("Unsupported storage connection string: {}", database_url)))
    }
}

/// Construct a backend through its default hook
pub async fn open_default<T: StorageBackend + ArticleStore + 'static>() -> Result<Arc<dyn ArticleStore>> {
    match T::new().await {
        Ok(storage) => Ok(Arc::new(storage)),
        Err(e) => Err(Error::Storage(format!("{} ({})", T::get_error_message(), e))),
    }
}

pub async fn create_storage(database_url: &str) -> Result<Arc<dyn ArticleStore>> {
    match StorageKind::from_url(database_url)? {
        StorageKind::Memory => {
            tracing::info!("🏦 Using in-memory article store");
            open_default::<InMemoryStorage>().await
        }
        #[cfg(feature = "sqlite")]
        StorageKind::SQLite(path) => {
            tracing::info!(path = %path, "🏦 Using SQLite article store");
            let storage = SQLiteStorage::new_with_path(&std::path::PathBuf::from(path)).await?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageKind::SQLite(_) => Err(Error::Storage(
            "SQLite support is not enabled; rebuild with the `sqlite` feature".to_string(),
        )),
    }
}

pub mod prelude {
    pub use super::{create_storage, open_default, StorageBackend, StorageKind};
    pub use super::backends::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_from_url() {
        assert_eq!(StorageKind::from_url("memory://").unwrap(), StorageKind::Memory);
        assert_eq!(
            StorageKind::from_url("sqlite://news_scrape.db").unwrap(),
            StorageKind::SQLite("news_scrape.db".to_string())
        );
        assert_eq!(
            StorageKind::from_url("sqlite:/tmp/news.db").unwrap(),
            StorageKind::SQLite("/tmp/news.db".to_string())
        );
        assert!(StorageKind::from_url("sqlite://").is_err());
        assert!(StorageKind::from_url("mongodb://localhost:27017/news_scrape").is_err());
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_create_sqlite_in_memory_storage() {
        use ns_core::NewArticle;

        let storage = create_storage("sqlite::memory:").await.unwrap();
        let created = storage.create(NewArticle::new("https://example.com/a")).await.unwrap();
        storage.add_comment(&created.id, "first").await.unwrap().unwrap();

        let err = storage.create(NewArticle::new("https://example.com/a")).await.unwrap_err();
        assert!(err.is_duplicate_key());
        let all = storage.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].comments.len(), 1);
    }

    #[tokio::test]
    async fn test_create_memory_storage() {
        let storage = create_storage("memory://").await.unwrap();
        assert!(storage.find_all().await.unwrap().is_empty());
    }
}
