use async_trait::async_trait;
use ns_core::{Article, ArticleStore, Comment, Error, NewArticle, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, data: NewArticle) -> Result<Article> {
        let article = Article::from_new(data)?;
        if self.articles.iter().any(|a| a.url == article.url) {
            return Err(Error::DuplicateKey(article.url));
        }
        self.articles.push(article.clone());
        Ok(article)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Article> {
        self.articles.iter_mut().find(|a| a.id == id)
    }

    pub fn find_by_id(&self, id: &str) -> Option<Article> {
        self.articles.iter().find(|a| a.id == id).cloned()
    }

    pub fn add_comment(&mut self, id: &str, body: &str) -> Result<Option<Article>> {
        let comment = Comment::new(body)?;
        let Some(article) = self.get_mut(id) else {
            return Ok(None);
        };
        article.comments.push(comment);
        Ok(Some(article.clone()))
    }

    pub fn remove_comment(&mut self, article_id: &str, comment_id: &str) -> Option<Article> {
        let article = self.get_mut(article_id)?;
        article.comments.retain(|c| c.id != comment_id);
        Some(article.clone())
    }

    pub fn delete_by_id(&mut self, id: &str) -> Option<Article> {
        let index = self.articles.iter().position(|a| a.id == id)?;
        Some(self.articles.remove(index))
    }
}

pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        })
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new() -> Result<Self> where Self: Sized {
        Self::new().await
    }
}

#[async_trait]
impl ArticleStore for InMemoryStorage {
    async fn create(&self, data: NewArticle) -> Result<Article> {
        // uniqueness check and insert share one write guard
        let mut store = self.store.write().await;
        store.create(data)
    }

    async fn find_all(&self) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.articles.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.find_by_id(id))
    }

    async fn add_comment(&self, id: &str, body: &str) -> Result<Option<Article>> {
        let mut store = self.store.write().await;
        store.add_comment(id, body)
    }

    async fn remove_comment(&self, article_id: &str, comment_id: &str) -> Result<Option<Article>> {
        let mut store = self.store.write().await;
        Ok(store.remove_comment(article_id, comment_id))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Article>> {
        let mut store = self.store.write().await;
        Ok(store.delete_by_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str) -> NewArticle {
        NewArticle::new(url).with_headline("Test Article").with_summary("A summary")
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = InMemoryStorage::new().await.unwrap();
        let created = storage.create(article("http://test.com/1")).await.unwrap();

        let found = storage.find_by_id(&created.id).await.unwrap();
        assert_eq!(found, Some(created.clone()));
        assert_eq!(storage.find_all().await.unwrap(), vec![created]);
        assert_eq!(storage.find_by_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_url_is_rejected() {
        let storage = InMemoryStorage::new().await.unwrap();
        storage.create(article("http://test.com/1")).await.unwrap();

        let err = storage.create(article("http://test.com/1")).await.unwrap_err();
        assert!(err.is_duplicate_key());
        assert_eq!(storage.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_create_one_record() {
        let storage = Arc::new(InMemoryStorage::new().await.unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let storage = storage.clone();
                tokio::spawn(async move { storage.create(article("http://test.com/race")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(e.is_duplicate_key()),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(storage.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_comments() {
        let storage = InMemoryStorage::new().await.unwrap();
        let created = storage.create(article("http://test.com/1")).await.unwrap();

        storage.add_comment(&created.id, "first").await.unwrap().unwrap();
        storage.add_comment(&created.id, "second").await.unwrap().unwrap();
        let updated = storage.add_comment(&created.id, "third").await.unwrap().unwrap();
        let bodies: Vec<_> = updated.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, ["first", "second", "third"]);

        let second = updated.comments[1].id.clone();
        let updated = storage.remove_comment(&created.id, &second).await.unwrap().unwrap();
        let bodies: Vec<_> = updated.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, ["first", "third"]);

        let unchanged = storage.remove_comment(&created.id, "missing").await.unwrap().unwrap();
        assert_eq!(unchanged.comments.len(), 2);

        assert_eq!(storage.add_comment("missing", "x").await.unwrap(), None);
        assert_eq!(storage.remove_comment("missing", &second).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_blank_comment_rejected_before_lookup() {
        let storage = InMemoryStorage::new().await.unwrap();
        assert!(matches!(
            storage.add_comment("missing", "   ").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_padded_url_is_a_duplicate() {
        let storage = InMemoryStorage::new().await.unwrap();
        let created = storage.create(article(" https://x/a ")).await.unwrap();
        assert_eq!(created.url, "https://x/a");

        let err = storage.create(article("https://x/a")).await.unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = InMemoryStorage::new().await.unwrap();
        let created = storage.create(article("http://test.com/1")).await.unwrap();

        let deleted = storage.delete_by_id(&created.id).await.unwrap();
        assert_eq!(deleted.map(|a| a.id), Some(created.id.clone()));
        assert_eq!(storage.find_by_id(&created.id).await.unwrap(), None);
        assert_eq!(storage.delete_by_id(&created.id).await.unwrap(), None);

        // the URL is free again once the record is gone
        storage.create(article("http://test.com/1")).await.unwrap();
    }
}
