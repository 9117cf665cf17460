use async_trait::async_trait;
use crate::types::{Article, NewArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new article. Fails with `Error::DuplicateKey` when the URL is
    /// already stored.
    async fn create(&self, data: NewArticle) -> Result<Article>;

    /// All articles, in insertion order
    async fn find_all(&self) -> Result<Vec<Article>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Article>>;

    /// Append a comment. Returns `None` if the article does not exist.
    async fn add_comment(&self, id: &str, body: &str) -> Result<Option<Article>>;

    /// Remove a single comment. An unknown comment id leaves the article unchanged.
    async fn remove_comment(&self, article_id: &str, comment_id: &str) -> Result<Option<Article>>;

    /// Delete an article with its comments, returning what was removed
    async fn delete_by_id(&self, id: &str) -> Result<Option<Article>>;
}
