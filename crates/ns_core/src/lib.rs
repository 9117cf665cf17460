pub mod error;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use storage::ArticleStore;
pub use types::{Article, Candidate, Comment, NewArticle};
