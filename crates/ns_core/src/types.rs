use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub headline: Option<String>,
    pub url: String,
    pub summary: Option<String>,
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
}

impl Article {
    /// Builds a fresh record from validated input, assigning the id and
    /// creation timestamp.
    pub fn from_new(data: NewArticle) -> Result<Self> {
        let data = data.validate()?;
        Ok(Self {
            id: generate_id(),
            headline: data.headline,
            url: data.url,
            summary: data.summary,
            comments: Vec::new(),
            date: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Err(Error::Validation("comment body must not be empty".to_string()));
        }
        Ok(Self {
            id: generate_id(),
            body: body.to_string(),
            date: Utc::now(),
        })
    }
}

/// Client-supplied fields of an article. Everything else is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewArticle {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub summary: Option<String>,
}

impl NewArticle {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = Some(headline.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Rejects a blank URL and strips surrounding whitespace from it
    pub fn validate(mut self) -> Result<Self> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::Validation("url is required".to_string()));
        }
        if url.len() != self.url.len() {
            self.url = url.to_string();
        }
        Ok(self)
    }
}

/// An article extracted from a listing page, before persistence is attempted.
pub type Candidate = NewArticle;

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
