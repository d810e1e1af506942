use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::{Comment, CommentNode, SortType, build_comment_tree, sort_tree};

pub const MAX_CONTENT_LEN: usize = 5000;
pub const MAX_TITLE_LEN: usize = 200;
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 7..=15;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(with = "crate::date::timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Topic {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "crate::date::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "user_id", default)]
    pub created_by: i64,
    #[serde(alias = "username", default)]
    pub created_by_username: String,
    #[serde(default)]
    pub post_count: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(with = "crate::date::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::date::timestamp")]
    pub updated_at: DateTime<Utc>,
    pub topic_id: i64,
    pub user_id: i64,
    #[serde(alias = "username", default)]
    pub created_by_username: String,
    #[serde(default)]
    pub topic_title: Option<String>,
    #[serde(default)]
    pub liked_by_user: bool,
}

impl Post {
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }

    pub fn toggle_like(&mut self) {
        if self.liked_by_user {
            self.likes -= 1;
        } else {
            self.likes += 1;
        }
        self.liked_by_user = !self.liked_by_user;
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub posts: Vec<Post>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub topics: Vec<Topic>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.topics.is_empty()
    }
}

/// A post with the flat list of its comments, what a post page shows. Likes
/// and deletions are applied to the flat list and the tree is rebuilt from
/// it on every refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct PostThread {
    pub post: Post,
    pub comments: Vec<Comment>,
}

impl PostThread {
    pub fn tree(&self, sort: Option<SortType>) -> Vec<CommentNode> {
        let mut tree = build_comment_tree(&self.comments);
        if let Some(sort) = sort {
            sort_tree(&mut tree, sort);
        }
        tree
    }
}

// The backend encodes empty result sets as `null`
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response of the create endpoints. Posts answer with `post_id`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Created {
    #[serde(alias = "post_id")]
    pub id: i64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Page {
    pub size: u32,
    pub offset: u32,
}

impl Page {
    pub fn first(size: u32) -> Self {
        Page { size, offset: 0 }
    }

    pub fn next(&self) -> Self {
        Page {
            size: self.size,
            offset: self.offset.saturating_add(self.size),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct Credentials {
    pub username: String,
}

impl Credentials {
    pub fn new(username: &str) -> Self {
        Credentials {
            username: username.trim().to_string(),
        }
    }

    /// Usernames are checked on registration only; login accepts whatever
    /// the account was created with.
    pub fn validate_new(&self) -> Result<(), &'static str> {
        if self.username.is_empty() {
            return Err("Username is required");
        }

        // the backend measures the length in bytes
        if !USERNAME_LEN.contains(&self.username.len()) {
            return Err("Username must be between 7 and 15 characters");
        }

        if self.username.chars().any(char::is_whitespace) {
            return Err("Username cannot contain whitespace");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct NewTopic {
    pub title: String,
    pub description: String,
    pub created_by: i64,
}

impl NewTopic {
    pub fn validate(&mut self) -> Result<(), &'static str> {
        self.title = validate_title(&self.title)?;

        self.description = self.description.trim().to_string();
        if self.description.is_empty() {
            return Err("No description provided");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct TopicUpdate {
    pub title: String,
    pub description: String,
}

impl TopicUpdate {
    pub fn validate(&mut self) -> Result<(), &'static str> {
        self.title = validate_title(&self.title)?;
        self.description = self.description.trim().to_string();
        if self.description.is_empty() {
            return Err("No description provided");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct NewPost {
    pub topic_id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
}

impl NewPost {
    pub fn validate(&mut self) -> Result<(), &'static str> {
        self.title = validate_title(&self.title)?;
        self.content = validate_content(&self.content)?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
}

impl PostUpdate {
    pub fn validate(&mut self) -> Result<(), &'static str> {
        self.title = validate_title(&self.title)?;
        self.content = validate_content(&self.content)?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl NewComment {
    pub fn validate(&mut self) -> Result<(), &'static str> {
        self.content = validate_content(&self.content)?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct CommentUpdate {
    pub content: String,
}

impl CommentUpdate {
    pub fn validate(&mut self) -> Result<(), &'static str> {
        self.content = validate_content(&self.content)?;
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<String, &'static str> {
    let title = title.trim();
    if title.is_empty() {
        return Err("No title provided");
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err("Title too long (max 200 characters)");
    }
    Ok(title.to_string())
}

fn validate_content(content: &str) -> Result<String, &'static str> {
    let content = content.trim();
    if content.is_empty() {
        return Err("No content provided");
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err("Content too long (max 5000 characters)");
    }
    Ok(content.to_string())
}
