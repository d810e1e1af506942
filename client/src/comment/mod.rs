pub mod display;
pub mod tree;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use display::{apply_like, mark_deleted};
pub use tree::{build_comment_tree, count_nodes, flatten, sort_tree};

// The model as returned by `GET posts/{id}/comments`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(with = "crate::date::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::date::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub post_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub parent_comment_id: ParentRef,
    #[serde(default)]
    pub liked_by_user: bool,
    #[serde(alias = "username", default)]
    pub created_by_username: String,
}

/// A nullable reference to the parent comment. On the wire it is a
/// `{"Int64": n, "Valid": bool}` pair where `Valid: false` means absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ParentRef(pub Option<i64>);

impl ParentRef {
    pub const NONE: ParentRef = ParentRef(None);

    pub fn to(id: i64) -> Self {
        ParentRef(Some(id))
    }

    pub fn get(&self) -> Option<i64> {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<i64>> for ParentRef {
    fn from(id: Option<i64>) -> Self {
        ParentRef(id)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ParentRefWire {
    Pair {
        #[serde(rename = "Int64", default)]
        int64: i64,
        #[serde(rename = "Valid")]
        valid: bool,
    },
    Bare(i64),
}

impl Serialize for ParentRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ParentRefWire::Pair {
            int64: self.0.unwrap_or_default(),
            valid: self.0.is_some(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParentRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match Option::<ParentRefWire>::deserialize(deserializer)? {
            Some(ParentRefWire::Pair { int64, valid: true }) => ParentRef(Some(int64)),
            Some(ParentRefWire::Pair { valid: false, .. }) | None => ParentRef(None),
            Some(ParentRefWire::Bare(id)) => ParentRef(Some(id)),
        })
    }
}

// A comment together with its replies, built client-side for rendering
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn new(comment: Comment) -> Self {
        CommentNode {
            comment,
            children: vec![],
        }
    }

    pub fn id(&self) -> i64 {
        self.comment.id
    }

    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.children.iter());
        }
        total
    }
}

// Reply chains can be arbitrarily deep, so subtrees are torn down from a
// heap stack instead of recursing once per level
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortType {
    #[default]
    Best,
    New,
}

impl FromStr for SortType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" => Ok(SortType::Best),
            "new" => Ok(SortType::New),
            _ => Err("invalid sort type"),
        }
    }
}

impl<'de> Deserialize<'de> for SortType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
