pub mod api;
pub mod comment;
pub mod config;
pub mod date;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod utils;

pub use api::ForumClient;
pub use comment::{Comment, CommentNode, ParentRef, SortType, build_comment_tree};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use session::Session;
