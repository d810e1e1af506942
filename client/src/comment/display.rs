use super::Comment;

pub const DELETED_CONTENT: &str = "[Deleted]";
pub const REDACTED_AUTHOR: &str = "[Redacted]";

impl Comment {
    /// A comment whose `updated_at` differs from `created_at` has been edited.
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }

    /// The copy that should be shown to readers. Deleted comments keep their
    /// place in the thread so replies still render under them.
    pub fn tombstone(&self) -> Comment {
        if !self.deleted {
            return self.clone();
        }

        Comment {
            content: DELETED_CONTENT.into(),
            created_by_username: REDACTED_AUTHOR.into(),
            likes: 0,
            ..self.clone()
        }
    }

    /// Optimistically flips the viewer's like, mirroring what
    /// `POST comments/{id}/like` does on the backend.
    pub fn toggle_like(&mut self) {
        if self.liked_by_user {
            self.likes -= 1;
        } else {
            self.likes += 1;
        }
        self.liked_by_user = !self.liked_by_user;
    }
}

pub fn apply_like(comments: &mut [Comment], id: i64) -> bool {
    match comments.iter_mut().find(|c| c.id == id) {
        Some(comment) => {
            comment.toggle_like();
            true
        }
        None => false,
    }
}

pub fn mark_deleted(comments: &mut [Comment], id: i64) -> bool {
    match comments.iter_mut().find(|c| c.id == id) {
        Some(comment) => {
            comment.deleted = true;
            *comment = comment.tombstone();
            true
        }
        None => false,
    }
}
