use crate::{
    api::ForumClient,
    error::{Error, Result},
    models::{CommentUpdate, Created, NewComment, NewPost, NewTopic, User},
};

/// The logged-in state of a [`ForumClient`]. Operations that act on behalf
/// of a user take the author id from here.
#[derive(Clone, Debug)]
pub struct Session {
    client: ForumClient,
    user: Option<User>,
}

impl Session {
    pub fn new(client: ForumClient) -> Self {
        Session { client, user: None }
    }

    pub fn client(&self) -> &ForumClient {
        &self.client
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn require_user(&self) -> Result<&User> {
        self.user.as_ref().ok_or(Error::NotAuthenticated)
    }

    /// Picks up an existing session cookie, if the backend still accepts it.
    pub async fn restore(&mut self) -> Result<Option<&User>> {
        self.user = match self.client.current_user().await {
            Ok(user) => Some(user),
            Err(Error::Http(e)) => return Err(Error::Http(e)),
            Err(e) => {
                tracing::debug!(error = %e, "No authenticated user");
                None
            }
        };
        Ok(self.user.as_ref())
    }

    pub async fn login(&mut self, username: &str) -> Result<&User> {
        let user = self.client.login(username).await?;
        tracing::info!(user_id = user.id, username = %user.username, "Logged in");
        Ok(self.user.insert(user))
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.client.logout().await?;
        self.user = None;
        Ok(())
    }

    pub async fn new_topic(&self, title: &str, description: &str) -> Result<Created> {
        let user = self.require_user()?;
        self.client
            .create_topic(&NewTopic {
                title: title.into(),
                description: description.into(),
                created_by: user.id,
            })
            .await
    }

    pub async fn new_post(&self, topic_id: i64, title: &str, content: &str) -> Result<Created> {
        let user = self.require_user()?;
        self.client
            .create_post(&NewPost {
                topic_id,
                user_id: user.id,
                title: title.into(),
                content: content.into(),
            })
            .await
    }

    /// Comments on a post, or replies to `parent_id` when given.
    pub async fn reply(&self, post_id: i64, content: &str, parent_id: Option<i64>) -> Result<Created> {
        let user = self.require_user()?;
        self.client
            .create_comment(&NewComment {
                post_id,
                user_id: user.id,
                content: content.into(),
                parent_id,
            })
            .await
    }

    pub async fn edit_comment(&self, id: i64, content: &str) -> Result<()> {
        self.require_user()?;
        self.client
            .update_comment(id, &CommentUpdate {
                content: content.into(),
            })
            .await
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_logged_out_session_refuses_to_write() {
        // nothing listens here, requests must fail before being sent
        let client = ForumClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let session = Session::new(client);

        assert!(!session.is_authenticated());
        assert!(matches!(
            session.reply(1, "hello", None).await,
            Err(Error::NotAuthenticated)
        ));
        assert!(matches!(
            session.new_post(1, "title", "body").await,
            Err(Error::NotAuthenticated)
        ));
        assert!(matches!(
            session.new_topic("title", "description").await,
            Err(Error::NotAuthenticated)
        ));
        assert!(matches!(
            session.edit_comment(1, "changed").await,
            Err(Error::NotAuthenticated)
        ));
    }
}
