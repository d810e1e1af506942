use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use crate::{
    comment::{Comment, CommentNode, build_comment_tree},
    config::ClientConfig,
    error::{Error, Result},
    models::{
        CommentUpdate, Created, Credentials, NewComment, NewPost, NewTopic, Page, Post,
        PostThread, PostUpdate, SearchResult, Topic, TopicUpdate, User, null_as_empty,
    },
};

const USER_AGENT: &str = concat!("forum-client/", env!("CARGO_PKG_VERSION"));

/// Client for the forum REST API. The backend authenticates with a `token`
/// cookie set on login, so one client keeps one session.
#[derive(Clone, Debug)]
pub struct ForumClient {
    http: reqwest::Client,
    base: Url,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct List<T>(#[serde(deserialize_with = "null_as_empty")] Vec<T>);

// `GET search` answers with a bare list of posts on older backends
#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Posts(#[serde(deserialize_with = "null_as_empty")] Vec<Post>),
    Full(SearchResult),
}

impl ForumClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(config.api_url.as_str(), config.timeout)
    }

    /// `api_url` is the backend origin; requests go to `<api_url>/api/...`.
    pub fn with_timeout(api_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(api_url)?;
        let path = base.path().trim_end_matches('/').to_string();
        if path.ends_with("/api") {
            base.set_path(&format!("{path}/"));
        } else {
            base.set_path(&format!("{path}/api/"));
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(ForumClient { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base.join(path)?;
        tracing::debug!(%method, %url, "Forum API request");
        Ok(self.http.request(method, url))
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp.text().await.unwrap_or_default();
        if status.is_server_error() {
            tracing::warn!(%status, message = %message.trim(), "Forum API request failed");
        } else {
            tracing::debug!(%status, message = %message.trim(), "Forum API rejected request");
        }
        Err(Error::from_status(status, message))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        Ok(self.send(req).await?.json::<T>().await?)
    }

    async fn execute(&self, req: RequestBuilder) -> Result<()> {
        self.send(req).await?;
        Ok(())
    }

    fn with_body<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<RequestBuilder> {
        Ok(self.request(method, path)?.json(body))
    }

    // users

    #[tracing::instrument(skip(self))]
    pub async fn login(&self, username: &str) -> Result<User> {
        let credentials = Credentials::new(username);
        if credentials.username.is_empty() {
            return Err("Username is required".into());
        }
        self.fetch_json(self.with_body(Method::POST, "users/login", &credentials)?)
            .await
    }

    /// Registers a new account. The backend only returns the new id, log in
    /// afterwards to start a session.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, username: &str) -> Result<Created> {
        let credentials = Credentials::new(username);
        credentials.validate_new()?;
        self.fetch_json(self.with_body(Method::POST, "users/register", &credentials)?)
            .await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.fetch_json(self.request(Method::GET, "users/me")?).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.execute(self.request(Method::POST, "users/logout")?)
            .await
    }

    // topics

    /// All topics, or one page of them.
    pub async fn topics(&self, page: Option<Page>) -> Result<Vec<Topic>> {
        let mut req = self.request(Method::GET, "topics")?;
        if let Some(page) = page {
            req = req.query(&page);
        }
        let List(topics) = self.fetch_json(req).await?;
        Ok(topics)
    }

    pub async fn topic(&self, id: i64) -> Result<Topic> {
        self.fetch_json(self.request(Method::GET, &format!("topics/{id}"))?)
            .await
    }

    #[tracing::instrument(skip(self, topic), fields(title = %topic.title))]
    pub async fn create_topic(&self, topic: &NewTopic) -> Result<Created> {
        let mut topic = topic.clone();
        topic.validate()?;
        self.fetch_json(self.with_body(Method::POST, "topics", &topic)?)
            .await
    }

    pub async fn update_topic(&self, id: i64, update: &TopicUpdate) -> Result<()> {
        let mut update = update.clone();
        update.validate()?;
        self.execute(self.with_body(Method::PUT, &format!("topics/{id}"), &update)?)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_topic(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::DELETE, &format!("topics/{id}"))?)
            .await
    }

    // posts

    pub async fn posts_by_topic(&self, topic_id: i64) -> Result<Vec<Post>> {
        let List(posts) = self
            .fetch_json(self.request(Method::GET, &format!("topics/{topic_id}/posts"))?)
            .await?;
        Ok(posts)
    }

    pub async fn posts(&self) -> Result<Vec<Post>> {
        let List(posts) = self.fetch_json(self.request(Method::GET, "posts")?).await?;
        Ok(posts)
    }

    pub async fn post(&self, id: i64) -> Result<Post> {
        self.fetch_json(self.request(Method::GET, &format!("posts/{id}"))?)
            .await
    }

    #[tracing::instrument(skip(self, post), fields(topic_id = post.topic_id))]
    pub async fn create_post(&self, post: &NewPost) -> Result<Created> {
        let mut post = post.clone();
        post.validate()?;
        self.fetch_json(self.with_body(Method::POST, "posts", &post)?)
            .await
    }

    pub async fn update_post(&self, id: i64, update: &PostUpdate) -> Result<()> {
        let mut update = update.clone();
        update.validate()?;
        self.execute(self.with_body(Method::PUT, &format!("posts/{id}"), &update)?)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_post(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::DELETE, &format!("posts/{id}"))?)
            .await
    }

    /// Toggles the current user's like on a post.
    pub async fn like_post(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::POST, &format!("posts/{id}/like"))?)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err("Search query must not be empty".into());
        }

        let req = self.request(Method::GET, "search")?.query(&[("q", query)]);
        Ok(match self.fetch_json::<SearchResponse>(req).await? {
            SearchResponse::Posts(posts) => SearchResult {
                posts,
                topics: vec![],
            },
            SearchResponse::Full(result) => result,
        })
    }

    // comments

    pub async fn comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let List(comments) = self
            .fetch_json(self.request(Method::GET, &format!("posts/{post_id}/comments"))?)
            .await?;
        Ok(comments)
    }

    /// Comments of a post, nested into reply threads.
    pub async fn comment_thread(&self, post_id: i64) -> Result<Vec<CommentNode>> {
        let comments = self.comments(post_id).await?;
        Ok(build_comment_tree(&comments))
    }

    /// Everything a post page needs, fetched in parallel.
    #[tracing::instrument(skip(self))]
    pub async fn post_thread(&self, post_id: i64) -> Result<PostThread> {
        let (post, comments) = tokio::try_join!(self.post(post_id), self.comments(post_id))?;
        tracing::debug!(comments = comments.len(), "Loaded post thread");
        Ok(PostThread { post, comments })
    }

    pub async fn comment(&self, id: i64) -> Result<Comment> {
        self.fetch_json(self.request(Method::GET, &format!("comments/{id}"))?)
            .await
    }

    #[tracing::instrument(skip(self, comment), fields(post_id = comment.post_id, parent_id = ?comment.parent_id))]
    pub async fn create_comment(&self, comment: &NewComment) -> Result<Created> {
        let mut comment = comment.clone();
        comment.validate()?;
        self.fetch_json(self.with_body(Method::POST, "comments", &comment)?)
            .await
    }

    pub async fn update_comment(&self, id: i64, update: &CommentUpdate) -> Result<()> {
        let mut update = update.clone();
        update.validate()?;
        self.execute(self.with_body(Method::PUT, &format!("comments/{id}"), &update)?)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_comment(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::DELETE, &format!("comments/{id}"))?)
            .await
    }

    /// Toggles the current user's like on a comment.
    pub async fn like_comment(&self, id: i64) -> Result<()> {
        self.execute(self.request(Method::POST, &format!("comments/{id}/like"))?)
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn client(url: &str) -> ForumClient {
        ForumClient::with_timeout(url, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_base_url_gets_api_prefix() {
        assert_eq!(client("http://localhost:8080").base_url().as_str(), "http://localhost:8080/api/");
        assert_eq!(client("http://localhost:8080/").base_url().as_str(), "http://localhost:8080/api/");
        assert_eq!(
            client("https://example.com/forum").base_url().as_str(),
            "https://example.com/forum/api/"
        );
        assert_eq!(
            client("https://example.com/api/").base_url().as_str(),
            "https://example.com/api/"
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = ForumClient::with_timeout("::not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_blank_search_is_rejected_locally() {
        // nothing listens here, the query must never be sent
        let err = client("http://127.0.0.1:9").search("   ").await.unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }
}
