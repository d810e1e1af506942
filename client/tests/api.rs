use std::time::Duration;

use forum_client::{
    Error, ForumClient, ParentRef, Session,
    comment::{count_nodes, flatten},
    models::{CommentUpdate, NewComment, Page},
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ForumClient {
    ForumClient::with_timeout(&server.uri(), Duration::from_secs(5)).expect("client should build")
}

fn comment_json(id: i64, parent: Option<i64>) -> Value {
    json!({
        "id": id,
        "content": format!("comment {id}"),
        "likes": 0,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z",
        "post_id": 7,
        "user_id": 1,
        "deleted": false,
        "parent_comment_id": {"Int64": parent.unwrap_or(0), "Valid": parent.is_some()},
        "liked_by_user": false,
        "created_by_username": "reader01"
    })
}

fn user_json() -> Value {
    json!({"id": 3, "username": "someone1", "created_at": "2024-01-01T00:00:00Z"})
}

#[tokio::test]
async fn comment_thread_nests_replies_listed_before_parents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts/7/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            comment_json(3, Some(2)),
            comment_json(2, Some(1)),
            comment_json(4, Some(99)),
            comment_json(1, None),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let tree = client(&server).comment_thread(7).await.unwrap();

    assert_eq!(count_nodes(&tree), 4);
    let flat: Vec<(usize, i64)> = flatten(&tree).into_iter().map(|(d, c)| (d, c.id)).collect();
    assert_eq!(flat, vec![(0, 4), (0, 1), (1, 2), (2, 3)]);
    assert_eq!(tree[1].children[0].comment.parent_comment_id, ParentRef::to(1));
}

#[tokio::test]
async fn null_comment_list_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts/1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("null\n", "application/json"))
        .mount(&server)
        .await;

    let tree = client(&server).comment_thread(1).await.unwrap();
    assert!(tree.is_empty());
}

#[tokio::test]
async fn login_cookie_is_sent_on_later_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(body_json(json!({"username": "someone1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "token=abc123; Path=/; HttpOnly")
                .set_body_json(user_json()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("cookie", "token=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::new(client(&server));
    let user = session.login(" someone1 ").await.unwrap();
    assert_eq!(user.id, 3);

    let restored = session.restore().await.unwrap();
    assert_eq!(restored.map(|u| u.username.as_str()), Some("someone1"));
}

#[tokio::test]
async fn restore_without_session_is_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let mut session = Session::new(client(&server));
    assert!(session.restore().await.unwrap().is_none());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn reply_posts_parent_id_and_author() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/comments"))
        .and(body_json(json!({
            "post_id": 7,
            "user_id": 3,
            "content": "agreed",
            "parent_id": 2
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::new(client(&server));
    session.login("someone1").await.unwrap();
    let created = session.reply(7, "  agreed ", Some(2)).await.unwrap();
    assert_eq!(created.id, 42);
}

#[tokio::test]
async fn invalid_comment_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .create_comment(&NewComment {
            post_id: 1,
            user_id: 1,
            content: "   ".into(),
            parent_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Invalid("No content provided")));
}

#[tokio::test]
async fn search_accepts_bare_post_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "borrow checker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 5,
            "title": "Fighting the borrow checker",
            "content": "help",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z",
            "topic_id": 1,
            "user_id": 2,
            "created_by_username": "newbie01"
        }])))
        .mount(&server)
        .await;

    let result = client(&server).search(" borrow checker ").await.unwrap();
    assert_eq!(result.posts.len(), 1);
    assert!(result.topics.is_empty());
}

#[tokio::test]
async fn search_accepts_posts_and_topics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": null,
            "topics": [{
                "id": 1,
                "title": "Rust",
                "description": "crabs",
                "created_at": "2024-05-01T10:00:00Z",
                "created_by": 2,
                "created_by_username": "ferris_fan",
                "post_count": 3
            }]
        })))
        .mount(&server)
        .await;

    let result = client(&server).search("rust").await.unwrap();
    assert!(result.posts.is_empty());
    assert_eq!(result.topics[0].post_count, 3);
}

#[tokio::test]
async fn topics_are_paginated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/topics"))
        .and(query_param("size", "10"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let topics = client(&server)
        .topics(Some(Page::first(10).next().next()))
        .await
        .unwrap();
    assert!(topics.is_empty());
}

#[tokio::test]
async fn like_and_edit_hit_comment_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/comments/9/like"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/comments/9"))
        .and(body_json(json!({"content": "fixed typo"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.like_comment(9).await.unwrap();
    client
        .update_comment(9, &CommentUpdate {
            content: "fixed typo ".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn error_statuses_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Post not found\n"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/comments/5"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string("Not allowed to delete comments other than your own!"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/topics/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Error fetching topic"))
        .mount(&server)
        .await;

    let client = client(&server);

    match client.post(404).await.unwrap_err() {
        Error::NotFound(msg) => assert_eq!(msg, "Post not found"),
        e => panic!("unexpected error {e:?}"),
    }

    match client.delete_comment(5).await.unwrap_err() {
        Error::Status { status, .. } => assert_eq!(status.as_u16(), 403),
        e => panic!("unexpected error {e:?}"),
    }

    assert!(matches!(
        client.topic(1).await.unwrap_err(),
        Error::Status { status, .. } if status.is_server_error()
    ));
}

#[tokio::test]
async fn post_thread_loads_post_and_comments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "title": "Threads",
            "content": "Discuss",
            "likes": 2,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z",
            "topic_id": 1,
            "user_id": 2,
            "created_by_username": "writer01",
            "liked_by_user": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/posts/7/comments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([comment_json(2, Some(1)), comment_json(1, None)])),
        )
        .mount(&server)
        .await;

    let mut thread = client(&server).post_thread(7).await.unwrap();
    assert_eq!(thread.post.likes, 2);

    thread.post.toggle_like();
    assert_eq!(thread.post.likes, 1);
    assert!(!thread.post.liked_by_user);

    forum_client::comment::apply_like(&mut thread.comments, 2);
    let tree = thread.tree(None);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].children[0].comment.likes, 1);
}
