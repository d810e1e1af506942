//! Plain-text rendering of forum content for the terminal.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::{
    comment::{Comment, CommentNode, flatten},
    date::{format_date, time_ago},
    models::{Post, SearchResult, Topic},
    utils::{pluralize, readable_count},
};

const INDENT: &str = "  ";

fn byline(author: &str, created_at: DateTime<Utc>, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let (verb, at) = if updated_at != created_at {
        ("Updated", updated_at)
    } else {
        ("Posted", created_at)
    };
    format!(
        "{verb} by • {author} • {} (on {})",
        time_ago(at, now),
        format_date(at)
    )
}

fn likes(count: i64, liked: bool) -> String {
    let heart = if liked { "♥" } else { "♡" };
    let label = if count == 1 { "Like" } else { "Likes" };
    format!("{heart} {} {label}", readable_count(count))
}

/// Renders a single comment, one line per entry, without indentation.
pub fn render_comment(comment: &Comment, now: DateTime<Utc>) -> Vec<String> {
    let shown = comment.tombstone();
    let mut lines = vec![format!("#{} {}", shown.id, shown.content)];

    if !shown.deleted {
        lines.push(byline(
            &shown.created_by_username,
            shown.created_at,
            shown.updated_at,
            now,
        ));
    }
    lines.push(likes(shown.likes, shown.liked_by_user));

    lines
}

/// Renders a reply forest, indenting each reply one level under its parent.
pub fn render_thread(nodes: &[CommentNode], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for (depth, comment) in flatten(nodes) {
        let indent = INDENT.repeat(depth);
        for line in render_comment(comment, now) {
            let _ = writeln!(out, "{indent}{line}");
        }
    }
    out
}

pub fn render_post(post: &Post, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", post.title);
    if let Some(topic) = &post.topic_title {
        let _ = writeln!(out, "in {topic}");
    }
    let _ = writeln!(
        out,
        "{}",
        byline(&post.created_by_username, post.created_at, post.updated_at, now)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", post.content);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", likes(post.likes, post.liked_by_user));
    out
}

pub fn render_topic(topic: &Topic, now: DateTime<Utc>) -> String {
    format!(
        "[{}] {} ({})\n{}{}\n{}created by {} {}\n",
        topic.id,
        topic.title,
        pluralize(topic.post_count, "post", "posts"),
        INDENT,
        topic.description,
        INDENT,
        topic.created_by_username,
        time_ago(topic.created_at, now),
    )
}

pub fn render_post_summary(post: &Post, now: DateTime<Utc>) -> String {
    format!(
        "[{}] {} by {} {} ({})\n",
        post.id,
        post.title,
        post.created_by_username,
        time_ago(post.created_at, now),
        likes(post.likes, post.liked_by_user),
    )
}

pub fn render_search(result: &SearchResult, now: DateTime<Utc>) -> String {
    if result.is_empty() {
        return "No results found.\n".into();
    }

    let mut out = String::new();
    if !result.topics.is_empty() {
        let _ = writeln!(out, "Topics");
        for topic in &result.topics {
            out.push_str(&render_topic(topic, now));
        }
    }
    if !result.posts.is_empty() {
        let _ = writeln!(out, "Posts");
        for post in &result.posts {
            out.push_str(&render_post_summary(post, now));
        }
    }
    out
}
