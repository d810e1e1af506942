use chrono::Utc;
use clap::{Parser, Subcommand};
use eyre::OptionExt;
use forum_client::{
    ClientConfig, ForumClient, Session, SortType,
    comment::count_nodes,
    models::Page,
    render::{render_post, render_post_summary, render_search, render_thread, render_topic},
    utils::pluralize,
};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "forum", version, about = "Browse and post to the forum from the terminal")]
pub struct Cli {
    /// Backend origin, overrides `FORUM_API_URL`
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Username to log in with, overrides `FORUM_USERNAME`
    #[arg(long, short, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List topics
    Topics {
        /// Page size, lists every topic when omitted
        #[arg(long)]
        size: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show a topic and its posts
    Topic { id: i64 },
    /// Show a post and its comment threads
    Post {
        id: i64,
        #[arg(long, default_value = "best")]
        sort: SortType,
    },
    /// Search posts and topics
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    Register { username: String },
    NewTopic { title: String, description: String },
    NewPost {
        topic_id: i64,
        title: String,
        content: String,
    },
    /// Comment on a post, or reply to a comment
    Comment {
        post_id: i64,
        content: String,
        #[arg(long)]
        reply_to: Option<i64>,
    },
    EditComment { id: i64, content: String },
    DeleteComment { id: i64 },
    LikeComment { id: i64 },
    LikePost { id: i64 },
    DeletePost { id: i64 },
}

impl Command {
    fn needs_login(&self) -> bool {
        !matches!(
            self,
            Command::Topics { .. }
                | Command::Topic { .. }
                | Command::Post { .. }
                | Command::Search { .. }
                | Command::Register { .. }
        )
    }
}

async fn login(session: &mut Session, config: &ClientConfig) -> eyre::Result<()> {
    let username = config
        .username
        .as_deref()
        .ok_or_eyre("This command needs a user, pass --user or set FORUM_USERNAME")?;
    session.login(username).await?;
    Ok(())
}

pub async fn run(cli: Cli, mut config: ClientConfig) -> eyre::Result<()> {
    if let Some(url) = cli.api_url {
        config.api_url = Url::parse(&url)?;
    }
    if cli.user.is_some() {
        config.username = cli.user;
    }

    let mut session = Session::new(ForumClient::new(&config)?);
    let command = cli.command;

    // viewing a post works logged out, but likes are only known per user
    let wants_login = config.username.is_some() && matches!(command, Command::Post { .. });
    if command.needs_login() || wants_login {
        login(&mut session, &config).await?;
    }

    let client = session.client().clone();
    let now = Utc::now();

    match command {
        Command::Topics { size, offset } => {
            let page = size.map(|size| Page { size, offset });
            let topics = client.topics(page).await?;
            if topics.is_empty() {
                println!("No topics yet.");
            }
            for topic in &topics {
                print!("{}", render_topic(topic, now));
            }
            if let Some(page) = page.filter(|p| topics.len() == p.size as usize) {
                let next = page.next();
                println!("More: --size {} --offset {}", next.size, next.offset);
            }
        }
        Command::Topic { id } => {
            let (topic, posts) = tokio::try_join!(client.topic(id), client.posts_by_topic(id))?;
            print!("{}", render_topic(&topic, now));
            println!();
            for post in &posts {
                print!("{}", render_post_summary(post, now));
            }
        }
        Command::Post { id, sort } => {
            let thread = client.post_thread(id).await?;
            let tree = thread.tree(Some(sort));

            print!("{}", render_post(&thread.post, now));
            println!();
            println!("{}", pluralize(count_nodes(&tree) as i64, "comment", "comments"));
            print!("{}", render_thread(&tree, now));
        }
        Command::Search { query } => {
            let result = client.search(&query.join(" ")).await?;
            print!("{}", render_search(&result, now));
        }
        Command::Register { username } => {
            let created = client.register(&username).await?;
            println!("Registered `{}` (user #{}), log in with --user", username.trim(), created.id);
        }
        Command::NewTopic { title, description } => {
            let created = session.new_topic(&title, &description).await?;
            println!("Created topic #{}", created.id);
        }
        Command::NewPost {
            topic_id,
            title,
            content,
        } => {
            let created = session.new_post(topic_id, &title, &content).await?;
            println!("Created post #{}", created.id);
        }
        Command::Comment {
            post_id,
            content,
            reply_to,
        } => {
            let created = session.reply(post_id, &content, reply_to).await?;
            match reply_to {
                Some(parent) => println!("Replied to comment #{parent} with #{}", created.id),
                None => println!("Commented #{} on post #{post_id}", created.id),
            }
        }
        Command::EditComment { id, content } => {
            session.edit_comment(id, &content).await?;
            println!("Updated comment #{id}");
        }
        Command::DeleteComment { id } => {
            client.delete_comment(id).await?;
            println!("Deleted comment #{id}");
        }
        Command::LikeComment { id } => {
            client.like_comment(id).await?;
            println!("Toggled like on comment #{id}");
        }
        Command::LikePost { id } => {
            let mut post = client.post(id).await?;
            client.like_post(id).await?;
            post.toggle_like();
            let verb = if post.liked_by_user { "Liked" } else { "Unliked" };
            println!("{verb} post #{id}");
        }
        Command::DeletePost { id } => {
            client.delete_post(id).await?;
            println!("Deleted post #{id}");
        }
    }

    Ok(())
}
