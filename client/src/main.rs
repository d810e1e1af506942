use clap::Parser;
use forum_client::{ClientConfig, config::Env};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

fn init_tracing(env: &Env) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout is for forum content, logs go to stderr
    match env {
        Env::Production => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        Env::Dev | Env::Staging => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = cli::Cli::parse();
    let config = ClientConfig::new_from_env()?;
    init_tracing(&config.env);

    cli::run(cli, config).await
}
