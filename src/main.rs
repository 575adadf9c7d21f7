use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use portfolio_feed::config::DEFAULT_CORS_PROXIES;
use portfolio_feed::grid::{sort_newest_first, Overlay, ViewState};
use portfolio_feed::{FeedClient, FeedConfig, RetrievalStrategy};

#[derive(Parser)]
#[command(name = "portfolio-feed")]
#[command(about = "Blog posts for the portfolio grid, straight from the feed", long_about = None)]
struct Cli {
    /// How candidate URLs are built from the feed address
    #[arg(long, value_enum, default_value_t = Strategy::Direct, global = true)]
    strategy: Strategy,

    /// Proxy prefix; repeat to build a fallback chain
    #[arg(long = "proxy", global = true)]
    proxies: Vec<String>,

    /// Origin of the local dev server for --strategy dev-proxy
    #[arg(long, default_value = "http://localhost:5173", global = true)]
    dev_origin: String,

    /// Maximum number of posts to keep
    #[arg(long, global = true)]
    max: Option<usize>,

    /// Give up on a single request after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Direct,
    DevProxy,
    CorsProxies,
    ProxyThenDirect,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the post grid, newest first
    Grid {
        #[arg(long)]
        json: bool,
    },
    /// Print one post in full
    Show {
        /// Position in the grid, starting at 0
        #[arg(short, long)]
        index: usize,
        #[arg(short, long, default_value_t = 80)]
        width: usize,
    },
    /// Print the URLs that would be tried, in order
    Candidates,
}

impl Cli {
    fn config(&self) -> FeedConfig {
        let mut proxies = self.proxies.clone();
        if proxies.is_empty() {
            proxies = DEFAULT_CORS_PROXIES.iter().map(|p| p.to_string()).collect();
        }

        let strategy = match self.strategy {
            Strategy::Direct => RetrievalStrategy::Direct,
            Strategy::DevProxy => RetrievalStrategy::DevProxy {
                origin: self.dev_origin.clone(),
            },
            Strategy::CorsProxies => RetrievalStrategy::CorsProxies { proxies },
            Strategy::ProxyThenDirect => RetrievalStrategy::ProxyThenDirect {
                proxy: proxies.remove(0),
            },
        };

        let mut config = FeedConfig::from_env().with_strategy(strategy);
        if let Some(max) = self.max {
            config.max_results = max;
        }
        config.request_timeout = self.timeout_secs.map(Duration::from_secs);
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command {
        Commands::Candidates => {
            for url in config.candidates() {
                println!("{}", url);
            }
        }
        Commands::Grid { json } => {
            let client = FeedClient::from_config(config)?;
            eprintln!("{}", ViewState::Loading);

            let state = ViewState::from_result(client.fetch_posts().await);
            match &state {
                ViewState::Ready(posts) if json => {
                    println!("{}", serde_json::to_string_pretty(posts)?);
                }
                ViewState::Ready(_) => {
                    for (i, card) in state.cards().iter().enumerate() {
                        println!("{:>3}. {}\n", i, card);
                    }
                }
                _ => {
                    eprintln!("{}", state);
                    std::process::exit(1);
                }
            }
        }
        Commands::Show { index, width } => {
            let client = FeedClient::from_config(config)?;
            let mut posts = client.fetch_posts().await?;
            sort_newest_first(&mut posts);

            let post = posts
                .get(index)
                .ok_or_else(|| anyhow!("No post at index {} ({} posts available)", index, posts.len()))?;
            println!("{}", Overlay::from_post(post, width));
        }
    }

    Ok(())
}
