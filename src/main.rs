use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use pricefind::api;
use pricefind::catalog::Catalog;
use pricefind::client::{HttpClient, PriceApi};
use pricefind::config::{CONFIG, Config};
use pricefind::render;
use pricefind::search_client::{SearchClient, SearchState, Tab};

#[derive(Parser, Debug)]
#[command(name = "pricefind", version, about = "Search product prices across e-commerce sites")]
struct Cli {
    /// Base URL of the price backend
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one search and print the results
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Prompt for queries until `:quit`
    Interactive,
    /// Show backend health
    Health,
    /// List the sites the backend searches
    Sites,
    /// Run the demo backend
    Serve {
        #[arg(long)]
        addr: Option<String>,
        /// Artificial extraction delay
        #[arg(long)]
        latency_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::clone(&CONFIG);
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Search { query } => run_search(&config, &query.join(" ")).await,
        Command::Interactive => {
            run_interactive(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => {
            let client = HttpClient::from_config(&config)?;
            let report = client
                .health()
                .await
                .with_context(|| format!("Health check against {} failed", client.base_url()))?;
            println!("{}", render::render_health(&report));
            Ok(ExitCode::SUCCESS)
        }
        Command::Sites => {
            let client = HttpClient::from_config(&config)?;
            let sites = client
                .sites()
                .await
                .with_context(|| format!("Listing sites from {} failed", client.base_url()))?;
            println!("{}", render::render_sites(&sites));
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { addr, latency_ms } => {
            let addr = addr.unwrap_or_else(|| config.bind_addr.clone());
            let latency = latency_ms
                .map(Duration::from_millis)
                .unwrap_or(config.demo_latency);
            api::serve(&addr, Arc::new(Catalog::new(latency))).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_search(config: &Config, query: &str) -> anyhow::Result<ExitCode> {
    let mut client = SearchClient::from_config(HttpClient::from_config(config)?, config);
    client.set_query(query);
    if !client.can_submit() {
        anyhow::bail!("Query cannot be empty");
    }

    client.search().await;
    println!("{}", render::render_notifications(client.notifications()));
    if let Some(response) = client.current_response() {
        println!();
        println!("{}", render::render_results(response));
    }

    match client.state() {
        SearchState::Failed { .. } => Ok(ExitCode::FAILURE),
        _ => Ok(ExitCode::SUCCESS),
    }
}

async fn run_interactive(config: &Config) -> anyhow::Result<()> {
    let mut client = SearchClient::from_config(HttpClient::from_config(config)?, config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        client.tick(Instant::now());
        let view = render::render_view(&client);
        stdout
            .write_all(format!("{view}\n\nquery (:search, :dashboard, :quit)> ").as_bytes())
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            ":quit" | ":q" => break,
            ":dashboard" => client.select_tab(Tab::Dashboard),
            ":search" => client.select_tab(Tab::Search),
            _ => {
                client.select_tab(Tab::Search);
                client.set_query(line.as_str());
                let Some((ticket, request)) = client.begin_search() else {
                    continue;
                };
                stdout
                    .write_all(format!("{}\n", render::render_view(&client)).as_bytes())
                    .await?;
                stdout.flush().await?;
                let result = client.api().search(&request).await;
                client.finish_search(ticket, result);
            }
        }
    }
    Ok(())
}
