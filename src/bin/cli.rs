use clap::{Parser, Subcommand};
use std::sync::Arc;

use ludex_proxy::{
    rank_by_popularity, Config, Enricher, HttpIgdbTransport, HttpSparqlClient, IgdbClient,
    TokenCache,
};

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Ludex proxy debug CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for games
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "10")]
        limit: i64,

        /// Over-fetch and rerank by popularity (type-ahead behavior)
        #[arg(long)]
        suggest: bool,

        /// Use the token-filter clause strategy instead of native search
        #[arg(long)]
        filtered: bool,
    },

    /// Show the fixed recent-games listing
    Recent,

    /// Look up the French Wikidata label for an English title
    Label {
        /// English title, matched exactly
        name_en: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let tokens = Arc::new(TokenCache::new(&config)?);
    let igdb = IgdbClient::new(Arc::new(HttpIgdbTransport::new(&config, tokens)?));
    let enricher = Enricher::new(Arc::new(HttpSparqlClient::new(&config)?));

    match cli.command {
        Commands::Search {
            query,
            limit,
            suggest,
            filtered,
        } => {
            let games = if filtered {
                igdb.search_games_filtered(&query, limit).await?
            } else {
                let results = igdb.search_games(&query, limit, suggest).await?;
                if suggest {
                    rank_by_popularity(results, limit.clamp(1, 50) as usize)
                } else {
                    results
                }
            };

            let enriched = enricher.enrich(games).await;

            println!("{} result(s) for \"{}\"", enriched.len(), query);
            for (i, game) in enriched.iter().enumerate() {
                let fr = game
                    .name_fr
                    .as_deref()
                    .map(|f| format!(" ({})", f))
                    .unwrap_or_default();
                println!("  {}. {}{}", i + 1, game.name_en, fr);
            }
        }

        Commands::Recent => {
            let data = igdb.recent_games().await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        Commands::Label { name_en } => {
            match enricher.single_label(&name_en).await? {
                Some(fr) => println!("{} -> {}", name_en, fr),
                None => println!("{} -> no French label", name_en),
            }
        }
    }

    Ok(())
}
