mod research;
mod stages;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "adlens")]
#[command(about = "adlens command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a competitor research pass and store the results.
    Research {
        #[arg(long)]
        client: String,
        #[arg(long)]
        product: String,
        #[arg(long, default_value = "")]
        market: String,
        /// Attach web-search grounding and per-competitor context.
        #[arg(long)]
        grounded: bool,
    },
    /// Replace an ad account's configured funnel-stage order.
    Stages {
        #[arg(long)]
        account: String,
        /// Comma-separated stage names, in funnel order.
        #[arg(long)]
        set: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Research {
            client,
            product,
            market,
            grounded,
        } => research::run(&client, &product, &market, grounded).await,
        Commands::Stages { account, set } => stages::run(&account, &set).await,
    }
}
