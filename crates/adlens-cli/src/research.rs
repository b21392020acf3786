//! Terminal research runner: the server's research pass without HTTP.

use anyhow::Context;

use adlens_gemini::GeminiClient;
use adlens_insights::{ResearchOutcome, ResearchRequest, Researcher};

/// Creates (or reuses) the run for the client/product pair, executes the
/// research pass, and stores the competitors.
pub async fn run(client: &str, product: &str, market: &str, grounded: bool) -> anyhow::Result<()> {
    let config = adlens_core::load_app_config_from_env()?;
    let pool_config = adlens_db::PoolConfig::from_app_config(&config);
    let pool = adlens_db::connect_pool(&config.database_url, pool_config).await?;
    adlens_db::run_migrations(&pool).await?;

    let api_key = config
        .gemini_api_key
        .as_deref()
        .context("GEMINI_API_KEY is required for research")?;
    let gemini = match config.gemini_base_url.as_deref() {
        Some(base_url) => GeminiClient::with_base_url(api_key, config.gemini_timeout_secs, base_url)?,
        None => GeminiClient::new(api_key, config.gemini_timeout_secs)?,
    }
    .with_model(&config.gemini_model);

    let run = match adlens_db::find_analysis_run(&pool, client, product).await? {
        Some(existing) => {
            tracing::info!(run_id = %existing.id, "reusing existing analysis run");
            existing
        }
        None => adlens_db::create_analysis_run(&pool, client, product, market).await?,
    };

    let researcher = Researcher::new(&gemini, config.research_max_concurrent);
    let request = ResearchRequest {
        client_name: run.client_name.clone(),
        product_focus: run.product_focus.clone(),
        market: run.market.clone(),
        grounded,
    };

    let outcome = researcher.run(&request).await?;
    let report = match outcome {
        ResearchOutcome::Report(report) => report,
        ResearchOutcome::ParseFailure(failure) => {
            anyhow::bail!(
                "research response could not be parsed ({reason}); raw text:\n{raw}",
                reason = failure.reason,
                raw = failure.raw
            );
        }
    };

    adlens_db::replace_competitors(&pool, run.id, &report.competitors).await?;

    println!(
        "stored {count} competitors for run {id}",
        count = report.competitors.len(),
        id = run.id
    );
    for competitor in &report.competitors {
        let grounded_mark = match report.grounding.get(&competitor.name) {
            Some(Some(_)) => " [grounded]",
            Some(None) => " [grounding failed]",
            None => "",
        };
        println!("  - {}{grounded_mark}", competitor.name);
    }

    Ok(())
}
