//! Funnel-stage configuration from the terminal.

pub async fn run(account: &str, set: &str) -> anyhow::Result<()> {
    let stages: Vec<String> = set
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    anyhow::ensure!(!stages.is_empty(), "--set must name at least one stage");

    let config = adlens_core::load_app_config_from_env()?;
    let pool_config = adlens_db::PoolConfig::from_app_config(&config);
    let pool = adlens_db::connect_pool(&config.database_url, pool_config).await?;
    adlens_db::run_migrations(&pool).await?;

    adlens_db::replace_stages_for_account(&pool, account, &stages).await?;

    println!("configured {} stages for account {account}", stages.len());
    for (position, stage) in stages.iter().enumerate() {
        println!("  {position}. {stage}");
    }

    Ok(())
}
