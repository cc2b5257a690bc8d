//! `build-cache` and `export`.

use chrono::Utc;
use infl_core::AppConfig;
use infl_features::{extract_user_features, FeatureCache};

use crate::model::{connect_store, load_scorer};

/// Extract every labeled archived user into the feature cache.
///
/// Users already cached are skipped. The cache is saved after each new
/// user, so an interrupted run keeps its progress. Per-user failures are
/// logged and skipped.
///
/// # Errors
///
/// Returns an error if the store, the word model, or the cache file is
/// unavailable.
pub(crate) async fn run_build_cache(config: &AppConfig, limit: Option<i64>) -> anyhow::Result<()> {
    let store = connect_store(config).await?;
    let scorer = load_scorer(config).await?;
    let mut cache = FeatureCache::load(&config.users_cache_path)?;

    let usernames = infl_db::list_usernames(store.pool(), limit, true).await?;
    let total = usernames.len();
    let mut added = 0usize;
    let mut skipped = 0usize;
    let mut unavailable = 0usize;
    let mut failed = 0usize;

    for (i, username) in usernames.iter().enumerate() {
        if cache.contains(username) {
            tracing::debug!(username = %username, "already cached");
            skipped += 1;
            continue;
        }

        let now = Utc::now().timestamp();
        let features = match extract_user_features(&store, &scorer, username, now).await {
            Ok(f) => f,
            Err(e) if e.is_user_unavailable() => {
                tracing::info!(username = %username, error = %e, "account unavailable, skipping");
                unavailable += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "extraction failed, skipping");
                failed += 1;
                continue;
            }
        };
        if let Err(e) = features.vector() {
            tracing::warn!(username = %username, error = %e, "incomplete vector, skipping");
            failed += 1;
            continue;
        }

        cache.insert(features);
        cache.save()?;
        added += 1;
        tracing::info!(username = %username, progress = i + 1, total, "cached user");
    }

    println!(
        "build-cache complete: {added} added, {skipped} already cached, {unavailable} unavailable, {failed} failed ({} total in {})",
        cache.len(),
        cache.path().display()
    );
    Ok(())
}

/// Print one JSON object per cached user: username, label, vector.
///
/// # Errors
///
/// Returns an error if the cache cannot be read.
pub(crate) fn run_export(config: &AppConfig) -> anyhow::Result<()> {
    let cache = FeatureCache::load(&config.users_cache_path)?;
    for row in cache.vectors() {
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}
