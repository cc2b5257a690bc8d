//! Word model commands and the scorer shared by extraction commands.

use std::sync::Arc;

use infl_core::{AppConfig, SourceError};
use infl_db::StoreSource;
use infl_features::{CommentScorer, WordModelStore};

/// Connect to the archived store.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the connection fails.
pub(crate) async fn connect_store(config: &AppConfig) -> anyhow::Result<StoreSource> {
    let pool = infl_db::connect_pool_from_config(config).await?;
    Ok(StoreSource::new(pool))
}

/// Load the word model, building it from the store corpus on first use.
///
/// # Errors
///
/// Returns an error if the artifact is corrupt or has to be built and the
/// store is unreachable.
pub(crate) async fn load_scorer(config: &AppConfig) -> anyhow::Result<CommentScorer> {
    let store = WordModelStore::new(&config.comments_model_path);
    let model = store
        .load_or_build(|| async {
            let source = infl_db::connect_pool_from_config(config)
                .await
                .map(StoreSource::new)
                .map_err(|e| SourceError::Store(e.to_string()))?;
            source.comment_corpus().await
        })
        .await?;
    Ok(CommentScorer::new(Arc::new(model), config.scoring))
}

/// Build the word model from every comment in the store.
///
/// Without `force`, an existing artifact is left untouched.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the artifact cannot be
/// written.
pub(crate) async fn run_build_model(config: &AppConfig, force: bool) -> anyhow::Result<()> {
    let store = WordModelStore::new(&config.comments_model_path);
    if store.exists() && !force {
        println!(
            "word model already exists at {}; pass --force to rebuild",
            store.path().display()
        );
        return Ok(());
    }

    let source = connect_store(config).await?;
    let corpus = source.comment_corpus().await?;
    let model = store.rebuild(&corpus)?;
    println!(
        "built word model: {} tokens from {} comments -> {}",
        model.len(),
        corpus.len(),
        store.path().display()
    );
    Ok(())
}

/// Print the score of one comment and the rarity of each of its words.
///
/// # Errors
///
/// Returns an error if the word model cannot be loaded.
pub(crate) async fn run_score_comment(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let scorer = load_scorer(config).await?;
    let words = scorer.word_scores(text);
    println!("score: {:.4}", scorer.score(text));
    println!(
        "word scores: [{}]",
        words
            .iter()
            .map(|s| format!("{s:.4}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
