//! `extract`: one account, live or archived.

use chrono::Utc;
use infl_api::LiveSource;
use infl_core::AppConfig;
use infl_features::{extract_user_features, UserFeatures};

use crate::display::{format_count, format_elapsed};
use crate::model::{connect_store, load_scorer};
use crate::SourceKind;

/// Extract `username` and print a summary plus the feature vector.
///
/// # Errors
///
/// Returns an error if the user cannot be extracted or the vector is
/// incomplete. The summary is still printed in the latter case.
pub(crate) async fn run_extract(
    config: &AppConfig,
    username: &str,
    source: SourceKind,
    json: bool,
) -> anyhow::Result<()> {
    let scorer = load_scorer(config).await?;
    let now = Utc::now().timestamp();

    let features = match source {
        SourceKind::Live => {
            let live = LiveSource::from_config(config)?;
            extract_user_features(&live, &scorer, username, now).await?
        }
        SourceKind::Store => {
            let store = connect_store(config).await?;
            extract_user_features(&store, &scorer, username, now).await?
        }
    };

    let vector = features.vector();
    if json {
        let payload = serde_json::json!({
            "features": &features,
            "vector": vector.as_ref().ok(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_summary(&features);
        if let Ok(v) = &vector {
            println!("vector:");
            for (name, value) in v.named() {
                println!("  {name:<18} {value}");
            }
        }
    }

    vector.map(|_| ()).map_err(Into::into)
}

fn print_summary(f: &UserFeatures) {
    println!("{}", f.username);
    println!("  followers          {}", format_count(f.followers));
    println!("  followings         {}", format_count(f.followings));
    println!("  medias             {}", format_count(f.nmedias));
    println!("  user mentions      {}", format_count(f.usermentions));
    println!("  engagement         {:.2}%", f.engagement);
    println!("  frequency          {:.2} posts/day", f.frequency);
    println!("  last post          {} ago", format_elapsed(f.lastpost));
    println!(
        "  comment score      {:.4} ({} comments)",
        f.commentscore, f.comments_scored
    );
    println!("  biography score    {:.4}", f.biography_score);
    println!(
        "  images             {} analyzed, {} failed",
        f.images_analyzed, f.images_failed
    );
    match f.color_distorsion {
        Some(d) => println!("  color distortion   {d:.4}"),
        None => println!("  color distortion   unavailable"),
    }
    if let Some(d) = f.colors_dispersion {
        println!("  color dispersion   {d:.4}");
    }
    if f.brands.brands.is_empty() {
        println!("  brands             none");
    } else {
        println!("  brands             {}", f.brands.brands.join(", "));
        for (category, count) in &f.brands.types {
            println!("    {category}: {count}");
        }
        if f.brands.failed_lookups > 0 {
            println!("    ({} category lookups failed)", f.brands.failed_lookups);
        }
    }
}
