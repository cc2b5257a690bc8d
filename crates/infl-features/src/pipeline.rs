//! Per-user feature extraction.

use infl_core::DataSource;

use crate::brand::summarize_brands;
use crate::comment::{aggregate_comment_scores, CommentScorer};
use crate::engagement::summarize;
use crate::error::FeatureError;
use crate::types::UserFeatures;
use crate::visual::{ImageAnalyzer, ImageOutcome};

/// Fewest timestamped posts a user needs for a meaningful engagement mean.
pub const MIN_ENGAGEMENT_SAMPLES: usize = 2;

/// Extract every feature for `username` as seen at `now` (unix seconds).
///
/// 1. Fetch the profile, posts, and comments through `source`.
/// 2. Summarise engagement; bail out early on too few samples.
/// 3. Score comments (owner replies excluded) and the biography.
/// 4. Analyse each post image; failures are logged and skipped.
/// 5. Detect brand mentions and look up their categories.
///
/// Nothing is carried between calls.
///
/// # Errors
///
/// - [`FeatureError::Source`] if the user cannot be fetched.
/// - [`FeatureError::InsufficientData`] with fewer than
///   [`MIN_ENGAGEMENT_SAMPLES`] timestamped posts.
pub async fn extract_user_features<S: DataSource>(
    source: &S,
    scorer: &CommentScorer,
    username: &str,
    now: i64,
) -> Result<UserFeatures, FeatureError> {
    let activity = source.fetch_user(username).await?;
    let profile = &activity.profile;

    let engagement = summarize(activity.iter_posts(), profile.followers, now);
    if engagement.samples < MIN_ENGAGEMENT_SAMPLES {
        return Err(FeatureError::InsufficientData {
            username: username.to_owned(),
            samples: engagement.samples,
            required: MIN_ENGAGEMENT_SAMPLES,
        });
    }

    let comment_scores = scorer.score_posts(&activity.posts);
    let biography_score = profile
        .biography
        .as_deref()
        .map_or(0.0, |bio| scorer.score(bio));

    let analyzer = ImageAnalyzer::default();
    let mut outcomes = Vec::with_capacity(activity.posts.len());
    for post in activity.iter_posts() {
        let outcome = analyzer.analyze_post(source, post).await;
        if let ImageOutcome::Failed(reason) = &outcome {
            tracing::warn!(username, post_id = %post.id, %reason, "skipping post image");
        }
        outcomes.push(outcome);
    }
    let visual = analyzer.summarize(&outcomes);

    let brands = summarize_brands(source, activity.iter_posts()).await;

    let features = UserFeatures {
        username: profile.username.clone(),
        label: profile.label,
        commentscore: aggregate_comment_scores(&comment_scores),
        engagement: engagement.engagement.unwrap_or(0.0),
        followers: profile.followers,
        followings: profile.followings,
        nmedias: profile.media_count,
        lastpost: engagement.lastpost.unwrap_or(0),
        usermentions: profile.usertags_count,
        colorfulness_std: visual.colorfulness_std,
        color_distorsion: visual.color_distorsion,
        contrast_std: visual.contrast_std,
        frequency: engagement.frequency.unwrap_or(0.0),
        biography_score,
        colors_dispersion: visual.colors_dispersion,
        brands,
        comments_scored: comment_scores.len(),
        images_analyzed: visual.analyzed,
        images_failed: visual.failed,
    };

    tracing::info!(
        username,
        posts = activity.posts.len(),
        comments = features.comments_scored,
        images = features.images_analyzed,
        engagement = features.engagement,
        "extracted user features"
    );
    Ok(features)
}
