//! Engagement, posting frequency, and recency.

use infl_core::Post;

use crate::stats::mean;

const SECONDS_PER_DAY: i64 = 86_400;

/// `(likes + comments) * 100 / followers`; `0` for an account without
/// followers. A missing count contributes `0`.
#[must_use]
pub fn engagement_rate(likes: Option<u64>, comments: Option<u64>, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let interactions = likes.unwrap_or(0).saturating_add(comments.unwrap_or(0)) as f64;
    #[allow(clippy::cast_precision_loss)]
    let followers = followers as f64;
    interactions * (100.0 / followers)
}

/// Aggregates over the posts that carry a usable timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementSummary {
    /// Posts that contributed an engagement sample.
    pub samples: usize,
    pub engagement: Option<f64>,
    /// Seconds since the newest post.
    pub lastpost: Option<i64>,
    /// Posts per day since the oldest post.
    pub frequency: Option<f64>,
}

/// Only positive timestamps count; the store uses `0` or `NULL` for
/// unknown post dates.
fn valid_timestamp(post: &Post) -> Option<i64> {
    post.timestamp.filter(|ts| *ts > 0)
}

/// Summarises `posts` as seen at `now` (unix seconds).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize<'a, I>(posts: I, followers: u64, now: i64) -> EngagementSummary
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut rates = Vec::new();
    let mut newest: Option<i64> = None;
    let mut oldest: Option<i64> = None;

    for post in posts {
        let Some(ts) = valid_timestamp(post) else {
            continue;
        };
        rates.push(engagement_rate(post.like_count, post.comment_count, followers));
        newest = Some(newest.map_or(ts, |n| n.max(ts)));
        oldest = Some(oldest.map_or(ts, |o| o.min(ts)));
    }

    let frequency = oldest.map(|o| {
        let days = ((now - o) / SECONDS_PER_DAY).max(1);
        rates.len() as f64 / days as f64
    });

    EngagementSummary {
        samples: rates.len(),
        engagement: mean(&rates),
        lastpost: newest.map(|n| now - n),
        frequency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(ts: Option<i64>, likes: Option<u64>, comments: Option<u64>) -> Post {
        Post {
            id: "p".to_owned(),
            owner: "u".to_owned(),
            timestamp: ts,
            like_count: likes,
            comment_count: comments,
            caption: None,
            tagged_users: Vec::new(),
            image: None,
        }
    }

    #[test]
    fn zero_followers_give_zero_rate() {
        assert_eq!(engagement_rate(Some(10), Some(5), 0), 0.0);
    }

    #[test]
    fn rate_handles_each_missing_count() {
        assert!((engagement_rate(Some(10), Some(5), 100) - 15.0).abs() < 1e-12);
        assert!((engagement_rate(Some(10), None, 100) - 10.0).abs() < 1e-12);
        assert!((engagement_rate(None, Some(5), 100) - 5.0).abs() < 1e-12);
        assert_eq!(engagement_rate(None, None, 100), 0.0);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let rate = engagement_rate(Some(u64::MAX), Some(1), 10);
        assert!(rate.is_finite());
        assert!(rate > 0.0);
    }

    #[test]
    fn frequency_divides_by_whole_days() {
        let now = 1_600_000_000;
        let posts: Vec<Post> = (0..10)
            .map(|i| post(Some(now - 5 * SECONDS_PER_DAY + i), None, None))
            .collect();
        let s = summarize(&posts, 100, now);
        assert_eq!(s.frequency, Some(2.0));
    }

    #[test]
    fn frequency_floor_is_one_day() {
        let now = 1_600_000_000;
        let posts = [post(Some(now - 60), None, None), post(Some(now - 30), None, None)];
        assert_eq!(summarize(&posts, 100, now).frequency, Some(2.0));
    }

    #[test]
    fn engagement_is_mean_rate_and_lastpost_is_age_of_newest() {
        let now = 1_600_000_000;
        let posts = [
            post(Some(now - 7_200), Some(10), Some(2)),
            post(Some(now - 3_600), Some(20), Some(3)),
        ];
        let s = summarize(&posts, 100, now);
        assert_eq!(s.samples, 2);
        assert!((s.engagement.unwrap() - 17.5).abs() < 1e-12);
        assert_eq!(s.lastpost, Some(3_600));
    }

    #[test]
    fn posts_without_timestamp_are_ignored() {
        let now = 1_600_000_000;
        let posts = [post(None, Some(50), None), post(Some(0), Some(50), None)];
        let s = summarize(&posts, 100, now);
        assert_eq!(s.samples, 0);
        assert_eq!(s.engagement, None);
        assert_eq!(s.lastpost, None);
        assert_eq!(s.frequency, None);
    }
}
