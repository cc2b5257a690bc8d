//! Brand mentions: accounts both tagged on a post and @-mentioned in its
//! caption.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use infl_core::{DataSource, Post};
use regex::Regex;
use serde::{Deserialize, Serialize};

fn mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@[\w.]+").expect("valid mention regex"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandMentions {
    /// Usernames mentioned and tagged, in caption order.
    Detected(Vec<String>),
    /// No caption, no tags, or no overlap.
    NoSignal,
}

/// Brand activity across all of a user's posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandSummary {
    /// Every detected brand, once per post it appears in.
    pub brands: Vec<String>,
    /// Business category -> number of detected brand mentions in it.
    pub types: BTreeMap<String, usize>,
    /// Category lookups that errored.
    pub failed_lookups: usize,
}

#[must_use]
pub fn detect_brands(post: &Post) -> BrandMentions {
    let Some(caption) = post.caption.as_deref() else {
        return BrandMentions::NoSignal;
    };
    if post.tagged_users.is_empty() {
        return BrandMentions::NoSignal;
    }
    let brands: Vec<String> = mention_regex()
        .find_iter(caption)
        .map(|m| &m.as_str()[1..])
        .filter(|name| post.tagged_users.iter().any(|t| t == name))
        .map(str::to_owned)
        .collect();
    if brands.is_empty() {
        BrandMentions::NoSignal
    } else {
        BrandMentions::Detected(brands)
    }
}

/// Detects brands on every post and counts their business categories.
///
/// Each distinct brand is looked up once. A failed lookup is logged and
/// counted, and the remaining brands are still resolved.
pub async fn summarize_brands<'a, S, I>(source: &S, posts: I) -> BrandSummary
where
    S: DataSource,
    I: IntoIterator<Item = &'a Post>,
{
    let mut summary = BrandSummary::default();
    for post in posts {
        if let BrandMentions::Detected(names) = detect_brands(post) {
            summary.brands.extend(names);
        }
    }

    let mut categories: HashMap<&str, Option<String>> = HashMap::new();
    for brand in &summary.brands {
        if categories.contains_key(brand.as_str()) {
            continue;
        }
        let category = match source.account_category(brand).await {
            Ok(category) => category,
            Err(e) => {
                tracing::warn!(brand = %brand, error = %e, "brand category lookup failed");
                summary.failed_lookups += 1;
                None
            }
        };
        categories.insert(brand.as_str(), category);
    }

    for brand in &summary.brands {
        if let Some(Some(category)) = categories.get(brand.as_str()) {
            *summary.types.entry(category.clone()).or_insert(0) += 1;
        }
    }
    summary
}
