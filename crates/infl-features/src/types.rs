use serde::{Deserialize, Serialize};

use crate::brand::BrandSummary;
use crate::error::FeatureError;

/// Classifier input order. Downstream models depend on it; append only.
pub const FEATURE_NAMES: [&str; 10] = [
    "commentscore",
    "engagement",
    "followers",
    "followings",
    "nmedias",
    "lastpost",
    "usermentions",
    "colorfulness_std",
    "color_distorsion",
    "contrast_std",
];

/// Everything computed for one user, including features the classifier
/// does not consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFeatures {
    pub username: String,
    /// Ground-truth label, only known for archived users.
    pub label: Option<i32>,
    pub commentscore: f64,
    pub engagement: f64,
    pub followers: u64,
    pub followings: u64,
    pub nmedias: u64,
    /// Seconds since the newest post.
    pub lastpost: i64,
    pub usermentions: u64,
    pub colorfulness_std: f64,
    pub color_distorsion: Option<f64>,
    pub contrast_std: f64,
    /// Posts per day.
    pub frequency: f64,
    pub biography_score: f64,
    pub colors_dispersion: Option<f64>,
    pub brands: BrandSummary,
    pub comments_scored: usize,
    pub images_analyzed: usize,
    pub images_failed: usize,
}

impl UserFeatures {
    /// Assembles the classifier vector in [`FEATURE_NAMES`] order.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::MissingFeature`] if colour clustering never
    /// produced a distortion for this user.
    #[allow(clippy::cast_precision_loss)]
    pub fn vector(&self) -> Result<FeatureVector, FeatureError> {
        let color_distorsion = self
            .color_distorsion
            .ok_or(FeatureError::MissingFeature("color_distorsion"))?;
        Ok(FeatureVector {
            values: [
                self.commentscore,
                self.engagement,
                self.followers as f64,
                self.followings as f64,
                self.nmedias as f64,
                self.lastpost as f64,
                self.usermentions as f64,
                self.colorfulness_std,
                color_distorsion,
                self.contrast_std,
            ],
        })
    }
}

/// Fixed-order numeric features for one user. Serializes as a bare array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: [f64; FEATURE_NAMES.len()],
}

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    /// `(name, value)` pairs in vector order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_features(username: &str) -> UserFeatures {
        UserFeatures {
            username: username.to_owned(),
            label: Some(1),
            commentscore: 1.25,
            engagement: 17.5,
            followers: 100,
            followings: 50,
            nmedias: 40,
            lastpost: 3_600,
            usermentions: 3,
            colorfulness_std: 0.1,
            color_distorsion: Some(2.5),
            contrast_std: 0.2,
            frequency: 0.5,
            biography_score: 0.0,
            colors_dispersion: Some(1.0),
            brands: BrandSummary::default(),
            comments_scored: 4,
            images_analyzed: 2,
            images_failed: 0,
        }
    }

    #[test]
    fn vector_follows_feature_order() {
        let v = sample_features("alice").vector().unwrap();
        assert_eq!(
            v.as_slice(),
            &[1.25, 17.5, 100.0, 50.0, 40.0, 3_600.0, 3.0, 0.1, 2.5, 0.2]
        );
        assert_eq!(v.get("color_distorsion"), Some(2.5));
        assert_eq!(v.get("frequency"), None);
        let names: Vec<&str> = v.named().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_NAMES);
    }

    #[test]
    fn missing_distortion_blocks_the_vector() {
        let mut f = sample_features("alice");
        f.color_distorsion = None;
        assert!(matches!(
            f.vector(),
            Err(FeatureError::MissingFeature("color_distorsion"))
        ));
    }
}
