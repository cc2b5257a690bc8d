//! Per-post image analysis and the cross-post visual-style features.

use image::imageops::FilterType;
use image::DynamicImage;
use infl_core::{DataSource, ImageSource, Post};

use crate::color::{srgb_to_lab, Lab};
use crate::kmeans::{ClusterOutcome, KMeans, Point};
use crate::stats::{euclidean, mean, population_std, sample_std};

/// Side of the square the image is resized to before colour clustering.
const CLUSTER_SIDE: u32 = 150;
/// Target cluster count for the dominant colour of one image.
const PIXEL_CLUSTERS: usize = 5;
/// Target cluster count across a user's dominant colours.
const STYLE_CLUSTERS: usize = 3;
const HISTOGRAM_BINS: usize = 10;

/// Measurements taken from one decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAnalysis {
    /// `None` if the pixels could not be clustered at any `k`.
    pub dominant: Option<Lab>,
    pub colorfulness: f64,
    pub contrast: f64,
}

/// What happened to one post's image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    Analyzed(ImageAnalysis),
    /// The post has no image.
    Skipped,
    /// Fetching or decoding failed.
    Failed(String),
}

/// Cross-post visual features for one user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageFeatures {
    pub colorfulness_std: f64,
    pub contrast_std: f64,
    /// Unset when colour clustering failed at every `k`.
    pub color_distorsion: Option<f64>,
    /// Unset when no dominant colour was found.
    pub colors_dispersion: Option<f64>,
    pub analyzed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Runs the colour and contrast measurements.
pub struct ImageAnalyzer {
    pixel_kmeans: KMeans,
    style_kmeans: KMeans,
}

impl Default for ImageAnalyzer {
    fn default() -> Self {
        Self {
            pixel_kmeans: KMeans {
                restarts: 5,
                ..KMeans::default()
            },
            style_kmeans: KMeans::default(),
        }
    }
}

impl ImageAnalyzer {
    #[must_use]
    pub fn new(pixel_kmeans: KMeans, style_kmeans: KMeans) -> Self {
        Self {
            pixel_kmeans,
            style_kmeans,
        }
    }

    /// Analyses the image attached to `post`, fetching it through `source`
    /// when the post only carries a URL.
    pub async fn analyze_post<S: DataSource>(&self, source: &S, post: &Post) -> ImageOutcome {
        let bytes = match &post.image {
            None => return ImageOutcome::Skipped,
            Some(ImageSource::Bytes(bytes)) => std::borrow::Cow::Borrowed(bytes.as_slice()),
            Some(ImageSource::Url(url)) => match source.fetch_image(url).await {
                Ok(bytes) => std::borrow::Cow::Owned(bytes),
                Err(e) => return ImageOutcome::Failed(e.to_string()),
            },
        };
        self.analyze_bytes(&bytes)
    }

    #[must_use]
    pub fn analyze_bytes(&self, bytes: &[u8]) -> ImageOutcome {
        match image::load_from_memory(bytes) {
            Ok(img) => ImageOutcome::Analyzed(self.analyze(&img)),
            Err(e) => ImageOutcome::Failed(e.to_string()),
        }
    }

    #[must_use]
    pub fn analyze(&self, img: &DynamicImage) -> ImageAnalysis {
        ImageAnalysis {
            dominant: self.dominant_color(img),
            colorfulness: colorfulness(img),
            contrast: contrast(img),
        }
    }

    /// Centroid of the most populated pixel cluster, in L\*a\*b\*.
    #[must_use]
    pub fn dominant_color(&self, img: &DynamicImage) -> Option<Lab> {
        let small = img
            .resize_exact(CLUSTER_SIDE, CLUSTER_SIDE, FilterType::Nearest)
            .to_rgb8();
        let pixels: Vec<Point> = small
            .pixels()
            .map(|p| [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])])
            .collect();
        let outcome = self.pixel_kmeans.fit_degrading(&pixels, PIXEL_CLUSTERS);
        outcome.clustering()?.dominant().map(srgb_to_lab)
    }

    /// Aggregates per-post outcomes into the user's visual features.
    #[must_use]
    pub fn summarize(&self, outcomes: &[ImageOutcome]) -> ImageFeatures {
        let mut features = ImageFeatures::default();
        let mut colorfulness_values = Vec::new();
        let mut contrast_values = Vec::new();
        let mut dominants: Vec<Point> = Vec::new();

        for outcome in outcomes {
            match outcome {
                ImageOutcome::Analyzed(a) => {
                    features.analyzed += 1;
                    if a.colorfulness.is_finite() {
                        colorfulness_values.push(a.colorfulness);
                    }
                    if a.contrast.is_finite() {
                        contrast_values.push(a.contrast);
                    }
                    if let Some(lab) = a.dominant {
                        dominants.push(lab.to_array());
                    }
                }
                ImageOutcome::Skipped => features.skipped += 1,
                ImageOutcome::Failed(_) => features.failed += 1,
            }
        }

        features.colorfulness_std = sample_std(&colorfulness_values);
        features.contrast_std = sample_std(&contrast_values);
        features.color_distorsion = match self.style_kmeans.fit_degrading(&dominants, STYLE_CLUSTERS)
        {
            ClusterOutcome::Converged { clustering, .. } => Some(clustering.distortion),
            ClusterOutcome::Failed { attempts } => {
                tracing::debug!(?attempts, colors = dominants.len(), "colour clustering failed");
                None
            }
        };
        features.colors_dispersion = dispersion(&dominants);
        features
    }
}

/// Hasler–Süsstrunk colourfulness over the full-size image.
#[must_use]
pub fn colorfulness(img: &DynamicImage) -> f64 {
    let rgb = img.to_rgb8();
    let (rg, yb): (Vec<f64>, Vec<f64>) = rgb
        .pixels()
        .map(|p| {
            let (r, g, b) = (f64::from(p[0]), f64::from(p[1]), f64::from(p[2]));
            ((r - g).abs(), (0.5 * (r + g) - b).abs())
        })
        .unzip();
    let std_root = population_std(&rg).hypot(population_std(&yb));
    let mean_root = mean(&rg).unwrap_or(0.0).hypot(mean(&yb).unwrap_or(0.0));
    std_root + 0.3 * mean_root
}

/// Shannon entropy (natural log) of a 10-bin grey-level histogram spanning
/// the image's own intensity range.
#[must_use]
pub fn contrast(img: &DynamicImage) -> f64 {
    let gray = img.to_luma8();
    let values: Vec<u8> = gray.pixels().map(|p| p[0]).collect();
    let (Some(&lo), Some(&hi)) = (values.iter().min(), values.iter().max()) else {
        return 0.0;
    };
    if lo == hi {
        return 0.0;
    }

    let span = f64::from(hi - lo);
    let mut bins = [0usize; HISTOGRAM_BINS];
    for v in &values {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let idx = ((f64::from(v - lo) / span) * HISTOGRAM_BINS as f64) as usize;
        bins[idx.min(HISTOGRAM_BINS - 1)] += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let total = values.len() as f64;
    bins.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / total;
            -p * p.ln()
        })
        .sum()
}

/// Mean distance from each colour to the centroid of all colours.
fn dispersion(colors: &[Point]) -> Option<f64> {
    if colors.is_empty() {
        return None;
    }
    let centroid: Point = [0, 1, 2].map(|d| {
        let column: Vec<f64> = colors.iter().map(|c| c[d]).collect();
        mean(&column).unwrap_or(0.0)
    });
    let distances: Vec<f64> = colors.iter().map(|c| euclidean(c, &centroid)).collect();
    mean(&distances)
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, Rgb, RgbImage};

    use super::*;

    fn solid(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 40, Rgb([r, g, b])))
    }

    fn encode_png(img: &DynamicImage) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn grey_image_has_zero_colorfulness() {
        assert!(colorfulness(&solid(90, 90, 90)).abs() < 1e-12);
    }

    #[test]
    fn saturated_image_is_colorful() {
        assert!(colorfulness(&solid(255, 0, 0)) > 50.0);
    }

    #[test]
    fn constant_image_has_zero_contrast() {
        assert_eq!(contrast(&solid(10, 200, 30)), 0.0);
    }

    #[test]
    fn uniform_histogram_maximises_contrast() {
        // Ten grey levels spread evenly over the range, one column each.
        let img = GrayImage::from_fn(10, 10, |x, _| {
            #[allow(clippy::cast_possible_truncation)]
            let level = (x * 25) as u8;
            Luma([level])
        });
        let c = contrast(&DynamicImage::ImageLuma8(img));
        assert!((c - 10f64.ln()).abs() < 1e-9, "contrast {c}");
    }

    #[test]
    fn two_level_image_has_ln2_contrast() {
        let img = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 5 { 0 } else { 255 }]));
        let c = contrast(&DynamicImage::ImageLuma8(img));
        assert!((c - 2f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn dominant_color_of_mostly_red_image_is_red() {
        let img = RgbImage::from_fn(100, 100, |x, _| {
            if x < 80 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let lab = ImageAnalyzer::default()
            .dominant_color(&DynamicImage::ImageRgb8(img))
            .unwrap();
        let red = srgb_to_lab([255.0, 0.0, 0.0]);
        assert!((lab.l - red.l).abs() < 1e-6 && (lab.a - red.a).abs() < 1e-6);
    }

    #[test]
    fn single_color_image_degrades_to_one_cluster() {
        let lab = ImageAnalyzer::default().dominant_color(&solid(0, 128, 0));
        assert!(lab.is_some());
    }

    #[test]
    fn undecodable_bytes_fail_without_panicking() {
        let outcome = ImageAnalyzer::default().analyze_bytes(b"not an image");
        assert!(matches!(outcome, ImageOutcome::Failed(_)));
    }

    #[test]
    fn encoded_bytes_are_analyzed() {
        let outcome = ImageAnalyzer::default().analyze_bytes(&encode_png(&solid(200, 20, 20)));
        assert!(matches!(outcome, ImageOutcome::Analyzed(_)));
    }

    #[test]
    fn summary_counts_outcomes_and_needs_two_samples_for_std() {
        let analyzer = ImageAnalyzer::default();
        let analysis = analyzer.analyze(&solid(200, 20, 20));
        let features = analyzer.summarize(&[
            ImageOutcome::Analyzed(analysis),
            ImageOutcome::Skipped,
            ImageOutcome::Failed("decode".to_owned()),
        ]);
        assert_eq!((features.analyzed, features.skipped, features.failed), (1, 1, 1));
        assert_eq!(features.colorfulness_std, 0.0);
        assert_eq!(features.contrast_std, 0.0);
        assert_eq!(features.color_distorsion, Some(0.0));
        assert_eq!(features.colors_dispersion, Some(0.0));
    }

    #[test]
    fn no_images_leave_distortion_unset() {
        let features = ImageAnalyzer::default().summarize(&[ImageOutcome::Skipped]);
        assert_eq!(features.color_distorsion, None);
        assert_eq!(features.colors_dispersion, None);
    }

    #[test]
    fn nan_measurements_are_excluded() {
        let analyzer = ImageAnalyzer::default();
        let nan = ImageAnalysis {
            dominant: None,
            colorfulness: f64::NAN,
            contrast: f64::NAN,
        };
        let ok = ImageAnalysis {
            dominant: None,
            colorfulness: 1.0,
            contrast: 1.0,
        };
        let features = analyzer.summarize(&[
            ImageOutcome::Analyzed(nan),
            ImageOutcome::Analyzed(ok.clone()),
            ImageOutcome::Analyzed(ok),
        ]);
        assert_eq!(features.colorfulness_std, 0.0);
        assert!(!features.contrast_std.is_nan());
    }
}
