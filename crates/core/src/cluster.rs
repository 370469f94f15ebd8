//! Dominant-color extraction by k-means in CIE LAB.
//!
//! Opaque pixels are sampled (every `sample_stride`-th pixel), collapsed
//! into distinct colors with counts, seeded with k-means++ from an injected
//! [`RandomSource`], and refined by weighted Lloyd iterations under squared
//! ΔE76. Iteration stops once no centroid moves by `epsilon` or more, or at
//! `max_iterations`; the cap is reported as a [`ConvergenceWarning`], not an
//! error.

use std::collections::BTreeMap;
use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cancel::CancelFlag;
use crate::color::{lab_to_rgb, Lab, Rgb};
use crate::distance::delta_e_76_squared;
use crate::error::ColorError;
use crate::params::Params;
use crate::pixel::PixelBuffer;
use crate::prng::RandomSource;

/// Largest supported cluster count.
pub const MAX_CLUSTERS: usize = 32;

/// Pixels below this alpha are not sampled.
pub const MIN_SAMPLE_ALPHA: u8 = 128;

/// Tuning for [`extract_dominant_colors`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Number of clusters, 1..=32.
    pub k: usize,
    pub max_iterations: usize,
    /// Convergence threshold on centroid movement, in ΔE76.
    pub epsilon: f64,
    /// Sample every n-th pixel.
    pub sample_stride: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 5,
            max_iterations: 20,
            epsilon: 0.5,
            sample_stride: 1,
        }
    }
}

impl KMeansConfig {
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    /// Reads `k`, `max_iterations`, `epsilon` and `sample_stride`, then
    /// validates the result.
    pub fn from_json(value: &Value) -> Result<Self, ColorError> {
        let p = Params::new(value)?;
        let d = Self::default();
        let config = Self {
            k: p.usize_in("k", d.k, 1..=MAX_CLUSTERS)?,
            max_iterations: p.usize_in("max_iterations", d.max_iterations, 1..=usize::MAX)?,
            epsilon: p.f64_in("epsilon", d.epsilon, 0.0..=f64::INFINITY)?,
            sample_stride: p.usize_in("sample_stride", d.sample_stride, 1..=usize::MAX)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ColorError> {
        if !(1..=MAX_CLUSTERS).contains(&self.k) {
            return Err(ColorError::range("k", self.k));
        }
        if self.sample_stride == 0 {
            return Err(ColorError::range("sample_stride", self.sample_stride));
        }
        if self.max_iterations == 0 {
            return Err(ColorError::range("max_iterations", self.max_iterations));
        }
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(ColorError::range("epsilon", self.epsilon));
        }
        Ok(())
    }
}

/// Brand role of a palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandRole {
    Primary,
    Secondary,
    Accent,
    Neutral,
}

impl BrandRole {
    pub fn as_str(self) -> &'static str {
        match self {
            BrandRole::Primary => "primary",
            BrandRole::Secondary => "secondary",
            BrandRole::Accent => "accent",
            BrandRole::Neutral => "neutral",
        }
    }
}

impl fmt::Display for BrandRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A palette color with its share of the sampled pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub color: Rgb,
    /// Share of samples, in percent.
    pub percentage: f64,
    pub pixel_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<BrandRole>,
}

/// Emitted when k-means stops at `max_iterations` without converging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceWarning {
    pub iterations: usize,
    /// Largest centroid movement in the final iteration, in ΔE76.
    pub max_shift: f64,
}

/// Result of [`extract_dominant_colors`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Sorted by descending percentage; percentages sum to 100.
    pub clusters: Vec<ClusterAssignment>,
    pub iterations: usize,
    pub sample_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<ConvergenceWarning>,
}

impl Extraction {
    pub fn colors(&self) -> Vec<Rgb> {
        self.clusters.iter().map(|c| c.color).collect()
    }

    pub fn converged(&self) -> bool {
        self.warning.is_none()
    }
}

/// A distinct sampled color and how many samples had it.
#[derive(Debug, Clone, Copy)]
struct Sample {
    lab: DVec3,
    weight: f64,
    count: usize,
}

fn lab_vec(lab: Lab) -> DVec3 {
    DVec3::new(lab.l, lab.a, lab.b)
}

fn vec_lab(v: DVec3) -> Lab {
    Lab {
        l: v.x,
        a: v.y,
        b: v.z,
    }
}

fn dist_sq(a: DVec3, b: DVec3) -> f64 {
    delta_e_76_squared(vec_lab(a), vec_lab(b))
}

fn collect_samples(buffer: &PixelBuffer, stride: usize) -> (Vec<Sample>, usize) {
    let mut counts: BTreeMap<Rgb, usize> = BTreeMap::new();
    let mut total = 0;
    for p in buffer
        .pixels()
        .step_by(stride)
        .filter(|p| p[3] >= MIN_SAMPLE_ALPHA)
    {
        *counts.entry(Rgb::new(p[0], p[1], p[2])).or_default() += 1;
        total += 1;
    }
    let samples = counts
        .into_iter()
        .map(|(rgb, count)| Sample {
            lab: lab_vec(rgb.to_lab()),
            weight: count as f64,
            count,
        })
        .collect();
    (samples, total)
}

/// Picks an index with probability proportional to `weights`.
fn pick_weighted(weights: &[f64], rng: &mut impl RandomSource) -> usize {
    let total: f64 = weights.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return rng.next_index(weights.len());
    }
    let target = rng.next_f64() * total;
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w;
        if target < acc {
            return i;
        }
    }
    // Rounding left `target` at the very top; take the last weighted entry.
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}

/// k-means++: the first center is drawn by sample weight, each further one
/// by weight times squared distance to the nearest chosen center.
fn seed_centroids(samples: &[Sample], k: usize, rng: &mut impl RandomSource) -> Vec<DVec3> {
    let weights: Vec<f64> = samples.iter().map(|s| s.weight).collect();
    let mut centroids = vec![samples[pick_weighted(&weights, rng)].lab];
    let mut nearest: Vec<f64> = samples
        .iter()
        .map(|s| dist_sq(s.lab, centroids[0]))
        .collect();

    while centroids.len() < k {
        let weights: Vec<f64> = samples
            .iter()
            .zip(&nearest)
            .map(|(s, d)| s.weight * d)
            .collect();
        let next = samples[pick_weighted(&weights, rng)].lab;
        for (d, s) in nearest.iter_mut().zip(samples) {
            *d = d.min(dist_sq(s.lab, next));
        }
        centroids.push(next);
    }
    centroids
}

fn nearest_centroid(lab: DVec3, centroids: &[DVec3]) -> usize {
    centroids
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, dist_sq(lab, c)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(i, _)| i)
}

/// Extracts the `config.k` dominant colors of `buffer`.
///
/// Pixels with alpha below 128 are ignored. Fails with
/// `ColorError::EmptySample` if nothing opaque is sampled, and with
/// `ColorError::TooManyClusters` if there are fewer distinct sampled colors
/// than `k`. `cancel` is polled before every iteration.
pub fn extract_dominant_colors(
    buffer: &PixelBuffer,
    config: &KMeansConfig,
    rng: &mut impl RandomSource,
    cancel: Option<&CancelFlag>,
) -> Result<Extraction, ColorError> {
    config.validate()?;
    let (samples, sample_count) = collect_samples(buffer, config.sample_stride);
    if samples.is_empty() {
        return Err(ColorError::EmptySample);
    }
    if samples.len() < config.k {
        return Err(ColorError::TooManyClusters {
            k: config.k,
            distinct: samples.len(),
        });
    }

    let k = config.k;
    let mut centroids = seed_centroids(&samples, k, rng);
    let mut counts = vec![0usize; k];
    let mut iterations = 0;
    let mut max_shift = f64::INFINITY;

    while iterations < config.max_iterations {
        if cancel.is_some_and(CancelFlag::is_cancelled) {
            return Err(ColorError::Cancelled);
        }
        iterations += 1;

        let mut sums = vec![DVec3::ZERO; k];
        let mut weights = vec![0.0; k];
        counts.fill(0);
        for s in &samples {
            let c = nearest_centroid(s.lab, &centroids);
            sums[c] += s.lab * s.weight;
            weights[c] += s.weight;
            counts[c] += s.count;
        }

        max_shift = 0.0;
        for c in 0..k {
            let next = if weights[c] > 0.0 {
                sums[c] / weights[c]
            } else {
                // Empty cluster: move it onto the sample farthest from it.
                let old = centroids[c];
                samples
                    .iter()
                    .max_by(|a, b| dist_sq(a.lab, old).total_cmp(&dist_sq(b.lab, old)))
                    .map_or(old, |s| s.lab)
            };
            max_shift = max_shift.max(dist_sq(centroids[c], next).sqrt());
            centroids[c] = next;
        }
        tracing::debug!(iterations, max_shift, "k-means iteration");

        if max_shift < config.epsilon {
            break;
        }
    }

    let warning = if max_shift < config.epsilon {
        None
    } else {
        tracing::warn!(
            iterations,
            max_shift,
            k,
            "k-means hit the iteration cap before converging"
        );
        Some(ConvergenceWarning {
            iterations,
            max_shift,
        })
    };

    let mut clusters: Vec<ClusterAssignment> = centroids
        .iter()
        .zip(&counts)
        .filter(|&(_, &count)| count > 0)
        .map(|(&centroid, &count)| ClusterAssignment {
            color: lab_to_rgb(vec_lab(centroid)),
            percentage: count as f64 / sample_count as f64 * 100.0,
            pixel_count: count,
            role: None,
        })
        .collect();
    clusters.sort_by(|a, b| {
        b.pixel_count
            .cmp(&a.pixel_count)
            .then_with(|| a.color.cmp(&b.color))
    });

    Ok(Extraction {
        clusters,
        iterations,
        sample_count,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::Xorshift64;
    use serde_json::json;

    const RED: Rgb = Rgb::new(220, 30, 40);
    const BLUE: Rgb = Rgb::new(20, 60, 200);

    fn two_tone(red: usize, blue: usize) -> PixelBuffer {
        let mut colors = vec![RED; red];
        colors.extend(std::iter::repeat(BLUE).take(blue));
        PixelBuffer::from_colors(red + blue, 1, &colors).unwrap()
    }

    fn run(buffer: &PixelBuffer, config: KMeansConfig) -> Result<Extraction, ColorError> {
        extract_dominant_colors(buffer, &config, &mut Xorshift64::new(42), None)
    }

    // -- Config --

    #[test]
    fn default_config() {
        let c = KMeansConfig::default();
        assert_eq!((c.k, c.max_iterations, c.sample_stride), (5, 20, 1));
        assert_eq!(c.epsilon, 0.5);
    }

    #[test]
    fn config_rejects_bad_values() {
        assert_eq!(
            KMeansConfig::with_k(0).validate(),
            Err(ColorError::range("k", 0))
        );
        assert!(KMeansConfig::with_k(33).validate().is_err());
        assert!(KMeansConfig::with_k(32).validate().is_ok());
        let stride0 = KMeansConfig {
            sample_stride: 0,
            ..Default::default()
        };
        assert_eq!(stride0.validate(), Err(ColorError::range("sample_stride", 0)));
        let nan = KMeansConfig {
            epsilon: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn config_from_json() {
        let c = KMeansConfig::from_json(&json!({"k": 8, "sample_stride": 4})).unwrap();
        assert_eq!(c.k, 8);
        assert_eq!(c.sample_stride, 4);
        assert_eq!(c.max_iterations, 20);
        assert_eq!(
            KMeansConfig::from_json(&json!({"k": 64})).unwrap_err(),
            ColorError::range("k", 64)
        );
        assert_eq!(
            KMeansConfig::from_json(&json!({"sample_stride": 0})).unwrap_err(),
            ColorError::range("sample_stride", 0)
        );
        assert_eq!(
            KMeansConfig::from_json(&json!({"epsilon": -1.0})).unwrap_err(),
            ColorError::range("epsilon", -1.0)
        );
        assert!(KMeansConfig::from_json(&json!({"k": "five"})).is_err());
    }

    // -- Extraction --

    #[test]
    fn k1_is_lab_mean_at_full_share() {
        let colors = [
            Rgb::new(200, 40, 40),
            Rgb::new(40, 200, 40),
            Rgb::new(40, 40, 200),
            Rgb::new(90, 90, 90),
        ];
        let buffer = PixelBuffer::from_colors(2, 2, &colors).unwrap();
        let result = run(&buffer, KMeansConfig::with_k(1)).unwrap();

        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].percentage, 100.0);
        assert_eq!(result.clusters[0].pixel_count, 4);

        // Accumulate in the same (sorted) order as the sampler.
        let mut sorted = colors;
        sorted.sort();
        let mean = sorted
            .iter()
            .map(|c| lab_vec(c.to_lab()))
            .fold(DVec3::ZERO, |acc, v| acc + v)
            / 4.0;
        assert_eq!(result.clusters[0].color, lab_to_rgb(vec_lab(mean)));
        assert!(result.converged());
    }

    #[test]
    fn two_tones_split_cleanly() {
        let result = run(&two_tone(30, 10), KMeansConfig::with_k(2)).unwrap();
        assert_eq!(result.clusters.len(), 2);
        assert_eq!(result.clusters[0].color, RED);
        assert_eq!(result.clusters[0].percentage, 75.0);
        assert_eq!(result.clusters[1].color, BLUE);
        assert_eq!(result.clusters[1].percentage, 25.0);
        assert_eq!(result.sample_count, 40);
        assert!(result.warning.is_none());
    }

    #[test]
    fn too_many_clusters_is_an_error() {
        assert_eq!(
            run(&two_tone(5, 5), KMeansConfig::with_k(3)),
            Err(ColorError::TooManyClusters { k: 3, distinct: 2 })
        );
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let clear = PixelBuffer::new(2, 1, vec![255, 0, 0, 0, 0, 255, 0, 127]).unwrap();
        assert_eq!(
            run(&clear, KMeansConfig::with_k(1)),
            Err(ColorError::EmptySample)
        );

        let mixed = PixelBuffer::new(2, 1, vec![255, 0, 0, 128, 0, 255, 0, 10]).unwrap();
        let result = run(&mixed, KMeansConfig::with_k(1)).unwrap();
        assert_eq!(result.sample_count, 1);
        assert_eq!(result.clusters[0].color, Rgb::new(255, 0, 0));
    }

    #[test]
    fn stride_samples_every_nth_pixel() {
        // Alternating red/blue: stride 2 only ever sees red.
        let colors: Vec<Rgb> = (0..10).map(|i| if i % 2 == 0 { RED } else { BLUE }).collect();
        let buffer = PixelBuffer::from_colors(10, 1, &colors).unwrap();
        let config = KMeansConfig {
            k: 1,
            sample_stride: 2,
            ..Default::default()
        };
        let result = run(&buffer, config).unwrap();
        assert_eq!(result.sample_count, 5);
        assert_eq!(result.clusters[0].color, RED);
    }

    #[test]
    fn iteration_cap_yields_warning_not_error() {
        let buffer = PixelBuffer::from_colors(2, 1, &[Rgb::BLACK, Rgb::WHITE]).unwrap();
        let config = KMeansConfig {
            k: 1,
            max_iterations: 1,
            ..Default::default()
        };
        let result = run(&buffer, config).unwrap();
        let warning = result.warning.unwrap();
        assert_eq!(warning.iterations, 1);
        assert!(warning.max_shift > 40.0, "{}", warning.max_shift);
        assert_eq!(result.clusters.len(), 1);
    }

    #[test]
    fn cancel_aborts() {
        let flag = CancelFlag::new();
        flag.cancel();
        let result = extract_dominant_colors(
            &two_tone(4, 4),
            &KMeansConfig::with_k(2),
            &mut Xorshift64::new(1),
            Some(&flag),
        );
        assert_eq!(result, Err(ColorError::Cancelled));
    }

    #[test]
    fn same_seed_same_result() {
        let colors: Vec<Rgb> = (0..256u32)
            .map(|i| Rgb::new((i * 7) as u8, (i * 13 % 256) as u8, (255 - i) as u8))
            .collect();
        let buffer = PixelBuffer::from_colors(16, 16, &colors).unwrap();
        let config = KMeansConfig::with_k(6);
        let a = extract_dominant_colors(&buffer, &config, &mut Xorshift64::new(9), None).unwrap();
        let b = extract_dominant_colors(&buffer, &config, &mut Xorshift64::new(9), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn extraction_serializes_without_empty_fields() {
        let result = run(&two_tone(3, 1), KMeansConfig::with_k(2)).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("warning").is_none());
        assert!(json["clusters"][0].get("role").is_none());
        assert_eq!(json["clusters"][0]["color"], "#dc1e28");
    }

    #[test]
    fn brand_role_display_matches_serde() {
        for role in [
            BrandRole::Primary,
            BrandRole::Secondary,
            BrandRole::Accent,
            BrandRole::Neutral,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn pick_weighted_respects_zero_weights() {
        let mut rng = Xorshift64::new(3);
        for _ in 0..100 {
            assert_eq!(pick_weighted(&[0.0, 5.0, 0.0], &mut rng), 1);
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn shares_sum_to_100_and_descend(
                pixels in prop::collection::vec(any::<(u8, u8, u8)>(), 16..64),
                k in 1_usize..6,
                seed: u64,
            ) {
                let colors: Vec<Rgb> = pixels.iter().map(|&(r, g, b)| Rgb::new(r, g, b)).collect();
                let buffer = PixelBuffer::from_colors(colors.len(), 1, &colors).unwrap();
                let config = KMeansConfig::with_k(k);
                match extract_dominant_colors(&buffer, &config, &mut Xorshift64::new(seed), None) {
                    Ok(result) => {
                        let total: f64 = result.clusters.iter().map(|c| c.percentage).sum();
                        prop_assert!((total - 100.0).abs() < 1e-9, "{}", total);
                        prop_assert!(result.clusters.len() <= k);
                        prop_assert!(result
                            .clusters
                            .windows(2)
                            .all(|w| w[0].percentage >= w[1].percentage));
                    }
                    Err(ColorError::TooManyClusters { .. }) => {}
                    Err(e) => prop_assert!(false, "unexpected error {e}"),
                }
            }
        }
    }
}
