//! Rule-based brand roles for a palette.
//!
//! Neutrals are decided by a [`RuleTable`] over HSL: low saturation, or
//! lightness close to white or black. Everything else is ranked by
//! `0.7 * saturation + 0.3 * closeness of lightness to 50%`; the top color is
//! primary, the next secondary, the rest accents.

use std::sync::OnceLock;

use crate::cluster::{BrandRole, ClusterAssignment, Extraction};
use crate::color::Rgb;
use crate::rules::{Rule, RuleTable};

fn neutral_rules() -> &'static RuleTable<BrandRole> {
    static TABLE: OnceLock<RuleTable<BrandRole>> = OnceLock::new();
    TABLE.get_or_init(|| {
        RuleTable::new(vec![
            Rule::new(BrandRole::Neutral).saturation(0.0, 15.0),
            Rule::new(BrandRole::Neutral).lightness(92.0, 100.0),
            Rule::new(BrandRole::Neutral).lightness(0.0, 8.0),
        ])
    })
}

fn is_neutral(color: Rgb) -> bool {
    let hsl = color.to_hsl();
    neutral_rules().classify(hsl.h, hsl.s, hsl.l).is_some()
}

/// Brand score in [0, 1]. Saturated mid-lightness colors score highest.
pub fn brand_score(color: Rgb) -> f64 {
    let hsl = color.to_hsl();
    0.7 * hsl.s / 100.0 + 0.3 * (1.0 - (hsl.l - 50.0).abs() / 50.0)
}

/// Sets `role` on every cluster. Order and percentages are untouched;
/// score ties keep their existing order.
pub fn assign_brand_roles(clusters: &mut [ClusterAssignment]) {
    let mut ranked: Vec<(usize, f64)> = Vec::with_capacity(clusters.len());
    for (i, cluster) in clusters.iter_mut().enumerate() {
        if is_neutral(cluster.color) {
            cluster.role = Some(BrandRole::Neutral);
        } else {
            ranked.push((i, brand_score(cluster.color)));
        }
    }
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (rank, &(i, _)) in ranked.iter().enumerate() {
        clusters[i].role = Some(match rank {
            0 => BrandRole::Primary,
            1 => BrandRole::Secondary,
            _ => BrandRole::Accent,
        });
    }
}

/// Assigns roles to the clusters of an extraction in place.
pub fn assign_extraction_roles(extraction: &mut Extraction) {
    assign_brand_roles(&mut extraction.clusters);
}

/// Buckets a plain list of colors into brand roles, giving each color an
/// equal share. Output order follows the input.
pub fn bucketize_brand_palette(colors: &[Rgb]) -> Vec<ClusterAssignment> {
    if colors.is_empty() {
        return Vec::new();
    }
    let share = 100.0 / colors.len() as f64;
    let mut clusters: Vec<ClusterAssignment> = colors
        .iter()
        .map(|&color| ClusterAssignment {
            color,
            percentage: share,
            pixel_count: 1,
            role: None,
        })
        .collect();
    assign_brand_roles(&mut clusters);
    clusters
}
