//! Perceptual color difference.
//!
//! [`delta_e_2000`] is the ground truth for every "similar color" and
//! "closest name" feature. [`delta_e_76`] (plain Euclidean LAB distance) is
//! the cheap metric used inside the k-means inner loop.

use crate::color::Lab;

/// 25^7, used by the G factor and R_C.
const POW25_7: f64 = 6_103_515_625.0;

/// CIE76 color difference: Euclidean distance in LAB.
pub fn delta_e_76(a: Lab, b: Lab) -> f64 {
    delta_e_76_squared(a, b).sqrt()
}

/// Squared CIE76 distance, for comparisons where the root is not needed.
pub fn delta_e_76_squared(a: Lab, b: Lab) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    dl * dl + da * da + db * db
}

/// CIEDE2000 color difference with kL = kC = kH = 1.
///
/// Follows Sharma, Wu & Dalal (2005), including the mean-hue wrap rule and
/// the zero-chroma special cases for h′ and Δh′.
pub fn delta_e_2000(lab1: Lab, lab2: Lab) -> f64 {
    let (l1, a1, b1) = (lab1.l, lab1.a, lab1.b);
    let (l2, a2, b2) = (lab2.l, lab2.a, lab2.b);

    // Step 1: C*, G factor, a′, C′, h′.
    let c1 = (a1 * a1 + b1 * b1).sqrt();
    let c2 = (a2 * a2 + b2 * b2).sqrt();
    let c_bar = (c1 + c2) / 2.0;
    let c_bar7 = c_bar.powi(7);
    let g = 0.5 * (1.0 - (c_bar7 / (c_bar7 + POW25_7)).sqrt());

    let a1p = (1.0 + g) * a1;
    let a2p = (1.0 + g) * a2;
    let c1p = (a1p * a1p + b1 * b1).sqrt();
    let c2p = (a2p * a2p + b2 * b2).sqrt();
    let h1p = hue_angle(b1, a1p);
    let h2p = hue_angle(b2, a2p);

    // Step 2: ΔL′, ΔC′, ΔH′.
    let dlp = l2 - l1;
    let dcp = c2p - c1p;
    let chroma_product = c1p * c2p;
    let dhp = if chroma_product == 0.0 {
        0.0
    } else {
        let diff = h2p - h1p;
        if diff > 180.0 {
            diff - 360.0
        } else if diff < -180.0 {
            diff + 360.0
        } else {
            diff
        }
    };
    let dhp_big = 2.0 * chroma_product.sqrt() * (dhp.to_radians() / 2.0).sin();

    // Step 3: means, weighting functions, rotation term.
    let lp_bar = (l1 + l2) / 2.0;
    let cp_bar = (c1p + c2p) / 2.0;
    let hp_bar = if chroma_product == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) / 2.0
    } else {
        (h1p + h2p - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (hp_bar - 30.0).to_radians().cos()
        + 0.24 * (2.0 * hp_bar).to_radians().cos()
        + 0.32 * (3.0 * hp_bar + 6.0).to_radians().cos()
        - 0.20 * (4.0 * hp_bar - 63.0).to_radians().cos();

    let d_theta = 30.0 * (-((hp_bar - 275.0) / 25.0).powi(2)).exp();
    let cp_bar7 = cp_bar.powi(7);
    let r_c = 2.0 * (cp_bar7 / (cp_bar7 + POW25_7)).sqrt();
    let lp_offset = (lp_bar - 50.0).powi(2);
    let s_l = 1.0 + (0.015 * lp_offset) / (20.0 + lp_offset).sqrt();
    let s_c = 1.0 + 0.045 * cp_bar;
    let s_h = 1.0 + 0.015 * cp_bar * t;
    let r_t = -(2.0 * d_theta).to_radians().sin() * r_c;

    let dl_term = dlp / s_l;
    let dc_term = dcp / s_c;
    let dh_term = dhp_big / s_h;

    (dl_term * dl_term + dc_term * dc_term + dh_term * dh_term + r_t * dc_term * dh_term)
        .max(0.0)
        .sqrt()
}

/// Hue angle in degrees [0, 360), 0 when both components are zero.
fn hue_angle(b: f64, a_prime: f64) -> f64 {
    if b == 0.0 && a_prime == 0.0 {
        0.0
    } else {
        b.atan2(a_prime).to_degrees().rem_euclid(360.0)
    }
}
