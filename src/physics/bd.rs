//! 1-D Brownian-dynamics kernels.
//!
//! All three functions describe a free particle pair on a line, reduced to
//! the interparticle coordinate with combined diffusion constant `d`:
//!
//! g_bd(r)  = exp(-(r - r01)^2 / 4Dt) / sqrt(4 pi D t)   (propagator about contact)
//! I_bd     = integral over the contact zone of the overlap probability
//! drawR    = inverse CDF of the erfc-weighted overlap depth
//!
//! The drift-free forms are the executed ones.
// TODO: drift-aware I_bd and drawR need the backward-move sign inversion of
// the drift before they can replace these; enable both together.

use std::f64::consts::PI;

use crate::numerics::{erfc, find_root_brent};

/// Width of the sampling window for the overlap draw, in units of the
/// diffusion length. Six standard deviations make the truncated tail
/// negligible against the Brent tolerance.
const DRAW_WINDOW: f64 = 6.0;

/// Free 1-D Gaussian propagator about the contact distance `r01`.
pub fn g_bd_1d(r: f64, r01: f64, t: f64, d: f64) -> f64 {
    let dt4 = 4.0 * d * t;
    if dt4 <= 0.0 {
        return 0.0;
    }
    (-(r - r01) * (r - r01) / dt4).exp() / (PI * dt4).sqrt()
}

/// Integral of the overlap probability of a free pair over the contact
/// zone: the probability mass a Brownian step carries across the contact
/// distance within `t`, drift-free.
pub fn i_bd_1d(r01: f64, t: f64, d: f64) -> f64 {
    let _ = r01; // the 1-D integral is translation invariant about contact
    (d * t / PI).sqrt()
}

/// Draw the separation of a geminate pair immediately after dissociation:
/// `r01` plus an overlap depth with weight erfc(w / sqrt(4Dt)).
///
/// The cumulative weight has the closed form
/// `C(w) = w erfc(w/s) + s/sqrt(pi) (1 - exp(-w^2/s^2))` with
/// `s = sqrt(4Dt)`; it is inverted with Brent over a six-sigma window.
pub fn draw_r_gbd_1d(rnd: f64, r01: f64, t: f64, d: f64) -> f64 {
    let s = (4.0 * d * t).sqrt();
    if s == 0.0 {
        return r01;
    }

    let cumulative = |w: f64| w * erfc(w / s) + s / PI.sqrt() * (1.0 - (-(w / s) * (w / s)).exp());

    let w_max = DRAW_WINDOW * s;
    let target = rnd.clamp(0.0, 1.0) * cumulative(w_max);

    // C is monotone on [0, w_max]; the bracket always straddles.
    let w = find_root_brent(
        |w| cumulative(w) - target,
        0.0,
        w_max,
        1e-12 * s,
        1e-12,
        "draw_r_gbd_1d",
    )
    .unwrap_or(0.0);

    r01 + w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_propagator_peaks_at_contact() {
        let at_contact = g_bd_1d(1.0, 1.0, 0.01, 1.0);
        let off_contact = g_bd_1d(1.5, 1.0, 0.01, 1.0);
        assert!(at_contact > off_contact);
        assert!(off_contact > 0.0);
    }

    #[test]
    fn test_ibd_scales_as_sqrt_dt() {
        let a = i_bd_1d(1.0, 0.01, 1.0);
        let b = i_bd_1d(1.0, 0.04, 1.0);
        assert!((b / a - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_draw_r_monotone_in_rnd() {
        let r_lo = draw_r_gbd_1d(0.1, 1.0, 0.01, 1.0);
        let r_mid = draw_r_gbd_1d(0.5, 1.0, 0.01, 1.0);
        let r_hi = draw_r_gbd_1d(0.9, 1.0, 0.01, 1.0);
        assert!(r_lo >= 1.0);
        assert!(r_lo < r_mid && r_mid < r_hi);
    }

    #[test]
    fn test_draw_r_degenerate_time() {
        assert_eq!(draw_r_gbd_1d(0.5, 1.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_draw_r_stays_in_window() {
        for i in 0..20 {
            let rnd = i as f64 / 19.0;
            let r = draw_r_gbd_1d(rnd, 2.0, 0.01, 1.0);
            let s = (4.0f64 * 0.01).sqrt();
            assert!(r >= 2.0 && r <= 2.0 + 6.0 * s, "r = {r}");
        }
    }
}
