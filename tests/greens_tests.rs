//! Validation tests for the 1-D absorbing-sink-absorbing Green's function.
//!
//! Reference values:
//! - With k = 0 the function degenerates to the absorbing-absorbing
//!   interval, whose eigenseries is classical: for D = 1 on [0, 2] starting
//!   at the center, S(t) = sum over odd n of 4/(n pi) sin(n pi / 2)
//!   exp(-n^2 pi^2 t / 4); S(0.1) = 0.99484 - 0.04606 + 0.00053 - ...
//!   = 0.9493.
//! - The mean first-passage time of the same configuration is
//!   x (L - x) / 2D = 0.5.
//! - The flux identity flux_leaves + flux_leavea + flux_sink = flux_tot
//!   holds term by term at the eigenvalues.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gfrd_core::{EventKind, GreensFunction1DAbsSinkAbs};

/// Symmetric interval, no sink: D=1, k=0, sigma=0, a=2, rsink=r0=1.
fn symmetric_no_sink() -> GreensFunction1DAbsSinkAbs {
    GreensFunction1DAbsSinkAbs::new(1.0, 0.0, 1.0, 1.0, 0.0, 2.0).unwrap()
}

/// Strong symmetric sink: D=1, k=100, sigma=-1, a=1, rsink=0.
fn strong_sink(r0: f64) -> GreensFunction1DAbsSinkAbs {
    GreensFunction1DAbsSinkAbs::new(1.0, 100.0, r0, 0.0, -1.0, 1.0).unwrap()
}

// ============================================================================
// Root cache invariants
// ============================================================================

#[test]
fn test_root_cache_strictly_increasing_with_bounded_gaps() {
    for mut gf in [
        symmetric_no_sink(),
        strong_sink(0.5),
        GreensFunction1DAbsSinkAbs::new(1.0, 25.0, 0.7, 0.4, 0.1, 1.8).unwrap(),
    ] {
        // Force a deep enumeration through the survival series.
        gf.p_survival(1e-6).unwrap();
        assert!(gf.num_cached_roots() >= 20, "{}", gf.dump());

        let roots = gf.cached_roots();
        for pair in roots.windows(2) {
            assert!(pair[0] < pair[1], "roots not increasing: {pair:?}");
        }

        // Gap bound: successive wavenumbers are never farther apart than
        // the long progression period pi / min(Lr, Ll).
        let min_sub = (gf.r_sink() - gf.sigma()).min(gf.a() - gf.r_sink());
        let long_period = std::f64::consts::PI / min_sub;
        for pair in roots.windows(2) {
            assert!(
                pair[1] - pair[0] <= long_period + 1e-9,
                "root gap {} exceeds the progression period {long_period} for {}",
                pair[1] - pair[0],
                gf.dump()
            );
        }

        // The straddling diagnostics must stay clean.
        assert_eq!(gf.bracket_failures(), 0, "{}", gf.dump());
    }
}

#[test]
fn test_cache_extends_in_place() {
    let mut gf = strong_sink(0.5);
    gf.p_survival(0.1).unwrap();
    let shallow: Vec<f64> = gf.cached_roots().to_vec();
    gf.p_survival(1e-7).unwrap();
    assert!(gf.num_cached_roots() > shallow.len());
    assert_eq!(&gf.cached_roots()[..shallow.len()], &shallow[..]);
}

// ============================================================================
// Survival probability
// ============================================================================

#[test]
fn test_survival_starts_at_one_and_decreases() {
    let mut gf = symmetric_no_sink();
    assert_eq!(gf.p_survival(0.0).unwrap(), 1.0);

    let times = [0.001, 0.01, 0.05, 0.1, 0.3, 1.0, 3.0];
    let mut prev = 1.0;
    for t in times {
        let s = gf.p_survival(t).unwrap();
        assert!(s <= prev + 1e-9, "survival not monotone at t = {t}: {s} > {prev}");
        assert!(s >= -1e-9);
        prev = s;
    }
}

#[test]
fn test_survival_matches_classical_series() {
    let mut gf = symmetric_no_sink();
    let s = gf.p_survival(0.1).unwrap();
    assert!((s - 0.9493).abs() < 1e-3, "S(0.1) = {s}, expected 0.9493");
}

#[test]
fn test_sink_accelerates_decay() {
    let mut without = symmetric_no_sink();
    // Same geometry with a strong sink at the starting point.
    let mut with = GreensFunction1DAbsSinkAbs::new(1.0, 100.0, 1.0, 1.0, 0.0, 2.0).unwrap();

    let t = 0.05;
    let s_without = without.p_survival(t).unwrap();
    let s_with = with.p_survival(t).unwrap();
    assert!(
        s_with < 0.5 * s_without,
        "sink barely absorbed: {s_with} vs {s_without}"
    );
}

// ============================================================================
// Flux identity and event types
// ============================================================================

#[test]
fn test_flux_identity() {
    let configs = [
        symmetric_no_sink(),
        strong_sink(0.5),
        strong_sink(0.05),
        GreensFunction1DAbsSinkAbs::new(0.5, 7.0, 0.9, 0.6, 0.2, 1.7).unwrap(),
    ];
    for mut gf in configs {
        for t in [0.005, 0.02, 0.1] {
            let tot = gf.flux_tot(t).unwrap();
            let parts = gf.flux_leaves(t).unwrap()
                + gf.flux_leavea(t).unwrap()
                + gf.flux_sink(t).unwrap();
            assert!(
                ((parts - tot) / tot).abs() < 1e-8,
                "flux identity violated for {} at t = {t}: {parts} vs {tot}",
                gf.dump()
            );
        }
    }
}

#[test]
fn test_fluxes_are_outflows() {
    let mut gf = strong_sink(0.5);
    let t = 0.02;
    assert!(gf.flux_tot(t).unwrap() > 0.0);
    assert!(gf.flux_leavea(t).unwrap() > 0.0);
    assert!(gf.flux_sink(t).unwrap() > 0.0);
    // The far boundary sits 1.5 away; its flux at this time is pure
    // roundoff scale but must not come out meaningfully negative.
    assert!(gf.flux_leaves(t).unwrap() > -1e-9);
}

#[test]
fn test_event_type_without_sink_is_always_escape() {
    let mut gf = symmetric_no_sink();
    for i in 0..100 {
        let rnd = i as f64 / 100.0;
        assert_eq!(gf.draw_event_type(rnd, 0.1).unwrap(), EventKind::Escape);
    }
}

#[test]
fn test_strong_sink_close_start_mostly_reacts() {
    // Starting close to a strong sink, nearly all exits go through it.
    let mut gf = strong_sink(0.05);
    let t = 0.01;
    let ratio = gf.flux_sink(t).unwrap() / gf.flux_tot(t).unwrap();
    assert!(ratio > 0.95, "sink flux fraction {ratio}");
}

#[test]
fn test_event_type_fraction_matches_flux_ratio() {
    let mut gf = strong_sink(0.3);
    let t = 0.02;
    let ratio = gf.flux_sink(t).unwrap() / gf.flux_tot(t).unwrap();

    // A uniform grid of random numbers recovers the ratio to 1/n.
    let n = 10_000;
    let reactions = (0..n)
        .filter(|i| {
            let rnd = (*i as f64 + 0.5) / n as f64;
            gf.draw_event_type(rnd, t).unwrap() == EventKind::Reaction
        })
        .count();
    let fraction = reactions as f64 / n as f64;
    assert!(
        (fraction - ratio).abs() <= 1.0 / n as f64 + 1e-9,
        "event fraction {fraction} vs flux ratio {ratio}"
    );
}

// ============================================================================
// First-passage times
// ============================================================================

#[test]
fn test_draw_time_monotone_in_sample() {
    let mut gf = symmetric_no_sink();
    // S(t) decreases, so the inverse maps larger samples to earlier times.
    let t_early = gf.draw_time(0.9).unwrap();
    let t_mid = gf.draw_time(0.5).unwrap();
    let t_late = gf.draw_time(0.1).unwrap();
    assert!(t_early < t_mid && t_mid < t_late, "{t_early} {t_mid} {t_late}");
}

#[test]
fn test_draw_time_inverts_survival() {
    let mut gf = strong_sink(0.4);
    for rnd in [0.15, 0.5, 0.85] {
        let t = gf.draw_time(rnd).unwrap();
        let s = gf.p_survival(t).unwrap();
        assert!((s - rnd).abs() < 1e-6, "S({t}) = {s}, expected {rnd}");
    }
}

#[test]
fn test_mean_first_passage_time() {
    // For the sink-free symmetric interval the mean first-passage time
    // from the center is x (L - x) / 2D = 0.5.
    let mut gf = symmetric_no_sink();
    let mut rng = StdRng::seed_from_u64(2024);

    let n = 10_000;
    let mut sum = 0.0;
    for _ in 0..n {
        sum += gf.draw_time(rng.gen()).unwrap();
    }
    let mean = sum / n as f64;
    assert!(
        (mean - 0.5).abs() < 0.03,
        "empirical mean first-passage time {mean}, expected 0.5"
    );
}

// ============================================================================
// Exit positions
// ============================================================================

#[test]
fn test_draw_r_inverts_spatial_cdf() {
    let mut gf = strong_sink(0.3);
    let t = 0.05;
    for rnd in [0.2, 0.5, 0.8] {
        let r = gf.draw_r(rnd, t).unwrap();
        assert!(r >= gf.sigma() && r <= gf.a());
        let cdf = gf.p_int_r(r, t).unwrap();
        assert!((cdf - rnd).abs() < 1e-6, "CDF({r}) = {cdf}, expected {rnd}");
    }
}

#[test]
fn test_spatial_cdf_normalizes_to_survival() {
    let mut gf = strong_sink(0.5);
    let t = 0.05;
    // p_int_r is survival-normalized, so the full-interval integral is 1.
    let total = gf.p_int_r(gf.a(), t).unwrap();
    assert!((total - 1.0).abs() < 1e-6, "normalization {total}");
    let nothing = gf.p_int_r(gf.sigma(), t).unwrap();
    assert!(nothing.abs() < 1e-9);
}

#[test]
fn test_draw_r_symmetric_mean() {
    // In the symmetric sink-free interval the surviving density stays
    // centered: the empirical mean of drawn positions is the center.
    let mut gf = symmetric_no_sink();
    let mut rng = StdRng::seed_from_u64(7);

    let n = 40_000;
    let mut sum = 0.0;
    for _ in 0..n {
        sum += gf.draw_r(rng.gen(), 0.1).unwrap();
    }
    let mean = sum / n as f64;
    assert!((mean - 1.0).abs() < 0.01, "empirical mean {mean}, expected 1.0");
}

#[test]
fn test_prob_r_vanishes_on_boundaries_and_peaks_inside() {
    let mut gf = strong_sink(0.5);
    let t = 0.02;
    assert_eq!(gf.prob_r(gf.sigma(), t).unwrap(), 0.0);
    assert_eq!(gf.prob_r(gf.a(), t).unwrap(), 0.0);

    // Density near the start beats density near the sink (which drains).
    let near_start = gf.prob_r(0.5, t).unwrap();
    let near_sink = gf.prob_r(0.01, t).unwrap();
    assert!(near_start > near_sink, "{near_start} vs {near_sink}");
    assert!(near_sink >= 0.0);
}

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn test_out_of_range_arguments_are_rejected() {
    let mut gf = strong_sink(0.5);
    assert!(gf.draw_time(1.0).is_err());
    assert!(gf.draw_time(-0.2).is_err());
    assert!(gf.draw_event_type(0.5, -1.0).is_err());
    assert!(gf.draw_r(1.5, 0.1).is_err());
    assert!(gf.prob_r(2.0, 0.1).is_err());
    assert!(gf.p_survival(-0.5).is_err());
}
