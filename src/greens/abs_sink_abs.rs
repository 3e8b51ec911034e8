//! 1-D Green's function on an interval with absorbing ends and a point
//! sink.
//!
//! The density p(r, t | r0) solves the diffusion equation on
//! `[-Ll, Lr]` (sink coordinates) with absorbing Dirichlet conditions at
//! both ends and a delta-function sink of strength k at the origin. The
//! admissible wavenumbers q_i satisfy, with x = qL and h = kL/2D,
//!
//!   x sin(x) + h (cos(x (Lr - Ll)/L) - cos(x)) = 0,
//!
//! and everything observable — survival, boundary and sink fluxes, the
//! spatial CDF — is an eigenseries over those roots. Root enumeration is
//! the delicate part: estimates come from two interleaved arithmetic
//! progressions (periods pi L/Lr and pi L/Ll) that merge into a plain
//! pi-ladder once h / x drops below one, and each bracket is checked
//! against the alternating sign parity of consecutive simple roots.
//!
//! The domain is mirrored when r0 lies left of the sink, so that the
//! sub-interval containing r0 always has length Lr; positions are mapped
//! back on output.

use std::f64::consts::PI;
use std::fmt;

use crate::error::{GfrdError, Result};
use crate::numerics::{find_root_brent, func_sum_all};

use super::{EventKind, EPSILON, MAX_TERMS};

/// Bracket shrink attempts before giving up on a parity-consistent upper
/// bound.
const MAX_BRACKET_SHRINKS: usize = 10;

/// Fraction of the gap to the competing progression used as the upper
/// bracket margin.
const BRACKET_SAFETY: f64 = 0.75;

/// Extra eigenmodes beyond the decay estimate.
const SAFETY_TERMS: usize = 2;

pub struct GreensFunction1DAbsSinkAbs {
    D: f64,
    k: f64,
    r0: f64,
    rsink: f64,
    sigma: f64,
    a: f64,
    /// Length of the sub-domain containing r0 (after mirroring).
    Lr: f64,
    /// Length of the other sub-domain.
    Ll: f64,
    /// Distance from r0 to the sink.
    L0: f64,
    /// Characteristic diffusion time of the whole interval.
    t_scale: f64,
    /// Cached wavenumbers q_i, strictly increasing, append-only.
    roots: Vec<f64>,
    /// Progression bookkeeping, in dimensionless x = qL space.
    last_long_root: f64,
    last_short_root: f64,
    last_was_long: bool,
    /// Brackets that stayed parity-inconsistent after the shrink loop.
    bracket_failures: usize,
}

impl GreensFunction1DAbsSinkAbs {
    /// A Green's function for diffusion constant `D`, sink strength `k` at
    /// `rsink`, start position `r0`, and absorbing boundaries `sigma < a`.
    pub fn new(D: f64, k: f64, r0: f64, rsink: f64, sigma: f64, a: f64) -> Result<Self> {
        if D < 0.0 || k < 0.0 {
            return Err(GfrdError::illegal_argument(format!(
                "D and k must be non-negative (D = {D}, k = {k})"
            )));
        }
        if !(sigma <= r0.min(rsink) && r0.max(rsink) <= a) {
            return Err(GfrdError::illegal_argument(format!(
                "positions must satisfy sigma <= r0, rsink <= a \
                 (sigma = {sigma}, r0 = {r0}, rsink = {rsink}, a = {a})"
            )));
        }

        // Mirror the domain around the sink when r0 lies left of it, so the
        // sub-domain containing r0 is always the "r" side.
        let (Lr, Ll) = if r0 >= rsink {
            (a - rsink, rsink - sigma)
        } else {
            (rsink - sigma, a - rsink)
        };
        let L0 = (r0 - rsink).abs();
        let width = a - sigma;
        let t_scale = if D > 0.0 {
            width * width / D
        } else {
            f64::INFINITY
        };

        Ok(Self {
            D,
            k,
            r0,
            rsink,
            sigma,
            a,
            Lr,
            Ll,
            L0,
            t_scale,
            roots: Vec::new(),
            last_long_root: 0.0,
            last_short_root: 0.0,
            last_was_long: false,
            bracket_failures: 0,
        })
    }

    pub fn D(&self) -> f64 {
        self.D
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn r0(&self) -> f64 {
        self.r0
    }

    pub fn r_sink(&self) -> f64 {
        self.rsink
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    fn L(&self) -> f64 {
        self.Lr + self.Ll
    }

    /// Number of roots cached so far.
    pub fn num_cached_roots(&self) -> usize {
        self.roots.len()
    }

    /// The cached wavenumbers, ascending.
    pub fn cached_roots(&self) -> &[f64] {
        &self.roots
    }

    /// How many root brackets could not be made parity-consistent. Healthy
    /// runs keep this at zero.
    pub fn bracket_failures(&self) -> usize {
        self.bracket_failures
    }

    // ------------------------------------------------------------------
    // Root enumeration.
    // ------------------------------------------------------------------

    /// Root condition in dimensionless x = qL.
    fn root_f(x: f64, Lm_L: f64, h: f64) -> f64 {
        x * x.sin() + h * ((x * Lm_L).cos() - x.cos())
    }

    /// Extend the cache to at least `n` roots.
    fn calculate_roots(&mut self, n: usize) -> Result<()> {
        if self.roots.len() >= n {
            return Ok(());
        }

        let L = self.L();
        let Lm_L = (self.Lr - self.Ll) / L;
        let h = self.k * L / (2.0 * self.D);
        let long_period = (L / self.Lr).max(L / self.Ll) * PI;
        let short_period = (L / self.Lr).min(L / self.Ll) * PI;

        while self.roots.len() < n {
            let root_n = self.last_long_root.max(self.last_short_root);
            let last_root = if root_n == 0.0 { PI } else { root_n };

            let lower = root_n + 1000.0 * EPSILON;

            // Estimate the next root from the progressions and derive the
            // upper bracket and the shrink step for parity repair.
            let (mut upper, shrink_delta) = if h / last_root < 1.0 {
                // Sink term negligible: the roots settle onto a pi-ladder.
                let est = root_n + PI;
                (est + BRACKET_SAFETY * PI, 0.1 * PI)
            } else {
                let next_long = self.last_long_root + long_period;
                let next_short = self.last_short_root + short_period;
                let est_min = next_long.min(next_short);
                let gap = (next_long - next_short).abs();

                if gap < 2.0 * est_min / h {
                    // Near-degenerate ladders (Lr close to Ll): a pair of
                    // roots sits around the common estimate, split by about
                    // 2 est / h. Bracket strictly below the estimate to
                    // pick up the split-off member first; its partner is
                    // found by the regular path on the next iteration.
                    self.last_was_long = next_long <= next_short;
                    (est_min * (1.0 - 1e-12), 0.0)
                } else if next_long < next_short {
                    self.last_was_long = true;
                    let right_offset = (next_short - next_long).min(long_period);
                    let left_offset = next_long - lower;
                    (
                        next_long + BRACKET_SAFETY * right_offset,
                        0.1 * left_offset.min(right_offset),
                    )
                } else {
                    self.last_was_long = false;
                    let right_offset = (next_long - next_short).min(short_period);
                    let left_offset = next_short - lower;
                    (
                        next_short + BRACKET_SAFETY * right_offset,
                        0.1 * left_offset.min(right_offset),
                    )
                }
            };

            let f = |x: f64| Self::root_f(x, Lm_L, h);

            // Consecutive simple roots alternate the sign of f at the left
            // bracket; the (i+1)-th root (0-based i cached) has parity
            // (-1)^(i+1).
            let parity = if self.roots.len() % 2 == 0 { -1.0 } else { 1.0 };

            let f_lower = f(lower);
            let mut f_upper = f(upper);

            if f_lower * parity > 0.0 {
                log::warn!(
                    "parity mismatch at lower bracket of root #{}: f({lower:e}) = {f_lower:e}",
                    self.roots.len() + 1
                );
            }

            if f_upper * parity < 0.0 && shrink_delta > 0.0 {
                // The upper bracket overshot past the next root; walk it
                // back.
                let mut attempts = 0;
                while f_upper * parity < 0.0 && attempts < MAX_BRACKET_SHRINKS {
                    upper -= shrink_delta;
                    f_upper = f(upper);
                    attempts += 1;
                }
                if f_upper * parity < 0.0 {
                    self.bracket_failures += 1;
                    log::warn!(
                        "failed to straddle root #{}: f({lower:e}) = {f_lower:e}, \
                         f({upper:e}) = {f_upper:e}",
                        self.roots.len() + 1
                    );
                }
            }

            let x = find_root_brent(f, lower, upper, EPSILON, EPSILON, "abs_sink_abs::root_f")?;

            debug_assert!(
                x > root_n - EPSILON,
                "root sequence must be increasing: {x} after {root_n}"
            );

            self.roots.push(x / L);
            if self.last_was_long {
                self.last_long_root = x;
            } else {
                self.last_short_root = x;
            }
            log::trace!("root #{}: q = {:e}", self.roots.len(), x / L);
        }

        Ok(())
    }

    /// The i-th cached root, extending the cache as needed.
    fn get_root(&mut self, i: usize) -> Result<f64> {
        if self.roots.len() <= i {
            self.calculate_roots(i + 1)?;
        }
        Ok(self.roots[i])
    }

    /// Estimate of the number of eigenmodes needed for the series to
    /// converge at time `t`. Requires at least one cached root.
    fn guess_maxi(&mut self, t: f64) -> Result<usize> {
        if t.is_infinite() {
            return Ok(SAFETY_TERMS);
        }

        let root0 = self.get_root(0)?;
        let Dt = self.D * t;
        if Dt <= 0.0 {
            return Ok(MAX_TERMS);
        }

        let thr = (-Dt * root0 * root0).exp() * EPSILON * 1e-1;
        if thr <= 0.0 {
            return Ok(MAX_TERMS);
        }

        let max_root = (root0 * root0 - thr.ln() / Dt).sqrt();
        let maxi = ((max_root * self.L() / PI) as usize).saturating_add(SAFETY_TERMS);
        Ok(maxi.min(MAX_TERMS))
    }

    /// Same estimate without touching the cache; the first root must
    /// already be present.
    fn guess_maxi_cached(&self, t: f64) -> usize {
        if t.is_infinite() || self.roots.is_empty() {
            return SAFETY_TERMS;
        }
        let root0 = self.roots[0];
        let Dt = self.D * t;
        if Dt <= 0.0 {
            return MAX_TERMS;
        }
        let thr = (-Dt * root0 * root0).exp() * EPSILON * 1e-1;
        if thr <= 0.0 {
            return MAX_TERMS;
        }
        let max_root = (root0 * root0 - thr.ln() / Dt).sqrt();
        ((max_root * self.L() / PI) as usize)
            .saturating_add(SAFETY_TERMS)
            .min(MAX_TERMS)
    }

    // ------------------------------------------------------------------
    // Series building blocks.
    // ------------------------------------------------------------------

    /// Eigenseries denominator for root q.
    fn p_denominator_i(&self, q: f64) -> f64 {
        let L = self.L();
        let Lm = self.Lr - self.Ll;
        let term1 = q * L * (q * L).cos() + (q * L).sin();
        let term2 = L * (q * L).sin() - Lm * (q * Lm).sin();
        self.D * term1 + self.k / 2.0 * term2
    }

    /// exp(-D q^2 t) over the denominator.
    fn p_exp_den_i(&self, t: f64, q: f64) -> f64 {
        (-self.D * q * q * t).exp() / self.p_denominator_i(q)
    }

    /// Time-independent factor of the i-th survival term.
    fn p_survival_table_i(&self, q: f64) -> f64 {
        let Lr = self.Lr;
        let Ll = self.Ll;
        let L0 = self.L0;
        let L = self.L();
        let LrmL0 = Lr - L0;

        let term1 = (q * L).sin() - (q * LrmL0).sin() - (q * (Ll + L0)).sin();
        let term2 = (q * Lr).sin() - (q * L0).sin() - (q * LrmL0).sin();

        let numerator = 2.0 * (self.D * term1 + self.k * (q * Ll).sin() * term2 / q);
        numerator / self.p_denominator_i(q)
    }

    /// Extend the table of time-independent survival factors to `maxi`
    /// entries. Roots must already be cached that far.
    fn extend_psurv_table(&self, table: &mut Vec<f64>, maxi: usize) {
        while table.len() < maxi {
            table.push(self.p_survival_table_i(self.roots[table.len()]));
        }
    }

    /// Survival probability via a caller-owned factor table, extending the
    /// root cache and the table as needed.
    fn p_survival_table(&mut self, t: f64, table: &mut Vec<f64>) -> Result<f64> {
        if t == 0.0 || self.D == 0.0 {
            // The particle has not moved.
            return Ok(1.0);
        }

        let maxi = self.guess_maxi(t)?;
        if table.len() < maxi {
            self.calculate_roots(maxi)?;
            self.extend_psurv_table(table, maxi);
        }
        Ok(self.p_survival_cached(t, table))
    }

    /// Survival from pre-built tables only; never extends the cache.
    fn p_survival_cached(&self, t: f64, table: &[f64]) -> f64 {
        let maxi = self.guess_maxi_cached(t).min(table.len());
        let roots = &self.roots;
        let D = self.D;
        func_sum_all(
            |i| {
                let q = roots[i];
                (-D * q * q * t).exp() * table[i]
            },
            maxi,
            EPSILON,
        )
    }

    // ------------------------------------------------------------------
    // Observables.
    // ------------------------------------------------------------------

    /// Survival probability S(t): the chance the particle has neither been
    /// absorbed nor reacted by time t.
    pub fn p_survival(&mut self, t: f64) -> Result<f64> {
        if t < 0.0 {
            return Err(GfrdError::illegal_argument(format!("t must be >= 0, got {t}")));
        }
        let mut table = Vec::new();
        self.p_survival_table(t, &mut table)
    }

    /// i-th eigenterm of the density in the sub-domain containing r0.
    /// `rr` is the sink-relative coordinate, already mirrored.
    fn prob_r_r0_i(&self, i: usize, rr: f64, t: f64) -> f64 {
        let q = self.roots[i];
        let (near, far) = if rr < self.L0 {
            (rr, self.L0)
        } else {
            (self.L0, rr)
        };

        let numerator = (self.D * q * (q * (self.Ll + near)).sin()
            + self.k * (q * self.Ll).sin() * (q * near).sin())
            * (q * (self.Lr - far)).sin();

        -2.0 * self.p_exp_den_i(t, q) * numerator
    }

    /// i-th eigenterm of the density in the sub-domain not containing r0.
    fn prob_r_nor0_i(&self, i: usize, rr: f64, t: f64) -> f64 {
        let q = self.roots[i];
        let numerator =
            self.D * q * (q * (self.Ll + rr)).sin() * (q * (self.Lr - self.L0)).sin();

        -2.0 * self.p_exp_den_i(t, q) * numerator
    }

    /// Probability density of finding the particle at `r` at time `t`.
    pub fn prob_r(&mut self, r: f64, t: f64) -> Result<f64> {
        if t < 0.0 {
            return Err(GfrdError::illegal_argument(format!("t must be >= 0, got {t}")));
        }
        if r < self.sigma || r > self.a {
            return Err(GfrdError::illegal_argument(format!(
                "r must lie in [{}, {}], got {r}",
                self.sigma, self.a
            )));
        }

        let L = self.L();

        // No time or no diffusion: the density is still a delta at r0.
        if t == 0.0 || self.D == 0.0 {
            return Ok(if r == self.r0 { f64::INFINITY } else { 0.0 });
        }

        // Density vanishes on the absorbing boundaries.
        if (self.a - r).abs() < EPSILON * L || (r - self.sigma).abs() < EPSILON * L {
            return Ok(0.0);
        }

        let rr = if self.r0 >= self.rsink {
            r - self.rsink
        } else {
            self.rsink - r
        };

        let maxi = self.guess_maxi(t)?;
        self.calculate_roots(maxi)?;

        let p = if rr >= 0.0 {
            func_sum_all(|i| self.prob_r_r0_i(i, rr, t), maxi, EPSILON)
        } else {
            func_sum_all(|i| self.prob_r_nor0_i(i, rr, t), maxi, EPSILON)
        };
        Ok(p)
    }

    /// Density conditioned on survival.
    pub fn calc_p_cum(&mut self, r: f64, t: f64) -> Result<f64> {
        Ok(self.prob_r(r, t)? / self.p_survival(t)?)
    }

    /// Total probability flux leaving the domain at time t
    /// (`-dS/dt`).
    pub fn flux_tot(&mut self, t: f64) -> Result<f64> {
        if t < 0.0 {
            return Err(GfrdError::illegal_argument(format!("t must be >= 0, got {t}")));
        }
        if t == 0.0 || self.D == 0.0 {
            return Ok(0.0);
        }

        let maxi = self.guess_maxi(t)?;
        self.calculate_roots(maxi)?;

        let sum = func_sum_all(
            |i| {
                let q = self.roots[i];
                q * q * (-self.D * q * q * t).exp() * self.p_survival_table_i(q)
            },
            maxi,
            EPSILON,
        );
        Ok(self.D * sum)
    }

    /// Flux into the sink at time t.
    pub fn flux_sink(&mut self, t: f64) -> Result<f64> {
        Ok(self.k * self.prob_r(self.rsink, t)?)
    }

    /// Outflux through the absorbing boundary of the sub-domain containing
    /// r0.
    fn flux_abs_Lr(&mut self, t: f64, maxi: usize) -> f64 {
        let sum = func_sum_all(
            |i| {
                let q = self.roots[i];
                let numerator = q
                    * (self.k * (q * self.Ll).sin() * (q * self.L0).sin()
                        + self.D * q * (q * (self.Ll + self.L0)).sin());
                self.p_exp_den_i(t, q) * numerator
            },
            maxi,
            EPSILON,
        );
        -2.0 * self.D * sum
    }

    /// Outflux through the absorbing boundary of the other sub-domain.
    fn flux_abs_Ll(&mut self, t: f64, maxi: usize) -> f64 {
        let sum = func_sum_all(
            |i| {
                let q = self.roots[i];
                let numerator = q * q * (q * (self.Lr - self.L0)).sin();
                self.p_exp_den_i(t, q) * numerator
            },
            maxi,
            EPSILON,
        );
        -2.0 * self.D * self.D * sum
    }

    /// Flux leaving through the left absorbing boundary `sigma`.
    pub fn flux_leaves(&mut self, t: f64) -> Result<f64> {
        if t <= 0.0 || self.D == 0.0 {
            return Ok(0.0);
        }
        let maxi = self.guess_maxi(t)?;
        self.calculate_roots(maxi)?;
        Ok(if self.r0 >= self.rsink {
            self.flux_abs_Ll(t, maxi)
        } else {
            self.flux_abs_Lr(t, maxi)
        })
    }

    /// Flux leaving through the right absorbing boundary `a`.
    pub fn flux_leavea(&mut self, t: f64) -> Result<f64> {
        if t <= 0.0 || self.D == 0.0 {
            return Ok(0.0);
        }
        let maxi = self.guess_maxi(t)?;
        self.calculate_roots(maxi)?;
        Ok(if self.r0 >= self.rsink {
            self.flux_abs_Lr(t, maxi)
        } else {
            self.flux_abs_Ll(t, maxi)
        })
    }

    // ------------------------------------------------------------------
    // Spatial CDF.
    // ------------------------------------------------------------------

    /// Integrated density over `(-Ll, rr]` for rr in the left sub-domain.
    fn p_int_r_left_i(&self, i: usize, rr: f64, table: &[f64]) -> f64 {
        let q = self.roots[i];
        let temp = self.D
            * (q * (self.Lr - self.L0)).sin()
            * ((q * (self.Ll + rr)).cos() - 1.0);
        table[i] * temp
    }

    /// Integrated density for rr between the sink and r0.
    fn p_int_r_right_a_i(&self, i: usize, rr: f64, table: &[f64]) -> f64 {
        let q = self.roots[i];
        let temp = self.D * ((q * (self.Ll + rr)).cos() - 1.0)
            + self.k / q * ((q * rr).cos() - 1.0) * (q * self.Ll).sin();
        table[i] * (q * (self.Lr - self.L0)).sin() * temp
    }

    /// Integrated density for rr beyond r0.
    fn p_int_r_right_b_i(&self, i: usize, rr: f64, table: &[f64]) -> f64 {
        let q = self.roots[i];
        let Lr = self.Lr;
        let Ll = self.Ll;
        let L0 = self.L0;
        let L = self.L();
        let Lrmrr = Lr - rr;

        let term1 = (q * L).sin()
            - (q * (Lr - L0)).sin()
            - (q * (Ll + L0)).sin() * (q * Lrmrr).cos();
        let term2 = (q * Lr).sin()
            - (q * (Lr - L0)).sin()
            - (q * L0).sin() * (q * Lrmrr).cos();

        let temp = self.D * term1 + self.k * (q * Ll).sin() * term2 / q;
        table[i] * temp
    }

    /// CDF value from a pre-built exp/denominator table.
    fn p_int_r_from_table(&self, r: f64, table: &[f64]) -> f64 {
        let rr = if self.r0 >= self.rsink {
            r - self.rsink
        } else {
            self.rsink - r
        };

        let sum = if rr <= 0.0 {
            func_sum_all(|i| self.p_int_r_left_i(i, rr, table), table.len(), EPSILON)
        } else if rr < self.L0 {
            func_sum_all(|i| self.p_int_r_right_a_i(i, rr, table), table.len(), EPSILON)
        } else {
            func_sum_all(|i| self.p_int_r_right_b_i(i, rr, table), table.len(), EPSILON)
        };
        2.0 * sum
    }

    fn create_p_int_r_table(&mut self, t: f64) -> Result<Vec<f64>> {
        let maxi = self.guess_maxi(t)?;
        self.calculate_roots(maxi)?;
        Ok((0..maxi)
            .map(|i| self.p_exp_den_i(t, self.roots[i]))
            .collect())
    }

    /// Cumulative spatial distribution over `[sigma, r]`, normalized by
    /// survival.
    pub fn p_int_r(&mut self, r: f64, t: f64) -> Result<f64> {
        if t < 0.0 {
            return Err(GfrdError::illegal_argument(format!("t must be >= 0, got {t}")));
        }
        if r < self.sigma || r > self.a {
            return Err(GfrdError::illegal_argument(format!(
                "r must lie in [{}, {}], got {r}",
                self.sigma, self.a
            )));
        }
        if t == 0.0 || self.D == 0.0 {
            // Step function around the delta at r0.
            return Ok(if r < self.r0 { 0.0 } else { 1.0 });
        }

        let table = self.create_p_int_r_table(t)?;
        let survival = self.p_survival(t)?;
        Ok(self.p_int_r_from_table(r, &table) / survival)
    }

    // ------------------------------------------------------------------
    // Event sampling.
    // ------------------------------------------------------------------

    /// Draw the first-passage time from the survival probability by
    /// inverting `S(t) = rnd`.
    pub fn draw_time(&mut self, rnd: f64) -> Result<f64> {
        if !(0.0..1.0).contains(&rnd) {
            return Err(GfrdError::illegal_argument(format!(
                "rnd must lie in [0, 1), got {rnd}"
            )));
        }

        let L = self.L();

        if self.D == 0.0 || L.is_infinite() {
            return Ok(f64::INFINITY);
        }
        if rnd <= EPSILON
            || L < 0.0
            || (self.a - self.r0).abs() < EPSILON * L
            || (self.r0 - self.sigma).abs() < EPSILON * L
        {
            // Starting on an absorbing boundary means immediate exit.
            return Ok(0.0);
        }

        // Seed the bracket from the shortest relevant diffusion length:
        // distance to either boundary, or to the sink when off it.
        let mut dist = (self.Lr - self.L0).min(self.Ll + self.L0);
        if self.L0 > 0.0 {
            dist = dist.min(self.L0);
        }
        let t_guess = 0.1 * dist * dist / (2.0 * self.D);

        let maxi = self.guess_maxi(t_guess)?;
        self.calculate_roots(maxi)?;

        let mut table = Vec::new();
        let mut value = rnd - self.p_survival_table(t_guess, &mut table)?;
        let mut low = t_guess;
        let mut high = t_guess;

        if value < 0.0 {
            // Sample falls later than the guess: inflate the upper bound
            // until the survival drops below it.
            loop {
                high *= 10.0;
                value = rnd - self.p_survival_table(high, &mut table)?;
                if value >= 0.0 {
                    break;
                }
                if high.abs() >= t_guess * 1e6 {
                    log::error!(
                        "draw_time: could not adjust high, F({high:e}) = {value:e}, rnd = {rnd}"
                    );
                    return Err(GfrdError::numerical(format!(
                        "draw_time: survival did not drop below the sample by t = {high:e}"
                    )));
                }
            }
        } else {
            // Sample falls earlier: deflate the lower bound. A plateau in
            // the survival (or hitting the resolution floor) ends the
            // search at the current best.
            let mut value_prev = 2.0;
            loop {
                if low.abs() <= t_guess * 1e-6 || (value - value_prev).abs() < EPSILON {
                    log::warn!(
                        "draw_time: could not adjust low, F({low:e}) = {value:e}, \
                         t_guess = {t_guess:e}, rnd = {rnd}"
                    );
                    return Ok(low);
                }
                value_prev = value;
                low *= 0.1;
                value = rnd - self.p_survival_table(low, &mut table)?;
                if value <= 0.0 {
                    break;
                }
            }
        }

        // Everything t >= low needs at most the modes low needs; freeze the
        // tables so the solve itself cannot fail.
        let maxi_low = self.guess_maxi(low)?;
        self.calculate_roots(maxi_low)?;
        self.extend_psurv_table(&mut table, maxi_low);

        find_root_brent(
            |t| rnd - self.p_survival_cached(t, &table),
            low,
            high,
            EPSILON * self.t_scale,
            EPSILON,
            "abs_sink_abs::draw_time",
        )
    }

    /// Decide whether the event at time `t` was an escape through a
    /// boundary or a reaction at the sink, from the flux ratio.
    pub fn draw_event_type(&mut self, rnd: f64, t: f64) -> Result<EventKind> {
        if !(0.0..1.0).contains(&rnd) {
            return Err(GfrdError::illegal_argument(format!(
                "rnd must lie in [0, 1), got {rnd}"
            )));
        }
        if t <= 0.0 {
            return Err(GfrdError::illegal_argument(format!("t must be > 0, got {t}")));
        }

        let L = self.a - self.sigma;

        // An impermeable sink, or a particle starting on an absorbing
        // boundary, can only escape.
        if self.k == 0.0
            || (self.a - self.r0).abs() < EPSILON * L
            || (self.sigma - self.r0).abs() < EPSILON * L
        {
            return Ok(EventKind::Escape);
        }

        let scaled = rnd * self.flux_tot(t)?;
        if scaled < self.flux_sink(t)? {
            Ok(EventKind::Reaction)
        } else {
            Ok(EventKind::Escape)
        }
    }

    /// Draw the particle position at time `t`, conditioned on survival, by
    /// inverting the spatial CDF.
    pub fn draw_r(&mut self, rnd: f64, t: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&rnd) {
            return Err(GfrdError::illegal_argument(format!(
                "rnd must lie in [0, 1], got {rnd}"
            )));
        }
        if t < 0.0 {
            return Err(GfrdError::illegal_argument(format!("t must be >= 0, got {t}")));
        }

        let L = self.L();

        if t == 0.0 || self.D == 0.0 {
            // No motion yet.
            return Ok(self.r0);
        }
        if L < 0.0 {
            return Ok(0.0);
        }
        if rnd <= EPSILON {
            return Ok(self.sigma);
        }
        if rnd >= 1.0 - EPSILON {
            return Ok(self.a);
        }

        let survival = self.p_survival(t)?;
        let table = self.create_p_int_r_table(t)?;
        let target = rnd * survival;

        find_root_brent(
            |r| self.p_int_r_from_table(r, &table) - target,
            self.sigma,
            self.a,
            EPSILON * L,
            EPSILON,
            "abs_sink_abs::draw_r",
        )
    }

    /// Human-readable parameter dump.
    pub fn dump(&self) -> String {
        format!(
            "D = {}, sigma = {}, a = {}, r0 = {}, rsink = {}, k = {}",
            self.D, self.sigma, self.a, self.r0, self.rsink, self.k
        )
    }
}

impl fmt::Display for GreensFunction1DAbsSinkAbs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symmetric_no_sink() -> GreensFunction1DAbsSinkAbs {
        GreensFunction1DAbsSinkAbs::new(1.0, 0.0, 1.0, 1.0, 0.0, 2.0).unwrap()
    }

    #[test]
    fn test_constructor_validates_ordering() {
        assert!(GreensFunction1DAbsSinkAbs::new(1.0, 1.0, 3.0, 1.0, 0.0, 2.0).is_err());
        assert!(GreensFunction1DAbsSinkAbs::new(1.0, 1.0, -0.5, 1.0, 0.0, 2.0).is_err());
        assert!(GreensFunction1DAbsSinkAbs::new(-1.0, 1.0, 1.0, 1.0, 0.0, 2.0).is_err());
    }

    #[test]
    fn test_no_sink_roots_are_pi_ladder() {
        // With k = 0 the condition reduces to x sin x = 0: x_i = i pi,
        // q_i = i pi / L.
        let mut gf = symmetric_no_sink();
        gf.calculate_roots(6).unwrap();
        for (i, q) in gf.roots.iter().enumerate() {
            let expected = (i as f64 + 1.0) * PI / 2.0;
            assert!(
                (q - expected).abs() < 1e-8,
                "root {i}: expected {expected}, got {q}"
            );
        }
    }

    #[test]
    fn test_root_cache_is_append_only_and_increasing() {
        let mut gf = GreensFunction1DAbsSinkAbs::new(1.0, 25.0, 0.6, 0.4, 0.0, 1.5).unwrap();
        gf.calculate_roots(5).unwrap();
        let first: Vec<f64> = gf.roots.clone();
        gf.calculate_roots(12).unwrap();
        assert_eq!(&gf.roots[..5], &first[..]);
        for pair in gf.roots.windows(2) {
            assert!(pair[0] < pair[1], "roots must increase: {pair:?}");
        }
    }

    #[test]
    fn test_survival_at_zero_is_one() {
        let mut gf = symmetric_no_sink();
        assert_eq!(gf.p_survival(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_survival_known_value() {
        // Exact abs-abs series for D=1, interval [0,2], start at the
        // center, t=0.1:
        //   S = sum_odd 4/(n pi) sin(n pi/2) exp(-n^2 pi^2 t / 4)
        //     = 0.99484 - 0.04606 + 0.00053 - ... = 0.9493
        let mut gf = symmetric_no_sink();
        let s = gf.p_survival(0.1).unwrap();
        assert!((s - 0.9493).abs() < 2e-4, "S(0.1) = {s}");
    }

    #[test]
    fn test_flux_identity_no_sink() {
        let mut gf = symmetric_no_sink();
        let t = 0.05;
        let tot = gf.flux_tot(t).unwrap();
        let sum = gf.flux_leaves(t).unwrap() + gf.flux_leavea(t).unwrap()
            + gf.flux_sink(t).unwrap();
        assert!(
            ((sum - tot) / tot).abs() < 1e-8,
            "flux identity violated: {sum} vs {tot}"
        );
    }

    #[test]
    fn test_draw_time_deterministic_edges() {
        let mut gf = symmetric_no_sink();
        assert_eq!(gf.draw_time(0.0).unwrap(), 0.0);

        let mut frozen = GreensFunction1DAbsSinkAbs::new(0.0, 0.0, 1.0, 1.0, 0.0, 2.0).unwrap();
        assert!(frozen.draw_time(0.5).unwrap().is_infinite());
    }

    #[test]
    fn test_draw_r_deterministic_edges() {
        let mut gf = symmetric_no_sink();
        assert_eq!(gf.draw_r(0.5, 0.0).unwrap(), 1.0);
        assert_eq!(gf.draw_r(0.0, 0.1).unwrap(), 0.0);
        assert_eq!(gf.draw_r(1.0, 0.1).unwrap(), 2.0);
    }

    #[test]
    fn test_event_type_without_sink_is_escape() {
        let mut gf = symmetric_no_sink();
        for rnd in [0.0, 0.3, 0.999_999] {
            assert_eq!(gf.draw_event_type(rnd, 0.1).unwrap(), EventKind::Escape);
        }
    }

    #[test]
    fn test_illegal_arguments_are_rejected() {
        let mut gf = symmetric_no_sink();
        assert!(gf.draw_time(1.5).is_err());
        assert!(gf.draw_time(-0.1).is_err());
        assert!(gf.draw_r(0.5, -1.0).is_err());
        assert!(gf.draw_event_type(0.5, 0.0).is_err());
        assert!(gf.prob_r(5.0, 0.1).is_err());
    }
}
