/// solver.rs — Constrained Nonlinear Minimization (Nelder-Mead)
///
/// ─────────────────────────────────────────────────────────────────────────
/// The GARCH fitter needs a derivative-free minimizer for the negative
/// log-likelihood.  The solver is kept behind the `CostFunction` seam so
/// any constrained nonlinear solver can be substituted; constraints are
/// expressed by the objective itself (infeasible points return a large
/// penalty cost, which the simplex walks away from).
///
/// Simplex moves (standard coefficients):
///   reflection ρ = 1, expansion χ = 2, contraction γ = 0.5, shrink σ = 0.5
///
/// Convergence: standard deviation of the vertex costs < `sd_tolerance`.
/// Budget exhaustion surfaces as `RiskError::Convergence` — never a
/// silently returned best-so-far point.
/// ─────────────────────────────────────────────────────────────────────────
use ndarray::Array1;

use crate::error::{Result, RiskError};

/// Objective to be minimized. Infeasible parameter vectors should return a
/// large finite penalty rather than NaN.
pub trait CostFunction {
    fn cost(&self, x: &Array1<f64>) -> f64;
}

#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Iteration budget; exceeding it is a `Convergence` error.
    pub max_iters: usize,
    /// Converged when std-dev of vertex costs drops below this.
    pub sd_tolerance: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iters: 5000,
            sd_tolerance: 1e-10,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }
}

impl NelderMead {
    pub fn new(max_iters: usize, sd_tolerance: f64) -> Self {
        Self { max_iters, sd_tolerance, ..Self::default() }
    }

    /// Minimize `f` starting from `x0`.
    ///
    /// The initial simplex is `x0` plus one vertex per dimension with that
    /// coordinate perturbed by 5% (or by 2.5e-4 absolute when it is ~0).
    pub fn minimize<C: CostFunction>(&self, f: &C, x0: Array1<f64>) -> Result<Array1<f64>> {
        let dim = x0.len();
        if dim == 0 {
            return Err(RiskError::invalid_data("empty initial guess"));
        }

        // ── Initial simplex ──────────────────────────────────────────────
        let mut vertices: Vec<(Array1<f64>, f64)> = Vec::with_capacity(dim + 1);
        let c0 = f.cost(&x0);
        vertices.push((x0.clone(), c0));
        for i in 0..dim {
            let mut v = x0.clone();
            if v[i].abs() > 1e-8 {
                v[i] *= 1.05;
            } else {
                v[i] = 2.5e-4;
            }
            let c = f.cost(&v);
            vertices.push((v, c));
        }

        for _iter in 0..self.max_iters {
            vertices.sort_by(|a, b| a.1.total_cmp(&b.1));

            if cost_sd(&vertices) < self.sd_tolerance {
                return Ok(vertices[0].0.clone());
            }

            // Centroid of all vertices except the worst
            let mut centroid = Array1::<f64>::zeros(dim);
            for (v, _) in &vertices[..dim] {
                centroid += v;
            }
            centroid /= dim as f64;

            let (worst, f_worst) = {
                let w = &vertices[dim];
                (w.0.clone(), w.1)
            };
            let f_best = vertices[0].1;
            let f_second_worst = vertices[dim - 1].1;

            // ── Reflection ───────────────────────────────────────────────
            let xr = &centroid + &((&centroid - &worst) * self.reflection);
            let f_r = f.cost(&xr);

            if f_r < f_best {
                // ── Expansion ────────────────────────────────────────────
                let xe = &centroid + &((&xr - &centroid) * self.expansion);
                let f_e = f.cost(&xe);
                vertices[dim] = if f_e < f_r { (xe, f_e) } else { (xr, f_r) };
            } else if f_r < f_second_worst {
                vertices[dim] = (xr, f_r);
            } else if f_r < f_worst {
                // ── Outside contraction ──────────────────────────────────
                let xc = &centroid + &((&xr - &centroid) * self.contraction);
                let f_c = f.cost(&xc);
                if f_c <= f_r {
                    vertices[dim] = (xc, f_c);
                } else {
                    shrink_simplex(&mut vertices, self.shrink, f);
                }
            } else {
                // ── Inside contraction ───────────────────────────────────
                let xc = &centroid - &((&centroid - &worst) * self.contraction);
                let f_c = f.cost(&xc);
                if f_c < f_worst {
                    vertices[dim] = (xc, f_c);
                } else {
                    shrink_simplex(&mut vertices, self.shrink, f);
                }
            }
        }

        Err(RiskError::convergence(format!(
            "simplex did not reach sd tolerance {:.1e} within {} iterations",
            self.sd_tolerance, self.max_iters
        )))
    }
}

fn shrink_simplex<C: CostFunction>(vertices: &mut [(Array1<f64>, f64)], sigma: f64, f: &C) {
    let best = vertices[0].0.clone();
    for v in vertices.iter_mut().skip(1) {
        v.0 = &best + &((&v.0 - &best) * sigma);
        v.1 = f.cost(&v.0);
    }
}

fn cost_sd(vertices: &[(Array1<f64>, f64)]) -> f64 {
    let n = vertices.len() as f64;
    let m = vertices.iter().map(|v| v.1).sum::<f64>() / n;
    (vertices.iter().map(|v| (v.1 - m).powi(2)).sum::<f64>() / n).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// f(x, y) = (x − 3)² + 2·(y + 1)², minimum at (3, −1).
    struct Quadratic;

    impl CostFunction for Quadratic {
        fn cost(&self, x: &Array1<f64>) -> f64 {
            (x[0] - 3.0).powi(2) + 2.0 * (x[1] + 1.0).powi(2)
        }
    }

    /// Quadratic with a penalty barrier at x < 0, forcing a boundary optimum.
    struct Constrained;

    impl CostFunction for Constrained {
        fn cost(&self, x: &Array1<f64>) -> f64 {
            if x[0] < 0.0 {
                return 1e12;
            }
            (x[0] + 2.0).powi(2)
        }
    }

    #[test]
    fn finds_quadratic_minimum() {
        let solver = NelderMead::default();
        let x = solver.minimize(&Quadratic, array![0.0, 0.0]).unwrap();
        assert!((x[0] - 3.0).abs() < 1e-4, "x = {x}");
        assert!((x[1] + 1.0).abs() < 1e-4, "x = {x}");
    }

    #[test]
    fn respects_penalty_barrier() {
        let solver = NelderMead::default();
        let x = solver.minimize(&Constrained, array![1.0]).unwrap();
        // Unconstrained optimum is −2; the barrier pins it at ~0.
        assert!(x[0] >= 0.0);
        assert!(x[0] < 1e-3, "x = {x}");
    }

    #[test]
    fn exhausted_budget_is_convergence_error() {
        let solver = NelderMead::new(2, 1e-16);
        let err = solver.minimize(&Quadratic, array![50.0, 50.0]).unwrap_err();
        assert!(matches!(err, RiskError::Convergence { .. }));
    }
}
