use ndarray::{Array1, Array2, Axis};

use crate::linalg::solve_least_squares;

/// Lawson-Hanson active-set non-negative least squares: minimizes
/// `||a z - b||` subject to `z >= 0`. Used for the `nnls` initial-guess
/// method, where the coefficient matrix is underdetermined (fewer
/// equations than unknowns); the active-set subproblems are still solved
/// by ordinary least squares over whatever columns are currently free.
pub fn nnls(a: &Array2<f64>, b: &Array1<f64>, max_iters: usize) -> Array1<f64> {
    let n = a.ncols();
    let mut x = Array1::<f64>::zeros(n);
    let mut passive: Vec<bool> = vec![false; n];

    for _ in 0..max_iters {
        let residual = b - &a.dot(&x);
        let w = a.t().dot(&residual);

        let mut best: Option<(usize, f64)> = None;
        for j in 0..n {
            if passive[j] {
                continue;
            }
            if best.is_none_or(|(_, bw)| w[j] > bw) {
                best = Some((j, w[j]));
            }
        }
        let Some((j, wj)) = best else { break };
        if wj <= 1e-10 {
            break;
        }
        passive[j] = true;

        loop {
            let cols: Vec<usize> = (0..n).filter(|&k| passive[k]).collect();
            let sub_a = a.select(Axis(1), &cols);
            let Some(z_sub) = solve_least_squares(&sub_a, b) else {
                // Singular subproblem: drop the most recently activated column and retry.
                passive[j] = false;
                break;
            };

            if z_sub.iter().all(|&v| v > 1e-12) {
                for (idx, &k) in cols.iter().enumerate() {
                    x[k] = z_sub[idx];
                }
                break;
            }

            let mut alpha = f64::INFINITY;
            for (idx, &k) in cols.iter().enumerate() {
                if z_sub[idx] <= 1e-12 {
                    let candidate = x[k] / (x[k] - z_sub[idx]);
                    if candidate < alpha {
                        alpha = candidate;
                    }
                }
            }
            if !alpha.is_finite() {
                alpha = 0.0;
            }

            for (idx, &k) in cols.iter().enumerate() {
                x[k] += alpha * (z_sub[idx] - x[k]);
            }
            for &k in &cols {
                if x[k] <= 1e-12 {
                    x[k] = 0.0;
                    passive[k] = false;
                }
            }
        }
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_nnls_unconstrained_optimum_is_feasible() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let b = array![3.0, 4.0];
        let x = nnls(&a, &b, 50);
        assert!((x[0] - 3.0).abs() < 1e-6);
        assert!((x[1] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_nnls_clamps_negative_target_to_zero() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let b = array![-2.0, 5.0];
        let x = nnls(&a, &b, 50);
        assert!(x[0] >= 0.0);
        assert!((x[1] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_nnls_result_always_nonnegative() {
        let a = array![[1.0, 1.0], [1.0, -1.0]];
        let b = array![1.0, 3.0];
        let x = nnls(&a, &b, 50);
        assert!(x.iter().all(|&v| v >= -1e-9));
    }
}
