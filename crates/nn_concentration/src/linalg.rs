use ndarray::{Array1, Array2};

/// Solves the dense square system `a x = b` by Gaussian elimination with
/// partial pivoting. Returns `None` if `a` is numerically singular rather
/// than panicking — the dogleg direction finder treats that as "Newton
/// step unavailable" and falls back to Cauchy, matching Armadillo's
/// `allow_ugly` solve mode which accepts a degraded result instead of
/// throwing.
pub fn solve_dense(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    assert_eq!(a.nrows(), n);
    assert_eq!(a.ncols(), n);
    if n == 0 {
        return Some(Array1::zeros(0));
    }

    let mut m = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&r1, &r2| m[[r1, col]].abs().partial_cmp(&m[[r2, col]].abs()).unwrap())?;
        if m[[pivot_row, col]].abs() < 1e-13 {
            return None;
        }
        if pivot_row != col {
            for k in 0..n {
                m.swap([col, k], [pivot_row, k]);
            }
            rhs.swap(col, pivot_row);
        }
        let pivot = m[[col, col]];
        for row in (col + 1)..n {
            let factor = m[[row, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[[row, k]] -= factor * m[[col, k]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in (row + 1)..n {
            acc -= m[[row, k]] * x[k];
        }
        x[row] = acc / m[[row, row]];
    }
    Some(x)
}

/// Minimum-norm solution of the underdetermined system `m y = b` where `m`
/// has full row rank and at least as many columns as rows, via the normal
/// equations `y = m^T (m m^T)^-1 b`.
pub fn solve_min_norm(m: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let gram = m.dot(&m.t());
    let z = solve_dense(&gram, b)?;
    Some(m.t().dot(&z))
}

/// Least-squares solution of the overdetermined (or square) system
/// `m z = b` via the normal equations `(m^T m) z = m^T b`.
pub fn solve_least_squares(m: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let gram = m.t().dot(m);
    let rhs = m.t().dot(b);
    solve_dense(&gram, &rhs)
}

pub fn norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

/// Classical Jacobi eigenvalue algorithm for a symmetric matrix. Returns
/// `(eigenvalues, eigenvectors)` with eigenvectors as columns. Used by the
/// coordinate-descent inner method, which re-diagonalizes the Hessian
/// every `n` steps rather than every step.
pub fn eigen_symmetric(sym: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = sym.nrows();
    let mut a = sym.clone();
    let mut v = Array2::<f64>::eye(n);

    for _sweep in 0..100 {
        let mut off_diag = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off_diag += a[[p, q]] * a[[p, q]];
            }
        }
        if off_diag.sqrt() < 1e-12 {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[[p, q]].abs() < 1e-14 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * a[[p, q]]);
                let t = theta.signum() / (theta.abs() + (1.0 + theta * theta).sqrt());
                let t = if theta == 0.0 { 1.0 } else { t };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;

                let app = a[[p, p]];
                let aqq = a[[q, q]];
                let apq = a[[p, q]];
                a[[p, p]] = c * c * app - 2.0 * s * c * apq + s * s * aqq;
                a[[q, q]] = s * s * app + 2.0 * s * c * apq + c * c * aqq;
                a[[p, q]] = 0.0;
                a[[q, p]] = 0.0;

                for k in 0..n {
                    if k != p && k != q {
                        let akp = a[[k, p]];
                        let akq = a[[k, q]];
                        a[[k, p]] = c * akp - s * akq;
                        a[[p, k]] = a[[k, p]];
                        a[[k, q]] = s * akp + c * akq;
                        a[[q, k]] = a[[k, q]];
                    }
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = Array1::from_iter((0..n).map(|i| a[[i, i]]));
    (eigenvalues, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_solve_dense_identity() {
        let a = array![[2.0, 0.0], [0.0, 3.0]];
        let b = array![4.0, 9.0];
        let x = solve_dense(&a, &b).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-9);
        assert!((x[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_solve_dense_singular_returns_none() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(solve_dense(&a, &b).is_none());
    }

    #[test]
    fn test_solve_min_norm_matches_expected() {
        let m = array![[1.0, 1.0]];
        let b = array![2.0];
        let y = solve_min_norm(&m, &b).unwrap();
        assert!((y[0] - 1.0).abs() < 1e-9);
        assert!((y[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_eigen_symmetric_diagonal_is_identity() {
        let a = array![[3.0, 0.0], [0.0, 5.0]];
        let (vals, _vecs) = eigen_symmetric(&a);
        let mut sorted = vals.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((sorted[0] - 3.0).abs() < 1e-9);
        assert!((sorted[1] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_eigen_symmetric_reconstructs_matrix() {
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let (vals, vecs) = eigen_symmetric(&a);
        let reconstructed = vecs.dot(&Array2::from_diag(&vals)).dot(&vecs.t());
        for i in 0..2 {
            for j in 0..2 {
                assert!((reconstructed[[i, j]] - a[[i, j]]).abs() < 1e-8);
            }
        }
    }
}
