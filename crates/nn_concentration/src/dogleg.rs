use ndarray::{Array1, Array2};

use crate::linalg::{norm, solve_dense};

/// Smaller-magnitude root of `a * beta^2 + b * beta + c == 0`. The dogleg
/// mixing coefficient must lie in `[-1, 1]`; of the two algebraic roots,
/// the one closer to zero is always the one on that interval's boundary
/// the blend is meant to hit first.
fn quadratic_root_closest_to_zero(a: f64, b: f64, c: f64) -> f64 {
    if a.abs() < 1e-14 {
        return if b.abs() < 1e-14 { 0.0 } else { -c / b };
    }
    let discriminant = (b * b - 4.0 * a * c).max(0.0);
    let sqrt_d = discriminant.sqrt();
    let r1 = (-b + sqrt_d) / (2.0 * a);
    let r2 = (-b - sqrt_d) / (2.0 * a);
    if r1.abs() <= r2.abs() {
        r1
    } else {
        r2
    }
}

/// Trust-region dogleg step: blends the Newton step (from an SPD-ish solve
/// that is allowed to be ugly — a singular Hessian just disables the
/// Newton branch) and the Cauchy (steepest-descent) step, clamped to the
/// trust radius `delta`.
pub fn find_direction(grad: &Array1<f64>, hess: &Array2<f64>, delta: f64, min_delta: f64) -> Array1<f64> {
    let neg_grad = grad.mapv(|g| -g);
    let newton = solve_dense(hess, &neg_grad);
    let newt_norm = newton.as_ref().map(norm).unwrap_or(0.0);

    if let Some(newt) = &newton {
        if newt_norm > 0.0 && (delta < min_delta || newt_norm < delta) {
            return newt.clone();
        }
    }

    let grad_norm = norm(grad);
    if grad_norm == 0.0 {
        return Array1::zeros(grad.len());
    }
    let cauchy_dir = grad.mapv(|g| g / grad_norm);
    let curvature = cauchy_dir.dot(&hess.dot(&cauchy_dir));
    let cauchy = if curvature.abs() > 1e-300 { grad.mapv(|g| g * (-1.0 / curvature)) } else { Array1::zeros(grad.len()) };
    let cauchy_norm = norm(&cauchy);

    let newton_usable = newton.is_some() && newt_norm > 0.0 && newt_norm.powi(2).is_finite();
    if !newton_usable || cauchy_norm > delta {
        if cauchy_norm <= 1e-300 {
            return Array1::zeros(grad.len());
        }
        return cauchy.mapv(|v| v * (delta / cauchy_norm).sqrt());
    }
    let newt = newton.unwrap();

    let newt_cauchy = newt.dot(&cauchy);
    let a = newt_norm * newt_norm + cauchy_norm * cauchy_norm - 2.0 * newt_cauchy;
    let b = 2.0 * (newt_cauchy - cauchy_norm * cauchy_norm);
    let c = cauchy_norm * cauchy_norm - delta * delta;
    let beta = quadratic_root_closest_to_zero(a, b, c).clamp(-1.0, 1.0);

    if beta < 0.0 {
        cauchy.mapv(|v| v * (beta + 1.0))
    } else {
        &cauchy.mapv(|v| v * (1.0 - beta)) + &newt.mapv(|v| v * beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_find_direction_prefers_newton_inside_radius() {
        let grad = array![2.0, 4.0];
        let hess = array![[2.0, 0.0], [0.0, 2.0]];
        let step = find_direction(&grad, &hess, 100.0, 1e-6);
        assert!((step[0] + 1.0).abs() < 1e-9);
        assert!((step[1] + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_find_direction_clamps_to_trust_radius() {
        let grad = array![2.0, 4.0];
        let hess = array![[2.0, 0.0], [0.0, 2.0]];
        let step = find_direction(&grad, &hess, 0.5, 1e-6);
        assert!(norm(&step) <= 0.5 + 1e-9);
    }

    #[test]
    fn test_find_direction_handles_singular_hessian() {
        let grad = array![1.0, 0.0];
        let hess = array![[0.0, 0.0], [0.0, 0.0]];
        let step = find_direction(&grad, &hess, 1.0, 1e-6);
        assert!(step.iter().all(|v| v.is_finite()));
    }
}
