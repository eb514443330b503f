use log::{debug, info, warn};
use ndarray::{Array1, Array2, Axis};

use crate::dogleg::find_direction;
use crate::error::ConcentrationError;
use crate::linalg::{eigen_symmetric, norm, solve_dense, solve_least_squares, solve_min_norm};
use crate::nnls::nnls;
use crate::options::{InitialGuess, Method, Options};

/// Equilibrium complex concentrations: the primal solution `x = exp(A y +
/// q)` plus the dual vector `y` and the solver's own bookkeeping.
#[derive(Debug, Clone)]
pub struct ConcentrationResult {
    pub concentrations: Array1<f64>,
    pub dual: Array1<f64>,
    pub objective: f64,
    pub error_norm: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Solves `min_y 1^T exp(A y + q) + x0^T A y` for the equilibrium complex
/// concentrations `x = exp(A y + q)` satisfying `A^T x = x0`, where `A` is
/// the complex-by-strand stoichiometry matrix, `q` the log partition
/// functions, and `x0` the total strand concentrations.
pub fn equilibrate(a: &Array2<f64>, x0: &Array1<f64>, log_q: &Array1<f64>, options: &Options) -> Result<ConcentrationResult, ConcentrationError> {
    let complexes = a.nrows();
    let strands = a.ncols();
    if x0.len() != strands || log_q.len() != complexes {
        return Err(ConcentrationError::DimensionMismatch { complexes, x0_len: x0.len(), q_len: log_q.len() });
    }
    if complexes == 0 {
        return Ok(ConcentrationResult {
            concentrations: Array1::zeros(0),
            dual: Array1::zeros(strands),
            objective: 0.0,
            error_norm: 0.0,
            iterations: 0,
            converged: true,
        });
    }
    if x0.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(ConcentrationError::NonFinite("strand concentrations".into()));
    }

    info!("equilibrate started: {complexes} complexes, {strands} strand types, method {:?}", options.method);
    let result = match options.method {
        Method::Cd => equilibrate_cd(a, x0, log_q, options),
        Method::Fit => equilibrate_lse(a, x0, log_q, options),
        Method::Dogleg => equilibrate_dogleg(a, x0, log_q, options),
    };
    match &result {
        Ok(r) => info!("equilibrate finished: {} iterations, converged = {}", r.iterations, r.converged),
        Err(e) => warn!("equilibrate failed: {e}"),
    }
    result
}

fn primal(a: &Array2<f64>, y: &Array1<f64>, log_q: &Array1<f64>) -> Array1<f64> {
    (a.dot(y) + log_q).mapv(|v| v.exp().clamp(f64::MIN_POSITIVE, 1e100))
}

fn objective_value(x: &Array1<f64>, y: &Array1<f64>, rhs: &Array1<f64>) -> f64 {
    x.sum() + y.dot(rhs)
}

fn hessian(a: &Array2<f64>, x: &Array1<f64>) -> Array2<f64> {
    let scaled = a * &x.view().insert_axis(Axis(1));
    scaled.t().dot(a)
}

fn adjust_delta(delta: f64, rho: f64, options: &Options) -> f64 {
    if delta <= options.delta_min {
        return delta;
    }
    if rho > 0.75 {
        return (2.0 * delta).min(options.delta_max);
    }
    if rho < 0.25 {
        return delta / 4.0;
    }
    delta
}

/// The complex-space vector satisfying `A^T x0_complex ~ x0_strand` in the
/// minimum-norm sense; used both as the reference point for the dual
/// objective's linear term and as the target concentration in the
/// coordinate-descent shift rule.
fn complex_space_target(a: &Array2<f64>, x0_strand: &Array1<f64>) -> Result<Array1<f64>, ConcentrationError> {
    solve_min_norm(&a.t().to_owned(), x0_strand).ok_or(ConcentrationError::SingularHessian)
}

fn orthonormal_basis(m: &Array2<f64>) -> Array2<f64> {
    let rows = m.nrows();
    let mut basis: Vec<Array1<f64>> = Vec::new();
    for j in 0..m.ncols() {
        let mut v = m.column(j).to_owned();
        for b in &basis {
            let proj = b.dot(&v);
            v = &v - &(b * proj);
        }
        let n = norm(&v);
        if n > 1e-10 {
            basis.push(v.mapv(|x| x / n));
        }
    }
    if basis.is_empty() {
        return Array2::eye(rows);
    }
    let mut out = Array2::<f64>::zeros((rows, basis.len()));
    for (j, b) in basis.iter().enumerate() {
        out.column_mut(j).assign(b);
    }
    out
}

/// Gets rid of non-finite entries by replacing them with the smallest
/// finite entry, then folds in the partition-function weighting to arrive
/// at a dual-space initial guess. Shared by every initial-guess method.
fn initial_dual_guess(guess: &InitialGuess, a: &Array2<f64>, log_q: &Array1<f64>, rhs: &Array1<f64>) -> Array1<f64> {
    let complexes = a.nrows();
    let mut c = match guess {
        InitialGuess::Given(x0_complex) => x0_complex.mapv(|v| v.max(f64::MIN_POSITIVE).ln()),
        InitialGuess::AbsLs => {
            let a_t_a = a.t().dot(a);
            let z = solve_dense(&a_t_a, rhs).unwrap_or_else(|| Array1::zeros(a.ncols()));
            a.dot(&z.mapv(f64::abs)).mapv(|v| v.max(f64::MIN_POSITIVE).ln())
        }
        InitialGuess::Nnls => {
            let z = nnls(&a.t().to_owned(), rhs, 500);
            z.mapv(|v| v.max(f64::MIN_POSITIVE).ln())
        }
        InitialGuess::Uniform => Array1::ones(complexes),
    };

    let bump = c.iter().copied().filter(|v| v.is_finite()).fold(1.0, f64::min);
    for v in c.iter_mut() {
        if !v.is_finite() {
            *v = bump;
        }
    }

    let max_q = log_q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weight = log_q.mapv(|q| (q - max_q).exp());
    let weighted_a = a * &weight.view().insert_axis(Axis(1));
    let awa = a.t().dot(&weighted_a);
    let target = a.t().dot(&(&weight * &(&c - log_q)));
    solve_dense(&awa, &target).unwrap_or_else(|| Array1::zeros(a.ncols()))
}

fn equilibrate_dogleg(a: &Array2<f64>, x0_strand: &Array1<f64>, log_q: &Array1<f64>, options: &Options) -> Result<ConcentrationResult, ConcentrationError> {
    let strands = a.ncols();
    let complexes = a.nrows();

    let orth_basis = (options.orthogonalize && complexes > strands).then(|| orthonormal_basis(&a.t().to_owned()));
    let work_a = match &orth_basis {
        Some(basis) => a.dot(basis),
        None => a.clone(),
    };

    let x0_complex = complex_space_target(a, x0_strand)?;
    let rhs = -(work_a.t().dot(&x0_complex));
    let normalization = a.t().dot(&x0_complex).mapv(|v| 1.0 / v);
    if normalization.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return Err(ConcentrationError::NonFinite("normalization".into()));
    }

    let mut y = initial_dual_guess(&options.initial_guess, &work_a, log_q, &rhs);
    let mut x = primal(&work_a, &y, log_q);
    let mut objective = objective_value(&x, &y, &rhs);

    let mut delta = options.delta_max;
    let mut error_norm = f64::INFINITY;
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..options.max_iters {
        iterations = iter + 1;
        let grad = work_a.t().dot(&x) + &rhs;
        if grad.iter().any(|v| !v.is_finite()) {
            return Err(ConcentrationError::NonFinite("gradient".into()));
        }

        let probe = match &orth_basis {
            Some(basis) => basis.dot(&grad),
            None => grad.clone(),
        };
        error_norm = probe.iter().zip(normalization.iter()).map(|(g, n)| (g * n).abs()).fold(0.0, f64::max);
        if error_norm < options.tolerance {
            converged = true;
            break;
        }

        let hess = hessian(&work_a, &x);
        let step = find_direction(&grad, &hess, delta, options.delta_min).mapv(|v| if v.is_finite() { v } else { 0.0 });

        let y_new = &y + &step;
        let x_new = primal(&work_a, &y_new, log_q);
        let objective_new = objective_value(&x_new, &y_new, &rhs);

        let predicted = grad.dot(&step) - step.dot(&hess.dot(&step)) / 2.0;
        let rho = if predicted.abs() > 1e-300 { (objective_new - objective) / predicted } else { 0.0 };
        debug!("dogleg iter {iter}: delta={delta:.3e} rho={rho:.3e} error={error_norm:.3e}");

        delta = adjust_delta(delta, rho, options);
        if objective_new <= objective {
            y = y_new;
            x = x_new;
            objective = objective_new;
        }
        if !x.iter().all(|v| v.is_finite()) || !objective.is_finite() {
            return Err(ConcentrationError::NonFinite("trust region iterate".into()));
        }
    }

    let dual = match &orth_basis {
        Some(basis) => basis.dot(&y),
        None => y,
    };
    Ok(ConcentrationResult { concentrations: x, dual, objective, error_norm, iterations, converged })
}

fn equilibrate_cd(a: &Array2<f64>, x0_strand: &Array1<f64>, log_q: &Array1<f64>, options: &Options) -> Result<ConcentrationResult, ConcentrationError> {
    let strands = a.ncols().max(1);
    let log_b = x0_strand.mapv(f64::ln);

    let x0_complex = complex_space_target(a, x0_strand)?;
    let target0 = a.dot(x0_strand).mapv(f64::ln) - log_q;
    let mut y = solve_least_squares(a, &target0).unwrap_or_else(|| Array1::zeros(a.ncols()));
    let mut logx = a.dot(&y) + log_q;
    let mut x = logx.mapv(f64::exp);

    let mut v = Array2::<f64>::eye(a.ncols());
    let mut av = a.dot(&v);
    let mut vy = v.t().dot(&y);

    let mut iterations = 0;
    let mut converged = false;
    let mut error_norm = f64::INFINITY;

    for iter in 0..options.max_iters {
        iterations = iter + 1;
        if iter % strands == 0 {
            let hess = hessian(a, &x);
            let (_, eigvecs) = eigen_symmetric(&hess);
            v = eigvecs;
            av = a.dot(&v);
            vy = v.t().dot(&y);
        }

        for i in 0..a.ncols() {
            let av_col = av.column(i);
            let s = av_col.dot(&x);
            let s0 = av_col.dot(&x0_complex);
            let h_ii: f64 = av_col.iter().zip(x.iter()).map(|(a_i, x_i)| a_i * a_i * x_i).sum();
            if h_ii == 0.0 {
                continue;
            }
            let mut shift = (s0 - s) / h_ii;
            if !shift.is_finite() {
                return Err(ConcentrationError::NonFinite("coordinate descent shift".into()));
            }
            if shift.abs() > 16.0 {
                shift = 16.0_f64.copysign(shift);
            }
            vy[i] += shift;
            logx = &logx + &av_col.mapv(|v| v * shift);
            x = logx.mapv(f64::exp);
            if !x.iter().all(|v| v.is_finite()) {
                return Err(ConcentrationError::NonFinite("coordinate descent primal".into()));
            }
        }

        y = v.dot(&vy);
        let residual = a.t().dot(&x).mapv(f64::ln) - &log_b;
        error_norm = residual.iter().map(|v| v.abs()).fold(0.0, f64::max);
        debug!("cd iter {iter}: error={error_norm:.3e}");
        if error_norm < options.tolerance {
            converged = true;
            break;
        }
    }

    let rhs = -(a.t().dot(&x0_complex));
    let objective = objective_value(&x, &y, &rhs);
    Ok(ConcentrationResult { concentrations: x, dual: y, objective, error_norm, iterations, converged })
}

fn equilibrate_lse(a: &Array2<f64>, x0_strand: &Array1<f64>, log_q: &Array1<f64>, options: &Options) -> Result<ConcentrationResult, ConcentrationError> {
    let complexes = a.nrows();
    let strands = a.ncols();
    let log_b = x0_strand.mapv(f64::ln);
    let log_a = a.mapv(|v| if v > 0.0 { v.ln() } else { f64::NEG_INFINITY });

    let target0 = a.dot(x0_strand).mapv(f64::ln) - log_q;
    let mut y = solve_least_squares(a, &target0).unwrap_or_else(|| Array1::zeros(strands));
    let mut logx = a.dot(&y) + log_q;

    let mut error_norm = f64::INFINITY;
    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..options.max_iters {
        iterations = iter + 1;

        let mut pivot_row = vec![0usize; strands];
        for j in 0..strands {
            let mut best = f64::NEG_INFINITY;
            for i in 0..complexes {
                let v = log_a[[i, j]] + logx[i];
                if v > best {
                    best = v;
                    pivot_row[j] = i;
                }
            }
        }
        let xc: Array1<f64> = (0..strands).map(|j| -(a.row(pivot_row[j]).dot(&y) + log_q[pivot_row[j]])).collect();

        let mut y_mat = Array2::<f64>::zeros((complexes, strands));
        for i in 0..complexes {
            for j in 0..strands {
                y_mat[[i, j]] = a[[i, j]] * (logx[i] + xc[j]).exp();
            }
        }
        let rhs = y_mat.sum_axis(Axis(0));
        let error: Array1<f64> = (0..strands).map(|j| log_b[j] + xc[j] - rhs[j].ln()).collect();
        error_norm = error.iter().map(|v| v.abs()).fold(0.0, f64::max);
        debug!("fit iter {iter}: error={error_norm:.3e}");
        if error_norm < options.tolerance {
            converged = true;
            break;
        }

        let g = y_mat.t().dot(a);
        let scaled = &error * &rhs;
        let Some(delta_y) = solve_dense(&g, &scaled) else {
            return Err(ConcentrationError::SingularHessian);
        };
        y = &y + &delta_y;
        logx = a.dot(&y) + log_q;
        if !logx.iter().all(|v| v.is_finite()) {
            return Err(ConcentrationError::NonFinite("log-sum-exp Newton iterate".into()));
        }
    }

    let x = logx.mapv(f64::exp);
    let x0_complex = complex_space_target(a, x0_strand)?;
    let rhs = -(a.t().dot(&x0_complex));
    let objective = objective_value(&x, &y, &rhs);
    Ok(ConcentrationResult { concentrations: x, dual: y, objective, error_norm, iterations, converged })
}
