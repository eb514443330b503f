use ndarray::Array1;

/// Outer solve strategy. `Dogleg` is the trust-region method used by
/// default; `Cd` and `Fit` are alternate inner methods for problems where
/// the dogleg Hessian is ill-conditioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Dogleg,
    Cd,
    Fit,
}

/// How to seed the dual vector before the outer loop starts.
#[derive(Debug, Clone)]
pub enum InitialGuess {
    Given(Array1<f64>),
    AbsLs,
    Nnls,
    Uniform,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub max_iters: usize,
    pub tolerance: f64,
    pub delta_min: f64,
    pub delta_max: f64,
    pub orthogonalize: bool,
    pub method: Method,
    pub initial_guess: InitialGuess,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_iters: 10_000,
            tolerance: 1e-8,
            delta_min: 1e-9,
            delta_max: 1000.0,
            orthogonalize: false,
            method: Method::Dogleg,
            initial_guess: InitialGuess::Nnls,
        }
    }
}
