use std::sync::Mutex;

use log::warn;
use nn_params::{InterpolatedParameters, ParameterSet, SizeClass};

use crate::config::{EnsembleConfig, ModelConditions};

/// Gas constant in kcal/(mol*K).
pub const GAS_CONSTANT: f64 = 0.001987204285;

/// Length-dependent loop penalties, memoized against repeated lookups in
/// the O(N^3)/O(N^4) recursions. `reserve` grows the memo tables ahead of
/// a DP pass so the inner loop never pays for the `ln()` in the
/// log-loop extrapolation. A `Mutex` (not `RefCell`) guards each table so
/// `CachedModel` stays `Sync` and can be shared across the anti-diagonal
/// scheduler's worker threads.
pub struct CachedModel {
    pub conditions: ModelConditions,
    params: InterpolatedParameters,
    hairpin_memo: Mutex<Vec<f64>>,
    bulge_memo: Mutex<Vec<f64>>,
    interior_memo: Mutex<Vec<f64>>,
}

impl CachedModel {
    pub fn new(parameter_set: &ParameterSet, conditions: ModelConditions) -> Self {
        let params = parameter_set.at_temperature(conditions.temperature_kelvin());
        CachedModel {
            conditions,
            params,
            hairpin_memo: Mutex::new(Vec::new()),
            bulge_memo: Mutex::new(Vec::new()),
            interior_memo: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(parameter_set: &ParameterSet, config: &EnsembleConfig) -> Self {
        Self::new(parameter_set, config.conditions.clone())
    }

    /// Grow every length-dependent memo table to cover sequences of
    /// length `n` (reserves the hairpin/bulge/interior size arrays).
    pub fn reserve(&self, n: usize) {
        Self::fill(&self.hairpin_memo, n, |k| self.params.size_penalty(SizeClass::Hairpin, k));
        Self::fill(&self.bulge_memo, n, |k| self.params.size_penalty(SizeClass::Bulge, k));
        Self::fill(&self.interior_memo, n, |k| self.params.size_penalty(SizeClass::Interior, k));
    }

    fn fill(memo: &Mutex<Vec<f64>>, n: usize, f: impl Fn(usize) -> f64) {
        let mut memo = memo.lock().unwrap();
        while memo.len() <= n {
            let k = memo.len();
            memo.push(f(k));
        }
    }

    pub fn hairpin_penalty(&self, n: usize) -> f64 {
        self.reserve(n);
        self.hairpin_memo.lock().unwrap()[n]
    }

    pub fn bulge_penalty(&self, n: usize) -> f64 {
        self.reserve(n);
        self.bulge_memo.lock().unwrap()[n]
    }

    pub fn interior_size_penalty(&self, n1: usize, n2: usize) -> f64 {
        let n = n1 + n2;
        self.reserve(n);
        self.interior_memo.lock().unwrap()[n] + self.params.ninio(n1, n2)
    }

    pub fn params(&self) -> &InterpolatedParameters {
        &self.params
    }

    pub fn rt(&self) -> f64 {
        GAS_CONSTANT * self.conditions.temperature_kelvin()
    }

    /// Boltzmann weight of a free-energy term in kcal/mol. Non-finite
    /// results (NaN from malformed parameters, or an exponent that
    /// overflows `f64`) are coerced to zero probability mass rather than
    /// poisoning the whole partition function sum.
    pub fn boltz(&self, dg_kcal: f64) -> f64 {
        if !dg_kcal.is_finite() {
            warn!("non-finite free energy {dg_kcal} coerced to zero Boltzmann weight");
            return 0.0;
        }
        let w = (-dg_kcal / self.rt()).exp();
        if !w.is_finite() {
            warn!("Boltzmann weight for {dg_kcal} kcal/mol overflowed, coercing to zero");
            return 0.0;
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ParameterSet {
        let json = r#"{
            "dG": {"log_loop_penalty": 1.75, "hairpin_size": [5.4,5.4,5.4,5.4,5.4,4.4,4.3,4.1,4.1,4.2,
                4.3,4.4,4.5,4.6,4.6,4.7,4.8,4.8,4.9,4.9,5.0,5.0,5.0,5.1,5.1,5.1,5.2,5.2,5.2,5.3,5.3]},
            "dH": {},
            "material": "rna"
        }"#;
        ParameterSet::from_json(json).unwrap()
    }

    #[test]
    fn test_reserve_extends_memo() {
        let ps = params();
        let model = CachedModel::new(&ps, ModelConditions::default());
        let a = model.hairpin_penalty(3);
        let b = model.hairpin_penalty(60);
        assert!(b > a);
    }

    #[test]
    fn test_boltz_monotonic() {
        let ps = params();
        let model = CachedModel::new(&ps, ModelConditions::default());
        assert!(model.boltz(-2.0) > model.boltz(0.0));
        assert!(model.boltz(0.0) > model.boltz(2.0));
    }

    #[test]
    fn test_boltz_coerces_nan() {
        let ps = params();
        let model = CachedModel::new(&ps, ModelConditions::default());
        assert_eq!(model.boltz(f64::NAN), 0.0);
    }
}
