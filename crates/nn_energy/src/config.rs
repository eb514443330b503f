/// The physiological/ensemble conditions a model is evaluated under.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConditions {
    pub temperature_celsius: f64,
    pub na_molar: f64,
    pub mg_molar: f64,
    /// Whether G-U is allowed as an internal (non-loop-closing) pair.
    pub wobble_pairing: bool,
    /// Whether G-U is allowed as a loop-closing pair. Independent of
    /// `wobble_pairing`: NUPACK's default parameter sets allow G-U
    /// internally but forbid it from closing a loop.
    pub wobble_closing: bool,
}

impl ModelConditions {
    pub const K0: f64 = 273.15;

    pub fn temperature_kelvin(&self) -> f64 {
        self.temperature_celsius + Self::K0
    }
}

impl Default for ModelConditions {
    fn default() -> Self {
        ModelConditions {
            temperature_celsius: 37.0,
            na_molar: 1.0,
            mg_molar: 0.0,
            wobble_pairing: true,
            wobble_closing: true,
        }
    }
}

/// Which coaxial-stacking treatment a caller asks for when evaluating
/// multiloop and exterior-loop branches.
///
/// - `NoStacking` -- no coaxial bonus at all.
/// - `Stacking` -- the flush (no-mismatch) coaxial bonus between adjacent
///   helices is added wherever it lowers free energy.
/// - `Min` -- like `Stacking`, but only the single best-scoring coaxial
///   stack per junction contributes (a cheap approximation of the full
///   ensemble that still distinguishes the minimum-energy structure).
/// - `All` -- every flush-adjacent helix pair in a junction contributes
///   its coaxial bonus independently (the full sum-over-configurations
///   ensemble).
/// - `None` -- an alias for `NoStacking` kept for parity with the
///   external `ensemble` name set.
///
/// None of the five modes are wired into `NearestNeighborModel` yet: the
/// DP recursion's multiloop/exterior terms don't track the preceding
/// branch needed to score a junction's coaxial stack, so `energy_of_loop`
/// does not add one either (see DESIGN.md). `flush_coaxial_bonus` is
/// still available as a standalone primitive for callers scoring a
/// junction's helix pair directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensemble {
    NoStacking,
    Stacking,
    Min,
    All,
    None,
}

impl Default for Ensemble {
    fn default() -> Self {
        Ensemble::Stacking
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleConfig {
    pub conditions: ModelConditions,
    pub ensemble: Ensemble,
    pub min_hairpin_size: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            conditions: ModelConditions::default(),
            ensemble: Ensemble::default(),
            min_hairpin_size: 3,
        }
    }
}
