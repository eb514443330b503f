use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Either a flat list in motif-index order, or a sparse map of non-zero
/// entries keyed by base letters ("ACGU"-style, one letter per axis).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMotifArray {
    Flat(Vec<f64>),
    Sparse(HashMap<String, f64>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawArrays {
    #[serde(default)]
    pub stack: Option<RawMotifArray>,
    #[serde(default)]
    pub coaxial_stack: Option<RawMotifArray>,
    #[serde(default)]
    pub interior_mismatch: Option<RawMotifArray>,
    #[serde(default)]
    pub terminal_mismatch: Option<RawMotifArray>,
    #[serde(default)]
    pub hairpin_mismatch: Option<RawMotifArray>,
    #[serde(default)]
    pub interior_1x1: Option<RawMotifArray>,
    #[serde(default)]
    pub interior_1x2: Option<RawMotifArray>,
    #[serde(default)]
    pub interior_2x2: Option<RawMotifArray>,
    #[serde(default)]
    pub hairpin_triloop: Option<RawMotifArray>,
    #[serde(default)]
    pub hairpin_tetraloop: Option<RawMotifArray>,
    #[serde(default)]
    pub dangle5: Option<RawMotifArray>,
    #[serde(default)]
    pub dangle3: Option<RawMotifArray>,
    #[serde(default)]
    pub terminal_penalty: Option<RawMotifArray>,
    #[serde(default)]
    pub hairpin_size: Option<Vec<f64>>,
    #[serde(default)]
    pub bulge_size: Option<Vec<f64>>,
    #[serde(default)]
    pub interior_size: Option<Vec<f64>>,
    #[serde(default)]
    pub ninio: Option<Vec<f64>>,
    #[serde(default)]
    pub multi_init: Option<f64>,
    #[serde(default)]
    pub multi_pair: Option<f64>,
    #[serde(default)]
    pub multi_base: Option<f64>,
    #[serde(default)]
    pub join_penalty: Option<f64>,
    #[serde(default)]
    pub log_loop_penalty: Option<f64>,
    #[serde(default)]
    pub loop_bias: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterFile {
    #[serde(rename = "dG")]
    pub dg: RawArrays,
    #[serde(rename = "dH")]
    pub dh: RawArrays,
    pub material: String,
    #[serde(default)]
    pub default_wobble_pairing: bool,
}
