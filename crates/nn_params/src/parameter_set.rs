use crate::motif::{motif_len, parse_key};
use crate::raw::{ParameterFile, RawMotifArray};
use crate::ParamError;

/// Reference temperature (37C) at which `dG` fields are reported.
pub const T_REF: f64 = 310.15;

fn build_motif(field: &'static str, rank: usize, raw: &Option<RawMotifArray>) -> Result<Vec<f64>, ParamError> {
    let len = motif_len(rank);
    match raw {
        None => Ok(vec![0.0; len]),
        Some(RawMotifArray::Flat(v)) => {
            if v.len() != len {
                return Err(ParamError::WrongLength { field, expected: len, found: v.len() });
            }
            Ok(v.clone())
        }
        Some(RawMotifArray::Sparse(map)) => {
            let mut out = vec![0.0; len];
            for (key, &val) in map {
                out[parse_key(field, rank, key)?] = val;
            }
            Ok(out)
        }
    }
}

fn build_size(field: &'static str, raw: &Option<Vec<f64>>, len: usize) -> Result<Vec<f64>, ParamError> {
    match raw {
        None => Ok(vec![0.0; len]),
        Some(v) => {
            if v.len() != len {
                return Err(ParamError::WrongLength { field, expected: len, found: v.len() });
            }
            Ok(v.clone())
        }
    }
}

macro_rules! motif_field {
    ($self:ident, $name:ident, $rank:expr) => {
        ParameterField {
            dg: build_motif(stringify!($name), $rank, &$self.dg.$name)?,
            dh: build_motif(stringify!($name), $rank, &$self.dh.$name)?,
        }
    };
}

macro_rules! size_field {
    ($self:ident, $name:ident, $len:expr) => {
        ParameterField {
            dg: build_size(stringify!($name), &$self.dg.$name, $len)?,
            dh: build_size(stringify!($name), &$self.dh.$name, $len)?,
        }
    };
}

/// A motif table's enthalpy/free-energy pair, interpolated together.
#[derive(Debug, Clone)]
pub struct ParameterField {
    pub dg: Vec<f64>,
    pub dh: Vec<f64>,
}

impl ParameterField {
    fn interpolate(&self, t_over_tref: f64) -> Vec<f64> {
        self.dg.iter().zip(self.dh.iter())
            .map(|(&g, &h)| t_over_tref * g + (1.0 - t_over_tref) * h)
            .collect()
    }
}

/// The full set of nearest-neighbor parameters at the reference
/// temperature, as parsed from a parameter JSON document. See
/// `ParameterSet::from_json` for the on-disk schema.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    pub material: String,
    pub default_wobble_pairing: bool,

    pub stack: ParameterField,
    pub coaxial_stack: ParameterField,
    pub interior_mismatch: ParameterField,
    pub terminal_mismatch: ParameterField,
    pub hairpin_mismatch: ParameterField,
    pub interior_1x1: ParameterField,
    pub interior_1x2: ParameterField,
    pub interior_2x2: ParameterField,
    pub hairpin_triloop: ParameterField,
    pub hairpin_tetraloop: ParameterField,
    pub dangle5: ParameterField,
    pub dangle3: ParameterField,
    pub terminal_penalty: ParameterField,

    pub hairpin_size: ParameterField,
    pub bulge_size: ParameterField,
    pub interior_size: ParameterField,
    pub ninio: ParameterField,

    pub multi_init: (f64, f64),
    pub multi_pair: (f64, f64),
    pub multi_base: (f64, f64),
    pub join_penalty: (f64, f64),
    pub log_loop_penalty: (f64, f64),
    /// Single additive shift folded into the length arrays (`hairpin_size`,
    /// `bulge_size`, `interior_size`) plus `join_penalty` and `multi_init`
    /// once interpolated -- see `ParameterSet::at_temperature`.
    pub loop_bias: (f64, f64),
}

impl ParameterSet {
    pub fn from_json(text: &str) -> Result<Self, ParamError> {
        let file: ParameterFile = serde_json::from_str(text)?;
        Self::from_file(file)
    }

    fn from_file(file: ParameterFile) -> Result<Self, ParamError> {
        let scalar = |field: &'static str, dg: Option<f64>, dh: Option<f64>| -> (f64, f64) {
            let _ = field;
            (dg.unwrap_or(0.0), dh.unwrap_or(0.0))
        };

        Ok(ParameterSet {
            material: file.material.clone(),
            default_wobble_pairing: file.default_wobble_pairing,

            stack: motif_field!(file, stack, 4),
            coaxial_stack: motif_field!(file, coaxial_stack, 4),
            interior_mismatch: motif_field!(file, interior_mismatch, 4),
            terminal_mismatch: motif_field!(file, terminal_mismatch, 4),
            hairpin_mismatch: motif_field!(file, hairpin_mismatch, 4),
            interior_1x1: motif_field!(file, interior_1x1, 6),
            interior_1x2: motif_field!(file, interior_1x2, 7),
            interior_2x2: motif_field!(file, interior_2x2, 8),
            hairpin_triloop: motif_field!(file, hairpin_triloop, 5),
            hairpin_tetraloop: motif_field!(file, hairpin_tetraloop, 6),
            dangle5: motif_field!(file, dangle5, 3),
            dangle3: motif_field!(file, dangle3, 3),
            terminal_penalty: motif_field!(file, terminal_penalty, 2),

            hairpin_size: size_field!(file, hairpin_size, 31),
            bulge_size: size_field!(file, bulge_size, 31),
            interior_size: size_field!(file, interior_size, 31),
            ninio: size_field!(file, ninio, 5),

            multi_init: scalar("multi_init", file.dg.multi_init, file.dh.multi_init),
            multi_pair: scalar("multi_pair", file.dg.multi_pair, file.dh.multi_pair),
            multi_base: scalar("multi_base", file.dg.multi_base, file.dh.multi_base),
            join_penalty: scalar("join_penalty", file.dg.join_penalty, file.dh.join_penalty),
            log_loop_penalty: scalar("log_loop_penalty", file.dg.log_loop_penalty, file.dh.log_loop_penalty),
            loop_bias: scalar("loop_bias", file.dg.loop_bias, file.dh.loop_bias),
        })
    }

    /// Interpolate every field to `kelvin`, per `g = (T/Tref) g + (1 - T/Tref) h`,
    /// then fold `loop_bias` additively into the length arrays plus
    /// `join_penalty` and `multi_init`.
    pub fn at_temperature(&self, kelvin: f64) -> InterpolatedParameters {
        let r = kelvin / T_REF;
        let interp_scalar = |(g, h): (f64, f64)| r * g + (1.0 - r) * h;
        let bias = interp_scalar(self.loop_bias);
        let biased = |v: Vec<f64>| v.into_iter().map(|x| x + bias).collect::<Vec<f64>>();

        InterpolatedParameters {
            material: self.material.clone(),
            wobble_pairing: self.default_wobble_pairing,
            stack: self.stack.interpolate(r),
            coaxial_stack: self.coaxial_stack.interpolate(r),
            interior_mismatch: self.interior_mismatch.interpolate(r),
            terminal_mismatch: self.terminal_mismatch.interpolate(r),
            hairpin_mismatch: self.hairpin_mismatch.interpolate(r),
            interior_1x1: self.interior_1x1.interpolate(r),
            interior_1x2: self.interior_1x2.interpolate(r),
            interior_2x2: self.interior_2x2.interpolate(r),
            hairpin_triloop: self.hairpin_triloop.interpolate(r),
            hairpin_tetraloop: self.hairpin_tetraloop.interpolate(r),
            dangle5: self.dangle5.interpolate(r),
            dangle3: self.dangle3.interpolate(r),
            terminal_penalty: self.terminal_penalty.interpolate(r),
            hairpin_size: biased(self.hairpin_size.interpolate(r)),
            bulge_size: biased(self.bulge_size.interpolate(r)),
            interior_size: biased(self.interior_size.interpolate(r)),
            ninio: self.ninio.interpolate(r),
            multi_init: interp_scalar(self.multi_init) + bias,
            multi_pair: interp_scalar(self.multi_pair),
            multi_base: interp_scalar(self.multi_base),
            join_penalty: interp_scalar(self.join_penalty) + bias,
            log_loop_penalty: interp_scalar(self.log_loop_penalty),
            loop_bias: bias,
        }
    }
}

/// Which size-dependent table a loop-length penalty is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Hairpin,
    Bulge,
    Interior,
}

/// Parameters interpolated to a single temperature; this is what `nn_energy`
/// consults on every loop-energy lookup.
#[derive(Debug, Clone)]
pub struct InterpolatedParameters {
    pub material: String,
    pub wobble_pairing: bool,

    pub stack: Vec<f64>,
    pub coaxial_stack: Vec<f64>,
    pub interior_mismatch: Vec<f64>,
    pub terminal_mismatch: Vec<f64>,
    pub hairpin_mismatch: Vec<f64>,
    pub interior_1x1: Vec<f64>,
    pub interior_1x2: Vec<f64>,
    pub interior_2x2: Vec<f64>,
    pub hairpin_triloop: Vec<f64>,
    pub hairpin_tetraloop: Vec<f64>,
    pub dangle5: Vec<f64>,
    pub dangle3: Vec<f64>,
    pub terminal_penalty: Vec<f64>,

    pub hairpin_size: Vec<f64>,
    pub bulge_size: Vec<f64>,
    pub interior_size: Vec<f64>,
    pub ninio: Vec<f64>,

    pub multi_init: f64,
    pub multi_pair: f64,
    pub multi_base: f64,
    pub join_penalty: f64,
    pub log_loop_penalty: f64,
    pub loop_bias: f64,
}

impl InterpolatedParameters {
    /// Loop-length penalty, extrapolating past the tabulated cap with the
    /// Jacobson-Stockmayer log term: `dG(cap) + log_loop * ln(len/cap)`.
    pub fn size_penalty(&self, class: SizeClass, len: usize) -> f64 {
        let table = match class {
            SizeClass::Hairpin => &self.hairpin_size,
            SizeClass::Bulge => &self.bulge_size,
            SizeClass::Interior => &self.interior_size,
        };
        let cap = table.len() - 1;
        if len <= cap {
            table[len]
        } else {
            table[cap] + self.log_loop_penalty * ((len as f64) / (cap as f64)).ln()
        }
    }

    pub fn ninio(&self, n1: usize, n2: usize) -> f64 {
        let asym = n1.abs_diff(n2).min(self.ninio.len() - 1);
        self.ninio[asym]
    }
}
