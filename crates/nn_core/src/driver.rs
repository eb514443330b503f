use std::sync::Arc;

use rand::Rng;

use nn_backtrack::{
    pair_mfe_cost_with_nicks, pair_probabilities_with_nicks, sample_with_nicks, subopt_with_nicks, PairMfeCost,
    PairProbabilities, SampleResult, SuboptResult,
};
use nn_dp::{fill_with_nicks, Block, BlockCache, DpError, RayonEnvironment, SequentialEnvironment, StorageMode};
use nn_energy::{CachedModel, EnergyAdapter, MfeValue, NearestNeighborModel, PfValue, Semiring};
use nn_structure::{Base, Complex};

use crate::error::CoreError;

/// Default LRU capacity (in evaluated blocks, one per distinct canonical
/// complex and ring) when a `Driver` is built without an explicit cache
/// size via `with_cache_capacity`.
const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Which anti-diagonal evaluation strategy `Driver` asks `nn_dp` to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

/// The facade over the DP engine, backtracking, and energy model: one
/// `Driver` per energy model / conditions, reused across however many
/// complexes get folded against it.
pub struct Driver {
    pub model: NearestNeighborModel,
    pub parallelism: Parallelism,
    pf_cache: BlockCache<PfValue>,
    mfe_cache: BlockCache<MfeValue>,
}

impl Driver {
    pub fn new(model: NearestNeighborModel) -> Self {
        Driver {
            model,
            parallelism: Parallelism::Parallel,
            pf_cache: BlockCache::new(DEFAULT_CACHE_CAPACITY),
            mfe_cache: BlockCache::new(DEFAULT_CACHE_CAPACITY),
        }
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Rebuilds both rings' LRU caches with the given capacity (blocks
    /// evaluated before this call are dropped).
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.pf_cache = BlockCache::new(capacity);
        self.mfe_cache = BlockCache::new(capacity);
        self
    }

    pub fn pf_cache_len(&self) -> usize {
        self.pf_cache.len()
    }

    pub fn mfe_cache_len(&self) -> usize {
        self.mfe_cache.len()
    }

    fn fill<R>(&self, seq: &[Base], nicks: &[usize]) -> Result<Block<R>, DpError>
    where
        R: Semiring + Send + Sync,
        CachedModel: EnergyAdapter<R>,
    {
        match self.parallelism {
            Parallelism::Sequential => fill_with_nicks(seq, nicks, &self.model, self.model.min_hairpin, &SequentialEnvironment),
            Parallelism::Parallel => fill_with_nicks(seq, nicks, &self.model, self.model.min_hairpin, &RayonEnvironment),
        }
    }

    /// Fills a block for `complex`, going through the ring-appropriate LRU
    /// cache first: a hit returns the cached block untouched (a second,
    /// distinct rotation of the same complex promotes the entry to
    /// `FullSquare` since that reader may index below the diagonal), a
    /// miss fills and inserts as `UpperTriangle` (the only storage mode a
    /// single forward `fill` call ever populates).
    fn fill_cached<R>(&self, complex: &Complex, seq: &[Base], nicks: &[usize], cache: &BlockCache<R>) -> Result<Arc<Block<R>>, DpError>
    where
        R: Semiring + Send + Sync,
        CachedModel: EnergyAdapter<R>,
    {
        let key = BlockCache::key_for(complex);
        if let Some(hit) = cache.get(&key) {
            if complex.strands() != complex.canonical_form().strands() {
                cache.promote(&key);
            }
            return Ok(hit);
        }
        let block = Arc::new(self.fill::<R>(seq, nicks)?);
        cache.insert(key, block.clone(), StorageMode::UpperTriangle);
        Ok(block)
    }

    /// The concatenated, gap-free sequence `nn_dp` folds for `complex`,
    /// plus the strand-break positions (see `Complex::nick_positions`)
    /// that keep a hairpin/interior loop from spanning a nick.
    fn concatenated(complex: &Complex) -> (Vec<Base>, Vec<usize>) {
        (complex.concatenated_bases(), complex.nick_positions())
    }

    /// Partition function in native (non-log) scale. `1.0` for a sequence
    /// too short to form any hairpin.
    pub fn partition_function(&self, complex: &Complex) -> Result<f64, CoreError> {
        let (seq, nicks) = Self::concatenated(complex);
        match self.fill_cached(complex, &seq, &nicks, &self.pf_cache) {
            Ok(block) => Ok(block.get_q(0, seq.len() - 1).weight()),
            Err(DpError::TooShort { .. }) => Ok(1.0),
            Err(e) => Err(e.into()),
        }
    }

    /// Minimum free energy in kcal/mol, plus one MFE-optimal pair list
    /// (ties are resolved by `subopt`'s own deterministic order).
    pub fn mfe(&self, complex: &Complex) -> Result<(f64, Vec<(usize, usize)>), CoreError> {
        let (seq, nicks) = Self::concatenated(complex);
        let block = match self.fill_cached(complex, &seq, &nicks, &self.mfe_cache) {
            Ok(block) => block,
            Err(DpError::TooShort { .. }) => return Ok((0.0, Vec::new())),
            Err(e) => return Err(e.into()),
        };
        let mfe_kcal = block.get_q(0, seq.len() - 1).0 as f64 / 100.0;
        let structures = subopt_with_nicks(&seq, &nicks, &self.model, self.model.min_hairpin, &block, 0.0)?;
        let pairs = structures.into_iter().next().map(|s| s.pairs).unwrap_or_default();
        Ok((mfe_kcal, pairs))
    }

    pub fn pair_probabilities(&self, complex: &Complex) -> Result<PairProbabilities, CoreError> {
        let (seq, nicks) = Self::concatenated(complex);
        match self.fill_cached(complex, &seq, &nicks, &self.pf_cache) {
            Ok(block) => Ok(pair_probabilities_with_nicks(&seq, &nicks, &self.model, &block)),
            Err(DpError::TooShort { .. }) => Ok(PairProbabilities::identity(seq.len())),
            Err(e) => Err(e.into()),
        }
    }

    pub fn pair_mfe_cost(&self, complex: &Complex) -> Result<PairMfeCost, CoreError> {
        let (seq, nicks) = Self::concatenated(complex);
        match self.fill_cached(complex, &seq, &nicks, &self.mfe_cache) {
            Ok(block) => Ok(pair_mfe_cost_with_nicks(&seq, &nicks, &self.model, &block)),
            Err(DpError::TooShort { .. }) => Ok(PairMfeCost::unpairable(seq.len())),
            Err(e) => Err(e.into()),
        }
    }

    pub fn subopt(&self, complex: &Complex, gap_kcal: f64) -> Result<Vec<SuboptResult>, CoreError> {
        let (seq, nicks) = Self::concatenated(complex);
        let block = match self.fill_cached(complex, &seq, &nicks, &self.mfe_cache) {
            Ok(block) => block,
            Err(DpError::TooShort { .. }) => return Ok(vec![SuboptResult { pairs: Vec::new(), energy_kcal: 0.0 }]),
            Err(e) => return Err(e.into()),
        };
        Ok(subopt_with_nicks(&seq, &nicks, &self.model, self.model.min_hairpin, &block, gap_kcal)?)
    }

    pub fn sample(&self, complex: &Complex, n_samples: usize, rng: &mut impl Rng) -> Result<SampleResult, CoreError> {
        let (seq, nicks) = Self::concatenated(complex);
        let block = match self.fill_cached(complex, &seq, &nicks, &self.pf_cache) {
            Ok(block) => block,
            Err(DpError::TooShort { .. }) => return Ok(SampleResult { samples: vec![Vec::new(); n_samples], operations: 0 }),
            Err(e) => return Err(e.into()),
        };
        Ok(sample_with_nicks(&seq, &nicks, &self.model, self.model.min_hairpin, &block, n_samples, rng))
    }

    /// The partition function of a multi-strand complex under the
    /// assumption that no inter-strand base pair forms: the product of
    /// each strand's own partition function, times the join penalty
    /// accrued at every strand junction, divided by `symmetry_order()` to
    /// avoid overcounting a self-symmetric complex's indistinguishable
    /// rotations (e.g. two copies of the same strand).
    pub fn noninteracting_partition_function(&self, complex: &Complex) -> Result<f64, CoreError> {
        let mut product = 1.0;
        for strand in complex.strands() {
            let seq = strand.to_vec();
            match self.fill::<PfValue>(&seq, &[]) {
                Ok(block) => product *= block.get_q(0, seq.len() - 1).weight(),
                Err(DpError::TooShort { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        let n_strands = complex.num_strands();
        if n_strands > 1 {
            let join_total = self.model.model.params().join_penalty * (n_strands - 1) as f64;
            let join_term: PfValue = self.model.model.term(join_total);
            product *= join_term.weight();
        }
        product /= complex.symmetry_order() as f64;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nn_energy::ModelConditions;
    use nn_params::ParameterSet;
    use nn_structure::Strand;

    fn toy_model() -> NearestNeighborModel {
        let json = r#"{
            "dG": {
                "stack": {"CGCG": -2.36, "GCGC": -3.26, "AUAU": -1.1, "UAUA": -1.33},
                "hairpin_size": [5.4,5.4,5.4,5.4,5.4,4.4,4.3,4.1,4.1,4.2,
                    4.3,4.4,4.5,4.6,4.6,4.7,4.8,4.8,4.9,4.9,5.0,5.0,5.0,5.1,5.1,5.1,5.2,5.2,5.2,5.3,5.3],
                "multi_init": 3.4, "multi_pair": -0.1, "multi_base": 0.2, "join_penalty": 1.96
            },
            "dH": {},
            "material": "rna"
        }"#;
        let ps = ParameterSet::from_json(json).unwrap();
        let cached = CachedModel::new(&ps, ModelConditions::default());
        NearestNeighborModel::new(cached, 3)
    }

    #[test]
    fn test_short_sequence_has_trivial_fold() {
        let driver = Driver::new(toy_model()).with_parallelism(Parallelism::Sequential);
        let complex = Complex::new(vec![Strand::try_from("AC").unwrap()]).unwrap();
        let (mfe_kcal, pairs) = driver.mfe(&complex).unwrap();
        assert_eq!(mfe_kcal, 0.0);
        assert!(pairs.is_empty());
        assert_eq!(driver.partition_function(&complex).unwrap(), 1.0);
    }

    #[test]
    fn test_pair_probabilities_identity_for_short_sequence() {
        let driver = Driver::new(toy_model()).with_parallelism(Parallelism::Sequential);
        let complex = Complex::new(vec![Strand::try_from("A").unwrap()]).unwrap();
        let probs = driver.pair_probabilities(&complex).unwrap();
        assert_eq!(probs.get(0, 0), 1.0);
    }

    #[test]
    fn test_fold_produces_a_pair_for_a_self_complementary_strand() {
        let driver = Driver::new(toy_model()).with_parallelism(Parallelism::Sequential);
        let complex = Complex::new(vec![Strand::try_from("GCGCAAAUUUGCGC").unwrap()]).unwrap();
        let (mfe_kcal, pairs) = driver.mfe(&complex).unwrap();
        assert!(mfe_kcal < 0.0);
        assert!(!pairs.is_empty());
    }

    #[test]
    fn test_multi_strand_complex_folds_a_duplex_across_the_nick() {
        let driver = Driver::new(toy_model()).with_parallelism(Parallelism::Sequential);
        let complex = Complex::new(vec![Strand::try_from("ACGU").unwrap(), Strand::try_from("ACGU").unwrap()]).unwrap();
        let (mfe_kcal, pairs) = driver.mfe(&complex).unwrap();
        assert!(mfe_kcal <= 0.0);
        assert!(!pairs.is_empty());
        let pf = driver.partition_function(&complex).unwrap();
        assert!(pf >= 1.0);
        let probs = driver.pair_probabilities(&complex).unwrap();
        assert_eq!(probs.get(0, 7), probs.get(7, 0));
    }

    #[test]
    fn test_repeated_fold_reuses_cached_block() {
        let driver = Driver::new(toy_model()).with_parallelism(Parallelism::Sequential);
        let complex = Complex::new(vec![Strand::try_from("GCGCAAAUUUGCGC").unwrap()]).unwrap();
        assert_eq!(driver.mfe_cache_len(), 0);
        let (first_energy, _) = driver.mfe(&complex).unwrap();
        assert_eq!(driver.mfe_cache_len(), 1);
        let (second_energy, _) = driver.mfe(&complex).unwrap();
        assert_eq!(driver.mfe_cache_len(), 1);
        assert_eq!(first_energy, second_energy);
    }

    #[test]
    fn test_with_cache_capacity_resets_cache() {
        let driver = Driver::new(toy_model()).with_parallelism(Parallelism::Sequential);
        let complex = Complex::new(vec![Strand::try_from("GCGCAAAUUUGCGC").unwrap()]).unwrap();
        driver.mfe(&complex).unwrap();
        assert_eq!(driver.mfe_cache_len(), 1);
        let driver = driver.with_cache_capacity(8);
        assert_eq!(driver.mfe_cache_len(), 0);
    }

    #[test]
    fn test_noninteracting_partition_function_multiplies_strands() {
        let driver = Driver::new(toy_model()).with_parallelism(Parallelism::Sequential);
        let single = Complex::new(vec![Strand::try_from("AC").unwrap()]).unwrap();
        let doubled = Complex::new(vec![Strand::try_from("AC").unwrap(), Strand::try_from("AC").unwrap()]).unwrap();
        let pf_single = driver.noninteracting_partition_function(&single).unwrap();
        let pf_doubled = driver.noninteracting_partition_function(&doubled).unwrap();
        assert!(pf_doubled < pf_single * pf_single);
        assert!(pf_doubled > 0.0);
    }
}
