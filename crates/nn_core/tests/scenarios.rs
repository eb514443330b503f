use rand::rngs::StdRng;
use rand::SeedableRng;

use nn_core::{equilibrate, CachedModel, Complex, ConcentrationOptions, Driver, ModelConditions, NearestNeighborModel, Parallelism, ParameterSet, Strand};
use ndarray::array;

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

fn driver() -> Driver {
    Driver::new(toy_model()).with_parallelism(Parallelism::Sequential)
}

/// Boundary behavior: a strand with no pairable bases is the all-unpaired
/// structure, and every row of the pair-probability matrix puts all mass
/// on the diagonal.
#[test]
fn test_unpairable_strand_has_no_pairs() {
    let driver = driver();
    let complex = Complex::new(vec![Strand::try_from("AAAA").unwrap()]).unwrap();

    let (mfe_kcal, pairs) = driver.mfe(&complex).unwrap();
    assert_eq!(mfe_kcal, 0.0);
    assert!(pairs.is_empty());

    let probs = driver.pair_probabilities(&complex).unwrap();
    for i in 0..4 {
        for j in 0..4 {
            if i == j {
                assert!((probs.get(i, j) - 1.0).abs() < 1e-9);
            } else {
                assert!(probs.get(i, j).abs() < 1e-9);
            }
        }
    }
}

/// Subopt with gap = 0 returns only (and at least one) MFE-energy
/// structure.
#[test]
fn test_subopt_zero_gap_returns_only_mfe_structures() {
    let driver = driver();
    let complex = Complex::new(vec![Strand::try_from("GGGGCCCC").unwrap()]).unwrap();
    let (mfe_kcal, _) = driver.mfe(&complex).unwrap();

    let structures = driver.subopt(&complex, 0.0).unwrap();
    assert!(!structures.is_empty());
    for s in &structures {
        assert!((s.energy_kcal - mfe_kcal).abs() < 1e-6);
    }
}

/// Sampling consistency: empirical pair frequencies from enough Boltzmann
/// samples land close to the exact pair-probability matrix.
#[test]
fn test_sampling_converges_to_pair_probabilities() {
    let driver = driver();
    let complex = Complex::new(vec![Strand::try_from("GCGCGCGC").unwrap()]).unwrap();
    let n = 8;

    let exact = driver.pair_probabilities(&complex).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let result = driver.sample(&complex, 4000, &mut rng).unwrap();

    let mut counts = vec![0u32; n * n];
    for sample in &result.samples {
        let mut paired = vec![false; n];
        for &(i, j) in sample {
            counts[i * n + j] += 1;
            counts[j * n + i] += 1;
            paired[i] = true;
            paired[j] = true;
        }
        for (i, &is_paired) in paired.iter().enumerate() {
            if !is_paired {
                counts[i * n + i] += 1;
            }
        }
    }

    let mut l1 = 0.0;
    for i in 0..n {
        for j in 0..n {
            let empirical = counts[i * n + j] as f64 / result.samples.len() as f64;
            l1 += (empirical - exact.get(i, j)).abs();
        }
    }
    assert!(l1 / (n * n) as f64 < 0.05, "L1 distance too large: {l1}");
}

/// Concentration solve: A = [[1], [2]], q = [0, 0], x0 = [1] produces the
/// monomer/dimer mix x1 + 2 x2 = 1, x2 / x1^2 = 1.
#[test]
fn test_concentration_solve_dimerization() {
    let a = array![[1.0], [2.0]];
    let x0 = array![1.0];
    let log_q = array![0.0, 0.0];
    let result = equilibrate(&a, &x0, &log_q, &ConcentrationOptions::default()).unwrap();

    assert!(result.converged);
    let x1 = result.concentrations[0];
    let x2 = result.concentrations[1];
    assert!((x1 + 2.0 * x2 - 1.0).abs() < 1e-6);
    assert!((x2 / (x1 * x1) - 1.0).abs() < 1e-3);
}

/// A multi-strand duplex: the two fully complementary strands pair across
/// the nick, so the interacting MFE should fold more favorably than the
/// no-pairing closed form `noninteracting_partition_function` assumes.
#[test]
fn test_multi_strand_duplex_pairs_across_the_nick() {
    let driver = driver();
    let complex = Complex::new(vec![Strand::try_from("ACGU").unwrap(), Strand::try_from("ACGU").unwrap()]).unwrap();

    let (mfe_kcal, pairs) = driver.mfe(&complex).unwrap();
    assert!(mfe_kcal < 0.0);
    assert!(!pairs.is_empty());

    let pf = driver.partition_function(&complex).unwrap();
    let noninteracting_pf = driver.noninteracting_partition_function(&complex).unwrap();
    assert!(pf > noninteracting_pf);

    let probs = driver.pair_probabilities(&complex).unwrap();
    let row_sum: f64 = (0..8).map(|j| probs.get(0, j)).sum();
    assert!((row_sum - 1.0).abs() < 1e-6);
}

/// A self-symmetric homodimer (two copies of the same unpairable strand)
/// has the same per-strand partition function and join penalty as the
/// otherwise-equivalent heterodimer below, differing only by the factor
/// of 2 the homodimer's `symmetry_order()` divides out.
#[test]
fn test_noninteracting_pf_divides_out_self_symmetry() {
    let driver = driver();
    let homodimer = Complex::new(vec![Strand::try_from("AAAA").unwrap(), Strand::try_from("AAAA").unwrap()]).unwrap();
    let heterodimer = Complex::new(vec![Strand::try_from("AAAA").unwrap(), Strand::try_from("CCCC").unwrap()]).unwrap();
    assert_eq!(homodimer.symmetry_order(), 2);
    assert_eq!(heterodimer.symmetry_order(), 1);

    let pf_homodimer = driver.noninteracting_partition_function(&homodimer).unwrap();
    let pf_heterodimer = driver.noninteracting_partition_function(&heterodimer).unwrap();
    assert!((pf_heterodimer - 2.0 * pf_homodimer).abs() < 1e-9);
}
