use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

use nn_dp::{fill, RayonEnvironment, SequentialEnvironment};
use nn_energy::{CachedModel, ModelConditions, NearestNeighborModel, PfValue};
use nn_params::ParameterSet;
use nn_structure::Base::*;

fn toy_model() -> NearestNeighborModel {
    let json = r#"{
        "dG": {
            "stack": {"CGCG": -2.36, "GCGC": -3.26, "AUAU": -1.1, "UAUA": -1.33},
            "hairpin_size": [5.4,5.4,5.4,5.4,5.4,4.4,4.3,4.1,4.1,4.2,
                4.3,4.4,4.5,4.6,4.6,4.7,4.8,4.8,4.9,4.9,5.0,5.0,5.0,5.1,5.1,5.1,5.2,5.2,5.2,5.3,5.3],
            "multi_init": 3.4, "multi_pair": -0.1, "multi_base": 0.2, "join_penalty": 0.0
        },
        "dH": {},
        "material": "rna"
    }"#;
    let ps = ParameterSet::from_json(json).unwrap();
    let cached = CachedModel::new(&ps, ModelConditions::default());
    NearestNeighborModel::new(cached, 3)
}

fn pf_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("PartitionFunctionFill");
    let seq: Vec<_> = "GCGCAAAUUUGCGCAAAGCGCAAAUUUGCGC".chars().map(|ch| match ch {
        'A' => A,
        'C' => C,
        'G' => G,
        _ => U,
    }).collect();
    let model = toy_model();

    group.bench_function("sequential", |b| {
        b.iter(|| fill::<PfValue, _>(&seq, &model, 3, &SequentialEnvironment).unwrap());
    });

    group.bench_function("rayon", |b| {
        b.iter(|| fill::<PfValue, _>(&seq, &model, 3, &RayonEnvironment).unwrap());
    });
}

criterion_group!(benches, pf_fill);
criterion_main!(benches);
