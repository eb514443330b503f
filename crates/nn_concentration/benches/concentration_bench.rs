use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

use nn_concentration::{equilibrate, Method, Options};
use ndarray::{Array1, Array2};

fn ladder(n: usize) -> (Array2<f64>, Array1<f64>, Array1<f64>) {
    let mut a = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        a[[i, i]] = (i + 1) as f64;
    }
    let x0 = Array1::from_elem(n, 1.0);
    let log_q = Array1::zeros(n);
    (a, x0, log_q)
}

fn equilibrate_dogleg(c: &mut Criterion) {
    let mut group = c.benchmark_group("Equilibrate");
    let (a, x0, log_q) = ladder(16);
    let options = Options::default();

    group.bench_function("dogleg", |b| {
        b.iter(|| equilibrate(&a, &x0, &log_q, &options).unwrap());
    });

    let mut cd_options = Options::default();
    cd_options.method = Method::Cd;
    group.bench_function("cd", |b| {
        b.iter(|| equilibrate(&a, &x0, &log_q, &cd_options).unwrap());
    });
}

criterion_group!(benches, equilibrate_dogleg);
criterion_main!(benches);
