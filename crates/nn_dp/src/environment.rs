/// Abstracts over how the cells of one anti-diagonal are evaluated: in
/// parallel via `rayon` (the default), or sequentially for deterministic
/// tests and benchmark comparisons.
pub trait Environment {
    fn map<T: Send, F: Fn(usize) -> T + Sync>(&self, items: &[usize], f: F) -> Vec<T>;

    fn spread<F: Fn(usize) + Sync>(&self, items: &[usize], f: F) {
        let _ = self.map(items, |i| {
            f(i);
        });
    }
}

pub struct RayonEnvironment;

impl Environment for RayonEnvironment {
    fn map<T: Send, F: Fn(usize) -> T + Sync>(&self, items: &[usize], f: F) -> Vec<T> {
        use rayon::prelude::*;
        items.par_iter().map(|&i| f(i)).collect()
    }
}

pub struct SequentialEnvironment;

impl Environment for SequentialEnvironment {
    fn map<T: Send, F: Fn(usize) -> T + Sync>(&self, items: &[usize], f: F) -> Vec<T> {
        items.iter().map(|&i| f(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_matches_rayon() {
        let items: Vec<usize> = (0..50).collect();
        let seq = SequentialEnvironment.map(&items, |i| i * i);
        let par = RayonEnvironment.map(&items, |i| i * i);
        assert_eq!(seq, par);
    }
}
