use nn_structure::{NAIDX, PairTable};

use crate::NearestNeighborLoop;

pub trait LoopDecomposition {
    fn for_each_loop<F: FnMut(&NearestNeighborLoop)>(&self, f: F);

    fn loops(&self) -> Vec<NearestNeighborLoop> {
        let mut out = Vec::new();
        self.for_each_loop(|l| out.push(l.clone()));
        out
    }

    fn loop_enclosed_by(&self, closing: Option<(NAIDX, NAIDX)>) -> NearestNeighborLoop;

    fn get_enclosing_pair(&self, i: NAIDX, j: NAIDX) -> Option<(NAIDX, NAIDX)>;
}

impl LoopDecomposition for PairTable {
    fn for_each_loop<F: FnMut(&NearestNeighborLoop)>(&self, mut f: F) {
        fn recurse<F: FnMut(&NearestNeighborLoop)>(
            pt: &PairTable,
            closing: Option<(NAIDX, NAIDX)>,
            f: &mut F,
        ) {
            let mut branches = Vec::new();

            let (mut p, j) = if let Some((i, j)) = closing {
                (i as usize + 1, j as usize)
            } else {
                (0, pt.len())
            };

            while p < j {
                if let Some(q) = pt[p] {
                    debug_assert!(q > p);
                    branches.push((p as NAIDX, q as NAIDX));
                    recurse(pt, Some((p as NAIDX, q as NAIDX)), f);
                    p = q + 1;
                } else {
                    p += 1;
                }
            }
            f(&NearestNeighborLoop::classify(
                closing.map(|(i, j)| (i as usize, j as usize)),
                branches.iter().map(|&(p, q)| (p as usize, q as usize)).collect(),
            ));
        }
        recurse(self, None, &mut f);
    }

    fn loop_enclosed_by(&self, closing: Option<(NAIDX, NAIDX)>) -> NearestNeighborLoop {
        let mut branches = Vec::new();

        let (mut p, j) = if let Some((i, j)) = closing {
            (i as usize + 1, j as usize)
        } else {
            (0, self.len())
        };

        while p < j {
            if let Some(q) = self[p] {
                debug_assert!(q > p);
                branches.push((p, q));
                p = q + 1;
            } else {
                p += 1;
            }
        }
        NearestNeighborLoop::classify(closing.map(|(i, j)| (i as usize, j as usize)), branches)
    }

    fn get_enclosing_pair(&self, i: NAIDX, j: NAIDX) -> Option<(NAIDX, NAIDX)> {
        let uj = j as usize;
        for q in uj..self.len() {
            if let Some(p) = self[q] {
                if p < i as usize {
                    return Some((p as NAIDX, q as NAIDX));
                }
            }
        }
        None
    }
}
