use nn_energy::Semiring;

/// Every DP matrix for a single complex, at a single scalar width. Only
/// the upper triangle (`i <= j`) of each `n x n` buffer is ever written;
/// cells below the diagonal are never read.
///
/// - `q`   overall partition function / best energy for the span `[i, j]`
/// - `qb`  restricted to structures where `(i, j)` is itself a pair
/// - `qm`  multiloop fragment `[i, j]` with at least one branch
/// - `qms` multiloop fragment whose first branch starts exactly at `i`
///         (lets `qm`'s recursion split in O(1) amortized per cell)
pub struct Block<R: Semiring> {
    pub n: usize,
    pub q: Vec<R>,
    pub qb: Vec<R>,
    pub qm: Vec<R>,
    pub qms: Vec<R>,
}

impl<R: Semiring> Block<R> {
    pub fn new(n: usize) -> Self {
        let cells = n * n;
        Block {
            n,
            q: vec![R::zero(); cells],
            qb: vec![R::zero(); cells],
            qm: vec![R::zero(); cells],
            qms: vec![R::zero(); cells],
        }
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    #[inline]
    pub fn get_q(&self, i: usize, j: usize) -> R {
        self.q[self.idx(i, j)]
    }
    #[inline]
    pub fn set_q(&mut self, i: usize, j: usize, v: R) {
        let k = self.idx(i, j);
        self.q[k] = v;
    }

    #[inline]
    pub fn get_qb(&self, i: usize, j: usize) -> R {
        self.qb[self.idx(i, j)]
    }
    #[inline]
    pub fn set_qb(&mut self, i: usize, j: usize, v: R) {
        let k = self.idx(i, j);
        self.qb[k] = v;
    }

    #[inline]
    pub fn get_qm(&self, i: usize, j: usize) -> R {
        self.qm[self.idx(i, j)]
    }
    #[inline]
    pub fn set_qm(&mut self, i: usize, j: usize, v: R) {
        let k = self.idx(i, j);
        self.qm[k] = v;
    }

    #[inline]
    pub fn get_qms(&self, i: usize, j: usize) -> R {
        self.qms[self.idx(i, j)]
    }
    #[inline]
    pub fn set_qms(&mut self, i: usize, j: usize, v: R) {
        let k = self.idx(i, j);
        self.qms[k] = v;
    }
}
