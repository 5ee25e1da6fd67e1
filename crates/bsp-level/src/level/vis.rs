//! Potentially visible set lookup.

/// Cluster-to-cluster visibility bitset, one row of `row_length` bytes per
/// source cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityTable {
    num_clusters: usize,
    row_length: usize,
    data: Vec<u8>,
}

impl VisibilityTable {
    /// Wraps a table already checked to hold `num_clusters * row_length` bytes.
    pub(crate) fn new(num_clusters: usize, row_length: usize, data: Vec<u8>) -> Self {
        Self {
            num_clusters,
            row_length,
            data,
        }
    }

    #[inline]
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    #[inline]
    pub fn row_length(&self) -> usize {
        self.row_length
    }

    /// Whether cluster `to` is potentially visible from cluster `from`.
    ///
    /// A target without a cluster is never visible. A viewer without a
    /// cluster (outside the playable volume) sees everything else. Rows are
    /// read as stored: the table is not assumed symmetric.
    pub fn is_visible(&self, from: i32, to: i32) -> bool {
        if to < 0 {
            return false;
        }
        if from < 0 {
            return true;
        }
        let (from, to) = (from as usize, to as usize);
        let offset = from * self.row_length + (to >> 3);
        self.data
            .get(offset)
            .is_some_and(|byte| byte & (1 << (to & 7)) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 clusters, 2 bytes per row. Cluster 0 sees 0 and 9, cluster 9 sees only itself.
    fn table() -> VisibilityTable {
        let mut data = vec![0u8; 20];
        data[0] = 0b0000_0001;
        data[1] = 0b0000_0010;
        data[9 * 2 + 1] = 0b0000_0010;
        VisibilityTable::new(10, 2, data)
    }

    #[test]
    fn bit_lookup_uses_row_and_column() {
        let vis = table();
        assert!(vis.is_visible(0, 0));
        assert!(vis.is_visible(0, 9));
        assert!(!vis.is_visible(0, 1));
        assert!(vis.is_visible(9, 9));
    }

    #[test]
    fn lookup_is_asymmetric() {
        let vis = table();
        assert!(vis.is_visible(0, 9));
        assert!(!vis.is_visible(9, 0));
    }

    #[test]
    fn missing_clusters() {
        let vis = table();
        for c in 0..10 {
            assert!(!vis.is_visible(c, -1), "no cluster target must be hidden");
            assert!(vis.is_visible(-1, c), "no cluster viewer must see {c}");
        }
        assert!(!vis.is_visible(-1, -1));
    }
}
