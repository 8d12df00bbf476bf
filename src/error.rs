use thiserror::Error;

/// AvlError enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, Error, PartialEq)]
pub enum AvlError<K> {
    /// Returned by create() API when key is already present.
    #[error("key already present")]
    OverwriteKey,
    /// Fatal case, index entries are not in sort-order.
    #[error("sort error: {0:?} out of order with {1:?}")]
    SortError(K, K),
    /// Fatal case, balance factor of node is outside {-1, 0, 1}.
    #[error("node {0:?} unbalanced, balance factor {1}")]
    UnbalancedNode(K, isize),
    /// Fatal case, recorded height (second) does not match the computed
    /// height (third) of the subtree.
    #[error("node {0:?} records height {1}, computed {2}")]
    HeightMismatch(K, usize, usize),
    /// Fatal case, child does not point back to its parent, or root has
    /// a parent.
    #[error("node {0:?} has a broken parent link")]
    ParentMismatch(K),
    /// Fatal case, entry counter (first) differs from the number of
    /// reachable nodes (second).
    #[error("size mismatch, counted {0} reachable {1}")]
    SizeMismatch(usize, usize),
}
