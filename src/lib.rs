//! In-memory ordered index using a parent-linked [AVL][avl] tree.
//!
//! [avl]: https://en.wikipedia.org/wiki/AVL_tree

mod avl;
mod depth;
mod error;
mod iter;
mod node;

pub use crate::avl::{Avl, Insert, Stats};
pub use crate::depth::Depth;
pub use crate::error::AvlError;
pub use crate::iter::{Cursor, IntoIter, Iter, Keys, Values};
pub use crate::node::Node;

#[cfg(test)]
mod prop_test;
