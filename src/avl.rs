use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt, mem,
    ops::Index,
};

use rand::Rng;
use slab::Slab;
use tracing::{debug, error, trace};

use crate::depth::Depth;
use crate::error::AvlError;
use crate::iter::{Cursor, IntoIter, Iter, Keys, Values};
use crate::node::Node;

/// Avl manage a single instance of in-memory index using
/// [AVL][avl] tree.
///
/// Nodes are kept in a slab owned by the instance and linked by index,
/// each node keeping a back-link to its parent. Cursors use those links
/// to step through entries in sort order without auxiliary storage.
///
/// [avl]: https://en.wikipedia.org/wiki/AVL_tree
#[derive(Clone)]
pub struct Avl<K, V> {
    name: String,
    nodes: Slab<Node<K, V>>,
    root: Option<usize>,
    n_count: usize, // number of entries in the tree.
}

/// Outcome of [`Avl::insert`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Insert<V> {
    /// Key was absent, a new entry is created.
    Inserted,
    /// Key was present, its value is replaced and the old value returned.
    Updated(V),
}

impl<V> Insert<V> {
    #[inline]
    pub fn is_inserted(&self) -> bool {
        matches!(self, Insert::Inserted)
    }
}

/// Different ways to construct a new Avl instance.
impl<K, V> Avl<K, V>
where
    K: Ord,
{
    /// Create an empty instance of Avl, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> Avl<K, V>
    where
        S: AsRef<str>,
    {
        Avl {
            name: name.as_ref().to_string(),
            nodes: Slab::new(),
            root: None,
            n_count: 0,
        }
    }

    /// Create a new instance of Avl tree and load it with entries
    /// from `iter`. Note that iterator should return (key, value) tuples,
    /// where key must be ``unique``.
    pub fn load_from<S, I>(name: S, iter: I) -> Result<Avl<K, V>, AvlError<K>>
    where
        S: AsRef<str>,
        I: Iterator<Item = (K, V)>,
    {
        let mut avl = Avl::new(name);
        for (key, value) in iter {
            avl.create(key, value)?;
        }
        debug!(index = %avl.name, entries = avl.n_count, "loaded");
        Ok(avl)
    }
}

/// Maintenance API.
impl<K, V> Avl<K, V> {
    /// Identify this instance. Applications can choose unique names while
    /// creating Avl instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return the height of the tree, zero for an empty tree.
    #[inline]
    pub fn height(&self) -> usize {
        Node::height_of(&self.nodes, self.root)
    }

    /// Return quickly with basic statisics, only entries() method is valid
    /// with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<K, V>>())
    }

    /// Remove all entries. Nodes are released with the slab, independent
    /// of tree shape.
    pub fn clear(&mut self) {
        debug!(index = %self.name, entries = self.n_count, "clear");
        self.nodes.clear();
        self.root = None;
        self.n_count = 0;
    }

    #[inline]
    pub(crate) fn nodes(&self) -> &Slab<Node<K, V>> {
        &self.nodes
    }

    #[cfg(test)]
    pub(crate) fn nodes_mut(&mut self) -> &mut Slab<Node<K, V>> {
        &mut self.nodes
    }

    #[inline]
    pub(crate) fn root(&self) -> Option<usize> {
        self.root
    }

    pub(crate) fn first_id(&self) -> Option<usize> {
        self.root.map(|root| Node::leftmost(&self.nodes, root))
    }

    pub(crate) fn last_id(&self) -> Option<usize> {
        self.root.map(|root| Node::rightmost(&self.nodes, root))
    }
}

/// Write operations on Avl instance.
impl<K, V> Avl<K, V>
where
    K: Ord,
{
    /// Insert {key, value} entry into the index. If key is already present
    /// its value is replaced in place, without any structural change, and
    /// the old value is returned as [`Insert::Updated`].
    pub fn insert(&mut self, key: K, value: V) -> Insert<V> {
        let mut parent = match self.root {
            None => {
                let id = self.nodes.insert(Node::new(key, value, None));
                self.root = Some(id);
                self.n_count = 1;
                return Insert::Inserted;
            }
            Some(root) => root,
        };

        let id = loop {
            let node = &mut self.nodes[parent];
            let next = match node.key.cmp(&key) {
                Ordering::Greater => node.left,
                Ordering::Less => node.right,
                Ordering::Equal => return Insert::Updated(node.set_value(value)),
            };
            match next {
                Some(next) => parent = next,
                None => {
                    let left = node.key > key;
                    let id = self.nodes.insert(Node::new(key, value, Some(parent)));
                    if left {
                        self.nodes[parent].left = Some(id);
                    } else {
                        self.nodes[parent].right = Some(id);
                    }
                    break id;
                }
            }
        };
        self.n_count += 1;

        self.rebalance_insert(self.nodes[id].parent);
        Insert::Inserted
    }

    /// Create a new {key, value} entry in the index. If key is already
    /// present return error, leaving the index untouched.
    pub fn create(&mut self, key: K, value: V) -> Result<(), AvlError<K>> {
        if self.contains_key(&key) {
            return Err(AvlError::OverwriteKey);
        }
        match self.insert(key, value) {
            Insert::Inserted => Ok(()),
            Insert::Updated(_) => unreachable!(),
        }
    }

    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        match self.insert(key, value) {
            Insert::Inserted => None,
            Insert::Updated(old_value) => Some(old_value),
        }
    }

    /// Delete key from this instance and return its value. If key is
    /// not present, then delete is effectively a no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut id = self.find_id(key)?;

        // With two children, swap the entry into the in-order successor
        // and remove that node instead, it has no left child.
        if let (Some(_), Some(right)) = (self.nodes[id].left, self.nodes[id].right) {
            let succ = Node::leftmost(&self.nodes, right);
            if let Some((node, snode)) = self.nodes.get2_mut(id, succ) {
                mem::swap(&mut node.key, &mut snode.key);
                mem::swap(&mut node.value, &mut snode.value);
            }
            id = succ;
        }

        let (parent, child) = {
            let node = &self.nodes[id];
            (node.parent, node.left.or(node.right))
        };
        if let Some(child) = child {
            self.nodes[child].parent = parent;
        }
        match parent {
            Some(_) => Node::replace_child(&mut self.nodes, parent, id, child),
            None => self.root = child,
        }

        let node = self.nodes.remove(id);
        self.n_count -= 1;

        self.rebalance_delete(parent);
        Some(node.value)
    }

    /// Remove and return the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)>
    where
        K: Clone,
    {
        let key = self.first()?.0.clone();
        let value = self.delete(&key)?;
        Some((key, value))
    }

    /// Validate AVL tree with following rules:
    ///
    /// * Every node's balance factor is within {-1, 0, 1}.
    /// * Every node's recorded height matches its subtree.
    /// * Every child points back to its parent, root has no parent.
    /// * Make sure keys are in sorted order.
    /// * Entry count matches the number of reachable nodes.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, AvlError<K>>
    where
        K: Clone,
    {
        let mut stats = Stats::new(self.n_count, mem::size_of::<Node<K, V>>());
        stats.set_depths(Depth::new());

        let res = self.do_validate(&mut stats);
        if res.is_err() {
            error!(index = %self.name, "validation failed");
        }
        let height = res?;
        stats.set_height(height);
        Ok(stats)
    }
}

/// Read operations on Avl instance.
impl<K, V> Avl<K, V>
where
    K: Ord,
{
    /// Get the value for key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_id(key).map(|id| &self.nodes[id].value)
    }

    /// Get a mutable reference to the value for key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_id(key)?;
        Some(&mut self.nodes[id].value)
    }

    /// Check whether key is present in this index.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_id(key).is_some()
    }

    /// Return the entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.first_id().map(|id| self.entry(id))
    }

    /// Return the entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.last_id().map(|id| self.entry(id))
    }

    /// Return a random entry from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<(&K, &V)> {
        let mut id = self.root?;

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let node = &self.nodes[id];
            let next = if rng.gen::<bool>() {
                node.left
            } else {
                node.right
            };
            match next {
                Some(next) if at_depth > 0 => {
                    at_depth -= 1;
                    id = next;
                }
                _ => break Some(self.entry(id)),
            }
        }
    }

    /// Cursor at the smallest key, or at [`Avl::end`] when empty.
    pub fn begin(&self) -> Cursor<K, V> {
        Cursor::new(self, self.first_id())
    }

    /// Past-the-end cursor.
    pub fn end(&self) -> Cursor<K, V> {
        Cursor::new(self, None)
    }

    /// Return an iterator over all entries in this instance, in sort order.
    pub fn iter(&self) -> Iter<K, V> {
        Iter::new(self)
    }

    /// Return an iterator over all keys, in sort order.
    pub fn keys(&self) -> Keys<K, V> {
        Keys::new(self.iter())
    }

    /// Return an iterator over all values, in key order.
    pub fn values(&self) -> Values<K, V> {
        Values::new(self.iter())
    }
}

impl<K, V> Avl<K, V>
where
    K: Ord,
{
    pub(crate) fn entry(&self, id: usize) -> (&K, &V) {
        let node = &self.nodes[id];
        (&node.key, &node.value)
    }

    fn find_id<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut id = self.root;
        while let Some(nid) = id {
            let node = &self.nodes[nid];
            id = match node.key.borrow().cmp(key) {
                Ordering::Less => node.right,
                Ordering::Greater => node.left,
                Ordering::Equal => return Some(nid),
            };
        }
        None
    }

    // After an insert, walk up from the new node's parent. A single
    // rebalance restores the pre-insert height of that subtree, stop there.
    fn rebalance_insert(&mut self, mut at: Option<usize>) {
        while let Some(id) = at {
            let old_height = self.nodes[id].height;
            let height = Node::update_height(&mut self.nodes, id);
            let bf = Node::balance_factor(&self.nodes, id);
            if bf.abs() > 1 {
                self.rebalance(id, bf);
                break;
            }
            if height == old_height {
                break;
            }
            at = self.nodes[id].parent;
        }
    }

    // After a delete, walk up from the removed node's parent. Each level
    // may need a rotation, stop once a subtree keeps its old height.
    fn rebalance_delete(&mut self, mut at: Option<usize>) {
        while let Some(id) = at {
            let old_height = self.nodes[id].height;
            Node::update_height(&mut self.nodes, id);
            let bf = Node::balance_factor(&self.nodes, id);
            let top = if bf.abs() > 1 {
                self.rebalance(id, bf)
            } else {
                id
            };
            if self.nodes[top].height == old_height {
                break;
            }
            at = self.nodes[top].parent;
        }
    }

    // Apply single or double rotation at `id`, return the subtree's new
    // top. A heavy child with zero balance takes the single rotation.
    fn rebalance(&mut self, id: usize, bf: isize) -> usize {
        let top = match bf {
            2 => {
                let right = self.nodes[id].right.unwrap();
                if Node::balance_factor(&self.nodes, right) < 0 {
                    trace!(index = %self.name, node = id, bf, "rotate right-left");
                    Node::rotate_right(&mut self.nodes, right);
                } else {
                    trace!(index = %self.name, node = id, bf, "rotate left");
                }
                Node::rotate_left(&mut self.nodes, id)
            }
            -2 => {
                let left = self.nodes[id].left.unwrap();
                if Node::balance_factor(&self.nodes, left) > 0 {
                    trace!(index = %self.name, node = id, bf, "rotate left-right");
                    Node::rotate_left(&mut self.nodes, left);
                } else {
                    trace!(index = %self.name, node = id, bf, "rotate right");
                }
                Node::rotate_right(&mut self.nodes, id)
            }
            bf => panic!("rebalance(): balance factor {} ? Call the programmer", bf),
        };
        if self.nodes[top].is_root() {
            self.root = Some(top);
        }
        top
    }

    fn do_validate(&self, stats: &mut Stats) -> Result<usize, AvlError<K>>
    where
        K: Clone,
    {
        let mut count = 0;
        let height = match self.root {
            None => 0,
            Some(root) => {
                if !self.nodes[root].is_root() {
                    let key = self.nodes[root].key.clone();
                    return Err(AvlError::ParentMismatch(key));
                }
                self.validate_tree(root, (None, None), 0, &mut count, stats)?
            }
        };
        if count != self.n_count || count != self.nodes.len() {
            return Err(AvlError::SizeMismatch(self.n_count, count));
        }
        Ok(height)
    }

    fn validate_tree(
        &self,
        id: usize,
        (low, high): (Option<&K>, Option<&K>),
        depth: usize,
        count: &mut usize,
        stats: &mut Stats,
    ) -> Result<usize, AvlError<K>>
    where
        K: Clone,
    {
        let node = &self.nodes[id];
        *count += 1;

        if let Some(low) = low {
            if node.key.le(low) {
                return Err(AvlError::SortError(node.key.clone(), low.clone()));
            }
        }
        if let Some(high) = high {
            if node.key.ge(high) {
                return Err(AvlError::SortError(node.key.clone(), high.clone()));
            }
        }

        if node.is_leaf() {
            stats.depths.as_mut().unwrap().sample(depth);
        }

        let mut heights = [0, 0];
        let children = [(node.left, (low, Some(&node.key))), (node.right, (Some(&node.key), high))];
        for (i, (child, bounds)) in children.iter().enumerate() {
            if let Some(child) = *child {
                if self.nodes[child].parent != Some(id) {
                    let key = self.nodes[child].key.clone();
                    return Err(AvlError::ParentMismatch(key));
                }
                heights[i] = self.validate_tree(child, *bounds, depth + 1, count, stats)?;
            }
        }

        let height = 1 + heights[0].max(heights[1]);
        if height != node.height {
            let key = node.key.clone();
            return Err(AvlError::HeightMismatch(key, node.height, height));
        }
        let bf = heights[1] as isize - heights[0] as isize;
        if bf.abs() > 1 {
            return Err(AvlError::UnbalancedNode(node.key.clone(), bf));
        }
        Ok(height)
    }
}

impl<K, V> Default for Avl<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Avl::new("")
    }
}

impl<K, V> fmt::Debug for Avl<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two instances are equal if they hold the same entries in the same
/// order, irrespective of their shape or name.
impl<K, V> PartialEq for Avl<K, V>
where
    K: Ord,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> Eq for Avl<K, V>
where
    K: Ord,
    V: Eq,
{
}

impl<K, V> PartialOrd for Avl<K, V>
where
    K: Ord,
    V: PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K, V> Ord for Avl<K, V>
where
    K: Ord,
    V: Ord,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K, Q, V> Index<&Q> for Avl<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// Panics if key is not present.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("index(): key not found in {:?}", self.name),
        }
    }
}

impl<K, V> std::iter::FromIterator<(K, V)> for Avl<K, V>
where
    K: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut avl = Avl::default();
        avl.extend(iter);
        avl
    }
}

impl<K, V> Extend<(K, V)> for Avl<K, V>
where
    K: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a Avl<K, V>
where
    K: Ord,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for Avl<K, V>
where
    K: Ord,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.root, self.nodes)
    }
}

/// Statistics on [`Avl`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`Avl::stats`] method.
/// * To get full statisics via [`Avl::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    height: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            height: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_height(&mut self, height: usize) {
        self.height = Some(height)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number entries in [`Avl`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `Avl<k,V>`. Although
    /// the node overhead is constant, the node size varies based on
    /// key and value types.
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return the height of the tree, computed by [`Avl::validate`].
    #[inline]
    pub fn height(&self) -> Option<usize> {
        self.height
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
