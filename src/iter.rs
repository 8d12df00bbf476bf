use std::{fmt, iter::FusedIterator};

use slab::Slab;

use crate::avl::Avl;
use crate::node::Node;

/// Cursor over entries of an [`Avl`] instance, in sort order.
///
/// A cursor either points at an entry or at the past-the-end position,
/// which sits between the last and the first entry: moving next from
/// end lands on the first entry, moving prev from end lands on the last.
/// Steps follow parent links, amortized O(1) per step.
pub struct Cursor<'a, K, V> {
    avl: &'a Avl<K, V>,
    at: Option<usize>,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(avl: &'a Avl<K, V>, at: Option<usize>) -> Cursor<'a, K, V> {
        Cursor { avl, at }
    }

    /// Whether this cursor is past-the-end.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.at.is_none()
    }

    /// Step to the next larger key.
    pub fn move_next(&mut self) {
        self.at = match self.at {
            Some(id) => Node::successor(self.avl.nodes(), id),
            None => self.avl.first_id(),
        };
    }

    /// Step to the next smaller key.
    pub fn move_prev(&mut self) {
        self.at = match self.at {
            Some(id) => Node::predecessor(self.avl.nodes(), id),
            None => self.avl.last_id(),
        };
    }

    /// Entry under the cursor, `None` if past-the-end.
    pub fn get(&self) -> Option<(&'a K, &'a V)> {
        let nodes: &'a Slab<Node<K, V>> = self.avl.nodes();
        self.at.map(|id| {
            let node = &nodes[id];
            (&node.key, &node.value)
        })
    }

    /// Key under the cursor, panics if past-the-end.
    pub fn key(&self) -> &'a K {
        match self.get() {
            Some((key, _)) => key,
            None => panic!("key(): dereferencing end cursor"),
        }
    }

    /// Value under the cursor, panics if past-the-end.
    pub fn value(&self) -> &'a V {
        match self.get() {
            Some((_, value)) => value,
            None => panic!("value(): dereferencing end cursor"),
        }
    }
}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        Cursor {
            avl: self.avl,
            at: self.at,
        }
    }
}

impl<'a, K, V> Copy for Cursor<'a, K, V> {}

/// Cursors are equal when they refer to the same position of the same
/// instance.
impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.avl, other.avl) && self.at == other.at
    }
}

impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K, V> fmt::Debug for Cursor<'a, K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(entry) => f.debug_tuple("Cursor").field(&entry).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

/// Iterator over entries of an [`Avl`] instance, in sort order, from
/// both ends.
pub struct Iter<'a, K, V> {
    front: Cursor<'a, K, V>,
    back: Cursor<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(avl: &'a Avl<K, V>) -> Iter<'a, K, V> {
        Iter {
            front: Cursor::new(avl, avl.first_id()),
            back: Cursor::new(avl, avl.last_id()),
            remaining: avl.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.front.get()?;
        self.front.move_next();
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.back.get()?;
        self.back.move_prev();
        self.remaining -= 1;
        Some(item)
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// Iterator over keys of an [`Avl`] instance, in sort order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Keys<'a, K, V> {
        Keys { inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

/// Iterator over values of an [`Avl`] instance, in key order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Values<'a, K, V> {
        Values { inner }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

/// Owning iterator over entries of an [`Avl`] instance, in sort order.
pub struct IntoIter<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(root: Option<usize>, mut nodes: Slab<Node<K, V>>) -> IntoIter<K, V> {
        let mut ids = Vec::with_capacity(nodes.len());
        let mut at = root.map(|root| Node::leftmost(&nodes, root));
        while let Some(id) = at {
            ids.push(id);
            at = Node::successor(&nodes, id);
        }
        let entries: Vec<(K, V)> = ids
            .into_iter()
            .map(|id| {
                let node = nodes.remove(id);
                (node.key, node.value)
            })
            .collect();
        IntoIter {
            entries: entries.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<(K, V)> {
        self.entries.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<(K, V)> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
