use std::cmp;

use slab::Slab;

/// Node corresponds to a single entry in [`Avl`](crate::Avl) instance.
///
/// Nodes are allocated inside the tree's slab and refer to each other by
/// slab index. `left` and `right` are owned by this node, `parent` is a
/// back-reference that is `None` only for the root.
#[derive(Clone)]
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) height: usize,         // height of subtree rooted here, leaf is 1
    pub(crate) parent: Option<usize>, // back-link, not owned
    pub(crate) left: Option<usize>,   // store: left child
    pub(crate) right: Option<usize>,  // store: right child
}

// Primary operations on a single node.
impl<K, V> Node<K, V> {
    // CREATE operation
    pub(crate) fn new(key: K, value: V, parent: Option<usize>) -> Node<K, V> {
        Node {
            key,
            value,
            height: 1,
            parent,
            left: None,
            right: None,
        }
    }

    /// Return the key of this entry.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Return the value of this entry.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Return the height of the subtree rooted at this node.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    // prepend operation, equivalent to SET / UPDATE
    #[inline]
    pub(crate) fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    #[inline]
    pub fn has_any_children(&self) -> bool {
        self.left.is_some() || self.right.is_some()
    }

    #[inline]
    pub fn has_both_children(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

// Operations that need to look at neighbouring nodes go through the slab.
impl<K, V> Node<K, V> {
    /// Node `id` is the left child of its parent.
    pub(crate) fn is_left_child(nodes: &Slab<Node<K, V>>, id: usize) -> bool {
        match nodes[id].parent {
            Some(parent) => nodes[parent].left == Some(id),
            None => false,
        }
    }

    /// Node `id` is the right child of its parent.
    pub(crate) fn is_right_child(nodes: &Slab<Node<K, V>>, id: usize) -> bool {
        match nodes[id].parent {
            Some(parent) => nodes[parent].right == Some(id),
            None => false,
        }
    }

    #[inline]
    pub(crate) fn height_of(nodes: &Slab<Node<K, V>>, id: Option<usize>) -> usize {
        id.map_or(0, |id| nodes[id].height)
    }

    /// height(right) - height(left), as recorded in the children.
    pub(crate) fn balance_factor(nodes: &Slab<Node<K, V>>, id: usize) -> isize {
        let node = &nodes[id];
        let lh = Node::height_of(nodes, node.left) as isize;
        let rh = Node::height_of(nodes, node.right) as isize;
        rh - lh
    }

    /// Recompute height of `id` from its children, return the new height.
    pub(crate) fn update_height(nodes: &mut Slab<Node<K, V>>, id: usize) -> usize {
        let (left, right) = (nodes[id].left, nodes[id].right);
        let height = 1 + cmp::max(Node::height_of(nodes, left), Node::height_of(nodes, right));
        nodes[id].height = height;
        height
    }

    // replace `old` with `new` in the child slot of `parent`, if any.
    pub(crate) fn replace_child(
        nodes: &mut Slab<Node<K, V>>,
        parent: Option<usize>,
        old: usize,
        new: Option<usize>,
    ) {
        if let Some(parent) = parent {
            let pnode = &mut nodes[parent];
            if pnode.left == Some(old) {
                pnode.left = new;
            } else if pnode.right == Some(old) {
                pnode.right = new;
            } else {
                panic!("replace_child(): {} is not a child of {}", old, parent);
            }
        }
    }

    //              (p)                       (p)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //          left       x             node      xr
    //                    / \            /  \
    //                  xl   xr       left   xl
    //
    /// Promote the right child of `id` into its place and return the index
    /// of the promoted node. Caller shall update the tree root if `id`
    /// was the root.
    pub(crate) fn rotate_left(nodes: &mut Slab<Node<K, V>>, id: usize) -> usize {
        let x = match nodes[id].right {
            Some(x) => x,
            None => panic!("rotate_left(): node {} has no right child", id),
        };

        let xl = nodes[x].left;
        nodes[id].right = xl;
        if let Some(xl) = xl {
            nodes[xl].parent = Some(id);
        }

        let parent = nodes[id].parent;
        nodes[x].parent = parent;
        Node::replace_child(nodes, parent, id, Some(x));

        nodes[x].left = Some(id);
        nodes[id].parent = Some(x);

        Node::update_height(nodes, id);
        Node::update_height(nodes, x);
        x
    }

    //              (p)                       (p)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //           x      right             xl      node
    //          / \                                / \
    //        xl   xr                             xr  right
    //
    /// Mirror of [`Node::rotate_left`], promote the left child of `id`.
    pub(crate) fn rotate_right(nodes: &mut Slab<Node<K, V>>, id: usize) -> usize {
        let x = match nodes[id].left {
            Some(x) => x,
            None => panic!("rotate_right(): node {} has no left child", id),
        };

        let xr = nodes[x].right;
        nodes[id].left = xr;
        if let Some(xr) = xr {
            nodes[xr].parent = Some(id);
        }

        let parent = nodes[id].parent;
        nodes[x].parent = parent;
        Node::replace_child(nodes, parent, id, Some(x));

        nodes[x].right = Some(id);
        nodes[id].parent = Some(x);

        Node::update_height(nodes, id);
        Node::update_height(nodes, x);
        x
    }

    /// Leftmost descendant of `id`, which is the smallest key under it.
    pub(crate) fn leftmost(nodes: &Slab<Node<K, V>>, mut id: usize) -> usize {
        while let Some(left) = nodes[id].left {
            id = left;
        }
        id
    }

    /// Rightmost descendant of `id`, which is the largest key under it.
    pub(crate) fn rightmost(nodes: &Slab<Node<K, V>>, mut id: usize) -> usize {
        while let Some(right) = nodes[id].right {
            id = right;
        }
        id
    }

    /// In-order successor of `id`, if any.
    pub(crate) fn successor(nodes: &Slab<Node<K, V>>, id: usize) -> Option<usize> {
        if let Some(right) = nodes[id].right {
            return Some(Node::leftmost(nodes, right));
        }
        let mut id = id;
        while Node::is_right_child(nodes, id) {
            id = nodes[id].parent?;
        }
        nodes[id].parent
    }

    /// In-order predecessor of `id`, if any.
    pub(crate) fn predecessor(nodes: &Slab<Node<K, V>>, id: usize) -> Option<usize> {
        if let Some(left) = nodes[id].left {
            return Some(Node::rightmost(nodes, left));
        }
        let mut id = id;
        while Node::is_left_child(nodes, id) {
            id = nodes[id].parent?;
        }
        nodes[id].parent
    }
}
