use slab::Slab;

/// Storage for every node of one heap.  Links between nodes are slab keys,
/// so ownership is just membership in the slab and dropping the slab frees everything once.
pub(crate) type Arena<K> = Slab<Node<K>>;

#[derive(Debug, Clone)]
pub(crate) struct Node<K> {
	pub(crate) key: K,
	pub(crate) degree: usize,
	pub(crate) mark: bool,
	pub(crate) parent: Option<usize>,
	pub(crate) child: Option<usize>,
	pub(crate) left: usize,
	pub(crate) right: usize,
	pub(crate) stamp: u64
}

impl<K> Node<K> {
	/// A fresh root that will live at slot `at`, linked into a ring containing only itself
	pub(crate) fn singleton(key: K, at: usize, stamp: u64) -> Self {
		Self{key, degree: 0, mark: false, parent: None, child: None, left: at, right: at, stamp}
	}
}

/// Walks a sibling ring exactly once, starting from the given entry
pub(crate) struct SiblingIter<'a, K> {
	nodes: &'a Arena<K>,
	start: Option<usize>,
	iter: usize
}

impl<'a, K> Iterator for SiblingIter<'a, K> {
	type Item = usize;
	fn next(&mut self) -> Option<Self::Item> {
		let start = self.start?;
		let res = self.iter;
		self.iter = self.nodes[res].right;
		if self.iter == start { self.start = None }
		Some(res)
	}
}

pub(crate) fn iter_siblings<K>(nodes: &Arena<K>, entry: Option<usize>) -> SiblingIter<'_, K> {
	SiblingIter{nodes, start: entry, iter: entry.unwrap_or_default()}
}

/// Splice two disjoint rings into one and return whichever entry has the smaller key
/// (`a` on ties).  If either ring is empty the other is returned as is.
pub(crate) fn merge_rings<K: Ord>(nodes: &mut Arena<K>, a: Option<usize>, b: Option<usize>) -> Option<usize> {
	let (Some(mut a), Some(mut b)) = (a, b) else { return a.or(b) };
	if nodes[a].key > nodes[b].key {
		(a, b) = (b, a);
	}
	let a_right = nodes[a].right;
	let b_left = nodes[b].left;
	nodes[a].right = b;
	nodes[b].left = a;
	nodes[a_right].left = b_left;
	nodes[b_left].right = a_right;
	Some(a)
}

/// Take `x` out of its ring, leaving it as a singleton.
/// Returns one of the remaining members, or None if `x` was alone.
pub(crate) fn unlink<K>(nodes: &mut Arena<K>, x: usize) -> Option<usize> {
	let (left, right) = (nodes[x].left, nodes[x].right);
	if right == x {
		return None
	}
	nodes[left].right = right;
	nodes[right].left = left;
	nodes[x].left = x;
	nodes[x].right = x;
	Some(right)
}
