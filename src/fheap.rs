use std::{collections::HashMap, mem, sync::atomic::{AtomicU64, Ordering}};

use num_traits::PrimInt;
use tracing::{debug, trace};

use crate::{error::HeapError, node::{iter_siblings, merge_rings, unlink, Arena, Node}};

/// 1/ln(phi), so ln(n)*INV_LN_PHI is the log base phi of n, the largest degree any node
/// of an n node heap can reach
const INV_LN_PHI: f64 = 2.0780869212350273;

/// Stamps are unique across every heap in the process, so a handle from one heap
/// never resolves in another
static NEXT_STAMP: AtomicU64 = AtomicU64::new(0);

fn fresh_stamp() -> u64 {
	NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Identifies one node of one heap.
/// Handles stay valid until the node they name is extracted or deleted, after which every
/// operation taking the handle reports `HeapError::NotFound`, even if the slot is reused.
/// Another heap reports `NotFound` for it as well (see `Rebase` for merges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
	slot: usize,
	stamp: u64
}

/// Translates handles of a heap that was merged into another heap into handles of the result
#[derive(Debug, Default)]
pub struct Rebase {
	handles: HashMap<Handle, Handle>
}

impl Rebase {
	/// The handle in the merged heap for a handle issued by the absorbed heap,
	/// or None if the handle was already stale before the merge
	pub fn handle(&self, old: Handle) -> Option<Handle> {
		self.handles.get(&old).copied()
	}

	/// Number of nodes that moved
	pub fn len(&self) -> usize {
		self.handles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.handles.is_empty()
	}
}

#[cfg(test)]
#[derive(Debug, PartialEq, Eq)]
enum Violation {
	BrokenLink(usize),
	LessThanParent(usize),
	BrokenParentLink(usize),
	WrongDegree(usize),
	TooSmall(usize),
	MarkedRoot(usize),
	WrongMin,
	WrongCount
}

#[cfg(test)]
fn check_links<K>(nodes: &Arena<K>, x: usize) -> Result<(), Violation> {
	if nodes[nodes[x].right].left != x || nodes[nodes[x].left].right != x {
		Err(Violation::BrokenLink(x))
	} else { Ok(()) }
}

/// Verify the subtree rooted at `x` and return its size.
/// Besides heap order and link consistency this checks that a node of degree d
/// has at least F(d+2) descendants (counting itself), which is what bounds the degree.
#[cfg(test)]
fn check_tree<K: PrimInt>(nodes: &Arena<K>, x: usize) -> Result<usize, Violation> {
	use Violation::*;
	let mut degree = 0;
	let mut count = 1;
	let (mut fib_d1, mut fib_d2) = (1, 1);
	for child in iter_siblings(nodes, nodes[x].child) {
		degree += 1;
		(fib_d1, fib_d2) = (fib_d2, fib_d1 + fib_d2);
		check_links(nodes, child)?;
		if nodes[child].parent != Some(x) {
			return Err(BrokenParentLink(child))
		} else if nodes[child].key < nodes[x].key {
			return Err(LessThanParent(child))
		}
		count += check_tree(nodes, child)?;
	}
	if degree != nodes[x].degree {
		Err(WrongDegree(x))
	} else if count < fib_d2 {
		Err(TooSmall(x))
	} else { Ok(count) }
}

/// A fibonacci heap of integer keys.
/// - Insert: O(1)
/// - Find min: O(1)
/// - Extract min / delete: O(log(n)) amortized
/// - Decrease key: O(1) amortized
/// - Merge: O(m) for an absorbed heap of m nodes, which are moved into this heap's arena; the root rings are then spliced in O(1)
///
/// Nodes live in a slab owned by the heap and refer to each other by slab key,
/// so the cyclic sibling rings never involve ownership.
#[derive(Debug, Clone)]
pub struct FibHeap<K> {
	pub(crate) nodes: Arena<K>,
	pub(crate) min: Option<usize>,
	count: usize
}

impl<K> Default for FibHeap<K> {
	fn default() -> Self {
		Self{nodes: Arena::new(), min: None, count: 0}
	}
}

impl<K: PrimInt> FibHeap<K> {
	/// Create an empty heap
	pub fn new() -> Self {
		Self::default()
	}

	/// Get the number of keys in the heap
	pub fn len(&self) -> usize {
		self.count
	}

	pub fn is_empty(&self) -> bool {
		self.min.is_none()
	}

	fn resolve(&self, handle: Handle) -> Result<usize, HeapError> {
		match self.nodes.get(handle.slot) {
			Some(node) if node.stamp == handle.stamp => Ok(handle.slot),
			_ => {
				debug!(slot = handle.slot, "stale heap handle");
				Err(HeapError::NotFound)
			}
		}
	}

	fn handle_of(&self, x: usize) -> Handle {
		Handle{slot: x, stamp: self.nodes[x].stamp}
	}

	/// True if the handle still refers to a node in this heap
	pub fn contains(&self, handle: Handle) -> bool {
		self.nodes.get(handle.slot).is_some_and(|n|n.stamp == handle.stamp)
	}

	/// Current key of the node referred to by `handle`
	pub fn key(&self, handle: Handle) -> Result<K, HeapError> {
		self.resolve(handle).map(|x|self.nodes[x].key)
	}

	/// Insert a key as a new single node tree in the root ring.
	/// The returned handle can be used to decrease or delete this particular node later.
	pub fn insert(&mut self, key: K) -> Handle {
		let stamp = fresh_stamp();
		let slot = self.nodes.vacant_entry();
		let at = slot.key();
		slot.insert(Node::singleton(key, at, stamp));
		self.min = merge_rings(&mut self.nodes, self.min, Some(at));
		self.count += 1;
		self.debug_check();
		Handle{slot: at, stamp}
	}

	/// Get the minimal key without removing it
	pub fn peek_min(&self) -> Option<K> {
		self.min.map(|m|self.nodes[m].key)
	}

	/// Handle of the node currently holding the minimal key
	pub fn peek_min_handle(&self) -> Option<Handle> {
		self.min.map(|m|self.handle_of(m))
	}

	/// Get the minimal key without removing it, or `HeapError::EmptyHeap`
	pub fn find_min(&self) -> Result<K, HeapError> {
		self.peek_min().ok_or(HeapError::EmptyHeap)
	}

	/// Remove the minimal key from the heap and return it
	pub fn pop_min(&mut self) -> Option<K> {
		self.extract_min().ok()
	}

	/// Remove the minimal key from the heap and return it, or `HeapError::EmptyHeap`.
	/// The children of the removed node become roots, then trees of equal degree are
	/// linked together until every root has a distinct degree.
	pub fn extract_min(&mut self) -> Result<K, HeapError> {
		let min = self.min.ok_or(HeapError::EmptyHeap)?;
		let children = self.nodes[min].child.take();
		self.nodes[min].degree = 0;
		if let Some(first) = children {
			let mut x = first;
			loop {
				let node = &mut self.nodes[x];
				node.parent = None;
				node.mark = false;
				x = node.right;
				if x == first { break }
			}
		}
		merge_rings(&mut self.nodes, Some(min), children);
		self.min = unlink(&mut self.nodes, min);
		if self.min.is_some() {
			// the extracted node still counts here, so count >= 2 and the degree bound is defined
			self.consolidate(self.count);
		}
		self.count -= 1;
		let node = self.nodes.remove(min);
		self.debug_check();
		Ok(node.key)
	}

	/// Link roots of equal degree until all degrees are distinct, then rebuild the root ring
	/// out of the survivors and find the true minimum.
	/// `self.min` must be some root when this is called; it is only used to find the root ring.
	fn consolidate(&mut self, count: usize) {
		let max_degree = ((count as f64).ln()*INV_LN_PHI).floor() as usize;
		let mut table = vec![None; max_degree + 2];
		let mut roots: Vec<usize> = iter_siblings(&self.nodes, self.min).collect();
		let before = roots.len();
		// visiting roots in (degree, key) order makes the resulting forest deterministic
		roots.sort_by_key(|&x|(self.nodes[x].degree, self.nodes[x].key));
		for mut root in roots {
			unlink(&mut self.nodes, root);
			loop {
				let degree = self.nodes[root].degree;
				match table[degree].take() {
					None => {
						table[degree] = Some(root);
						break
					},
					Some(other) => root = self.link(root, other)
				}
			}
		}
		self.min = None;
		let mut after = 0;
		for root in table.into_iter().flatten() {
			self.min = merge_rings(&mut self.nodes, self.min, Some(root));
			after += 1;
		}
		trace!(before, after, "consolidated root ring");
	}

	/// Make the root with the larger key a child of the other (`a` wins ties) and return the new root.
	/// Both must be singleton roots of the same degree.
	fn link(&mut self, a: usize, b: usize) -> usize {
		let (parent, child) = if self.nodes[b].key < self.nodes[a].key { (b, a) } else { (a, b) };
		let node = &mut self.nodes[child];
		node.parent = Some(parent);
		node.mark = false;
		let first_child = self.nodes[parent].child;
		self.nodes[parent].child = merge_rings(&mut self.nodes, first_child, Some(child));
		self.nodes[parent].degree += 1;
		parent
	}

	/// Subtract `amount` from the key of the node referred to by `handle`.
	/// Fails with `HeapError::InvalidArgument` if `amount` is not positive or the subtraction overflows.
	pub fn decrease_key(&mut self, handle: Handle, amount: K) -> Result<(), HeapError> {
		let x = self.resolve(handle)?;
		if amount <= K::zero() {
			debug!(slot = x, "decrease_key with non positive amount");
			return Err(HeapError::InvalidArgument("amount must be positive"))
		}
		let Some(new_key) = self.nodes[x].key.checked_sub(&amount) else {
			debug!(slot = x, "decrease_key would overflow");
			return Err(HeapError::InvalidArgument("decreased key is out of range"))
		};
		self.lower_key(x, new_key);
		Ok(())
	}

	/// Set the key of the node referred to by `handle` to `new_key`, which must be strictly smaller
	/// than its current key
	pub fn decrease_key_to(&mut self, handle: Handle, new_key: K) -> Result<(), HeapError> {
		let x = self.resolve(handle)?;
		if new_key >= self.nodes[x].key {
			debug!(slot = x, "decrease_key_to with a key that is not smaller");
			return Err(HeapError::InvalidArgument("new key must be smaller than the current key"))
		}
		self.lower_key(x, new_key);
		Ok(())
	}

	fn lower_key(&mut self, x: usize, new_key: K) {
		self.nodes[x].key = new_key;
		let parent = self.nodes[x].parent;
		match parent {
			Some(parent) if new_key < self.nodes[parent].key => {
				self.cut(x, parent);
				self.cascading_cut(parent);
			},
			Some(_) => (),
			None => if self.min.is_some_and(|m|new_key < self.nodes[m].key) {
				self.min = Some(x)
			}
		}
		self.debug_check();
	}

	/// Move `x` out of its parent's child ring into the root ring
	fn cut(&mut self, x: usize, parent: usize) {
		let rest = unlink(&mut self.nodes, x);
		let parent_node = &mut self.nodes[parent];
		if parent_node.child == Some(x) {
			parent_node.child = rest;
		}
		parent_node.degree -= 1;
		let node = &mut self.nodes[x];
		node.parent = None;
		node.mark = false;
		self.min = merge_rings(&mut self.nodes, self.min, Some(x));
		trace!(slot = x, parent, "cut node into root ring");
	}

	/// Walk up from a node that just lost a child: the first loss only marks it,
	/// a second loss cuts it too and continues with its parent.  Roots are never marked.
	fn cascading_cut(&mut self, mut x: usize) {
		while let Some(parent) = self.nodes[x].parent {
			if !self.nodes[x].mark {
				self.nodes[x].mark = true;
				return
			}
			trace!(slot = x, "cascading cut of marked node");
			self.cut(x, parent);
			x = parent;
		}
	}

	/// Remove the node referred to by `handle` and return its key.
	/// The node is promoted to a root and treated as the minimum without touching its key,
	/// then extracted.
	pub fn delete(&mut self, handle: Handle) -> Result<K, HeapError> {
		let x = self.resolve(handle)?;
		if let Some(parent) = self.nodes[x].parent {
			self.cut(x, parent);
			self.cascading_cut(parent);
		}
		self.min = Some(x);
		self.extract_min()
	}

	/// Move all of `other`'s nodes into this heap, O(m) for m nodes in `other`.
	/// Every node is moved into this heap's slab and restamped, so `other`'s handles
	/// are translated through the returned `Rebase`; the root rings are then spliced in O(1).
	pub fn merge(&mut self, other: Self) -> Rebase {
		let mut rebase = Rebase{handles: HashMap::with_capacity(other.count)};
		let mut remap = HashMap::with_capacity(other.count);
		let mut moved = Vec::with_capacity(other.count);
		for (old, mut node) in other.nodes {
			let old_handle = Handle{slot: old, stamp: node.stamp};
			let stamp = fresh_stamp();
			node.stamp = stamp;
			let new = self.nodes.insert(node);
			remap.insert(old, new);
			rebase.handles.insert(old_handle, Handle{slot: new, stamp});
			moved.push(new);
		}
		for &x in &moved {
			let node = &mut self.nodes[x];
			node.left = remap[&node.left];
			node.right = remap[&node.right];
			node.parent = node.parent.map(|p|remap[&p]);
			node.child = node.child.map(|c|remap[&c]);
		}
		let other_min = other.min.map(|m|remap[&m]);
		self.min = merge_rings(&mut self.nodes, self.min, other_min);
		self.count += other.count;
		trace!(moved = moved.len(), total = self.count, "merged heaps");
		self.debug_check();
		rebase
	}

	/// Like `merge`, but leaves `other` behind as an empty heap
	pub fn absorb(&mut self, other: &mut Self) -> Rebase {
		self.merge(mem::take(other))
	}

	/// Find a node holding `key` by a depth first search over the forest, starting at the
	/// minimum and descending into each node's children before visiting its next sibling.
	/// This is O(n): prefer keeping the handle returned by `insert`.
	pub fn search(&self, key: K) -> Option<Handle> {
		let first = self.min?;
		// (entry of the ring being walked, next node of that ring to visit)
		let mut stack = vec![(first, first)];
		while let Some((start, x)) = stack.pop() {
			let node = &self.nodes[x];
			if node.key == key {
				return Some(self.handle_of(x))
			}
			if node.right != start {
				stack.push((start, node.right));
			}
			if let Some(child) = node.child {
				stack.push((child, child));
			}
		}
		None
	}

	/// Subtract `amount` from the first node found holding `key` (see `FibHeap::search`)
	pub fn decrease_key_of(&mut self, key: K, amount: K) -> Result<(), HeapError> {
		let handle = self.search(key).ok_or(HeapError::NotFound)?;
		self.decrease_key(handle, amount)
	}

	/// Delete the first node found holding `key` (see `FibHeap::search`)
	pub fn delete_key(&mut self, key: K) -> Result<K, HeapError> {
		let handle = self.search(key).ok_or(HeapError::NotFound)?;
		self.delete(handle)
	}

	/// Extract every key, in non decreasing order
	pub fn into_sorted_vec(mut self) -> Vec<K> {
		let mut res = Vec::with_capacity(self.len());
		while let Some(key) = self.pop_min() {
			res.push(key);
		}
		res
	}

	fn debug_check(&self) {
		#[cfg(all(test, not(feature = "stress_tests")))]{
			assert_eq!(self.check(), Ok(()));
		}
	}

	#[cfg(test)]
	fn check(&self) -> Result<(), Violation> {
		use Violation::*;
		if (self.count == 0) != self.min.is_none() || self.count != self.nodes.len() {
			return Err(WrongCount)
		}
		let Some(min) = self.min else { return Ok(()) };
		let mut count = 0;
		for root in iter_siblings(&self.nodes, Some(min)) {
			check_links(&self.nodes, root)?;
			let node = &self.nodes[root];
			if node.parent.is_some() {
				return Err(BrokenParentLink(root))
			} else if node.mark {
				return Err(MarkedRoot(root))
			} else if node.key < self.nodes[min].key {
				return Err(WrongMin)
			}
			count += check_tree(&self.nodes, root)?;
		}
		if count != self.count {
			Err(WrongCount)
		} else { Ok(()) }
	}
}

impl<K: PrimInt> Extend<K> for FibHeap<K> {
	fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
		for key in iter {
			self.insert(key);
		}
	}
}

impl<K: PrimInt> FromIterator<K> for FibHeap<K> {
	fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
		let mut res = Self::new();
		res.extend(iter);
		res
	}
}
