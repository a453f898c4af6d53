use std::{collections::VecDeque, fmt};

use num_traits::PrimInt;

use crate::{fheap::FibHeap, node::iter_siblings};

/// Controls how `FibHeap::dump` renders the forest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
	/// Wrap every child ring as `->[ ... ] ` so the grouping of keys into rings is visible.
	/// When false the keys of each tree are printed as one flat breadth first list.
	pub bracketed: bool
}

impl DumpOptions {
	/// Show each child ring as a bracketed group
	pub const BRACKETED: Self = Self{bracketed: true};
	/// Only the keys, in breadth first order per tree
	pub const PLAIN: Self = Self{bracketed: false};
}

impl Default for DumpOptions {
	fn default() -> Self {
		Self::PLAIN
	}
}

/// Human readable rendering of a heap, for debugging.
/// One line per root tree (roots ordered by degree, then key): the root key followed by
/// the keys of each child ring in breadth first order.  The whole dump ends with an empty line.
/// Every key in the heap appears exactly once; nothing else about the format is stable.
pub struct Dump<'a, K> {
	heap: &'a FibHeap<K>,
	options: DumpOptions
}

impl<K: PrimInt + fmt::Display> fmt::Display for Dump<'_, K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let nodes = &self.heap.nodes;
		let mut roots: Vec<usize> = iter_siblings(nodes, self.heap.min).collect();
		roots.sort_by_key(|&x|(nodes[x].degree, nodes[x].key));
		let mut rings = VecDeque::new();
		for root in roots {
			write!(f, "{} ", nodes[root].key)?;
			rings.extend(nodes[root].child);
			while let Some(entry) = rings.pop_front() {
				if self.options.bracketed { f.write_str("->[")? }
				for x in iter_siblings(nodes, Some(entry)) {
					write!(f, "{} ", nodes[x].key)?;
					rings.extend(nodes[x].child);
				}
				if self.options.bracketed { f.write_str("] ")? }
			}
			writeln!(f)?;
		}
		writeln!(f)
	}
}

impl<K: PrimInt + fmt::Display> FibHeap<K> {
	/// Lazily formatted dump of the forest, see `Dump`
	pub fn display(&self, options: DumpOptions) -> Dump<'_, K> {
		Dump{heap: self, options}
	}

	pub fn dump(&self, options: DumpOptions) -> String {
		self.display(options).to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::DumpOptions;
	use crate::fheap::FibHeap;

	#[test]
	fn empty_heap() {
		let heap = FibHeap::<i32>::new();
		assert_eq!(heap.dump(DumpOptions::default()), "\n");
	}

	#[test]
	fn plain_by_default() {
		let mut heap: FibHeap<i32> = (1..=4).collect();
		heap.extract_min().unwrap();
		assert_eq!(DumpOptions::default(), DumpOptions::PLAIN);
		assert_eq!(heap.dump(DumpOptions::default()), "4 \n2 3 \n\n");
	}

	#[test]
	fn unconsolidated_roots() {
		let heap: FibHeap<i32> = [3, 1, 2].into_iter().collect();
		assert_eq!(heap.dump(DumpOptions::BRACKETED), "1 \n2 \n3 \n\n");
	}

	#[test]
	fn consolidated_trees() {
		let mut heap: FibHeap<i32> = (1..=4).collect();
		heap.extract_min().unwrap();
		assert_eq!(heap.dump(DumpOptions::BRACKETED), "4 \n2 ->[3 ] \n\n");
		assert_eq!(heap.dump(DumpOptions::PLAIN), "4 \n2 3 \n\n");
		heap.insert(5);
		heap.insert(1);
		heap.extract_min().unwrap();
		assert_eq!(heap.dump(DumpOptions::BRACKETED), "2 ->[3 4 ] ->[5 ] \n\n");
		assert_eq!(heap.display(DumpOptions::PLAIN).to_string(), "2 3 4 5 \n\n");
	}

	#[test]
	fn every_key_once() {
		let mut heap: FibHeap<i64> = (0..100).map(|k|(k*37)%101).collect();
		heap.extract_min().unwrap();
		let h = heap.search(50).unwrap();
		heap.decrease_key(h, 1000).unwrap();
		let dump = heap.dump(DumpOptions::PLAIN);
		let mut keys: Vec<i64> = dump.split_whitespace().map(|k|k.parse().unwrap()).collect();
		keys.sort();
		assert_eq!(keys, heap.into_sorted_vec());
	}
}
