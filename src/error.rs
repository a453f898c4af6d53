use thiserror::Error;

/// Reasons a heap operation can fail.
/// A failed operation never modifies the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
	/// find_min / extract_min on a heap with no elements
	#[error("heap is empty")]
	EmptyHeap,
	/// The handle refers to a node that was already removed, or no node holds the requested key
	#[error("no such node in the heap")]
	NotFound,
	/// The requested change would not strictly decrease the key
	#[error("invalid argument: {0}")]
	InvalidArgument(&'static str)
}
