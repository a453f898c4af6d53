//! A fibonacci heap of integer keys, stored in an arena and addressed by handles.
//!
//! ```
//! use fibheap::{FibHeap, DumpOptions};
//!
//! let mut heap = FibHeap::new();
//! heap.insert(10);
//! heap.insert(20);
//! let h = heap.insert(30);
//! heap.decrease_key(h, 25).unwrap();
//! assert_eq!(heap.find_min(), Ok(5));
//! assert_eq!(heap.dump(DumpOptions::PLAIN), "5 \n10 \n20 \n\n");
//! assert_eq!(heap.into_sorted_vec(), [5, 10, 20]);
//! ```

pub mod dump;
pub mod error;
pub mod fheap;
mod node;

pub use dump::{Dump, DumpOptions};
pub use error::HeapError;
pub use fheap::{FibHeap, Handle, Rebase};
