//! # fralloc - A Fixed-Buffer Free-List Allocator
//!
//! This crate provides a **first-fit free-list allocator** that emulates the
//! classic `malloc`/`free`/`realloc` interface inside a single byte buffer
//! supplied by the caller. The buffer is the entire heap: nothing is ever
//! requested from, or returned to, the operating system.
//!
//! ## Overview
//!
//! ```text
//!   The caller's buffer, partitioned into boundary-tagged blocks:
//!
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │                        CALLER'S BUFFER                             │
//!   │                                                                    │
//!   │   ┌───┬────────┬───┬───┬──────────┬───┬───┬─────────────────┬───┐  │
//!   │   │ H │  data  │ F │ H │   free   │ F │ H │      data       │ F │  │
//!   │   └───┴────────┴───┴───┴──────────┴───┴───┴─────────────────┴───┘  │
//!   │         ▲                   ▲                                      │
//!   │         │                   │                                      │
//!   │     reserved           on the free list                            │
//!   │                                                                    │
//!   └────────────────────────────────────────────────────────────────────┘
//!
//!   H = header (size, free flag, free-list links)
//!   F = footer (size, free flag: a mirror of the header)
//! ```
//!
//! Free blocks are threaded onto a doubly-linked list sorted by address;
//! the header/footer pairs make both physical neighbors of any block
//! reachable in O(1), so freed blocks merge with free neighbors eagerly
//! and reallocation can grow in place in either direction.
//!
//! ## Crate Structure
//!
//! ```text
//!   fralloc
//!   ├── align      - Alignment macro (align!)
//!   ├── block      - Header/footer records and block navigation (internal)
//!   └── freelist   - FreeListAllocator implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fralloc::FreeListAllocator;
//!
//! // Word-aligned backing storage; a heap allocation, a static, or a
//! // memory-mapped region all work equally well.
//! let mut storage = vec![0usize; 1024];
//! let size = storage.len() * size_of::<usize>();
//!
//! unsafe {
//!   let mut allocator = FreeListAllocator::new(storage.as_mut_ptr().cast(), size);
//!
//!   let ptr = allocator.allocate(256);
//!   assert!(!ptr.is_null());
//!
//!   let bigger = allocator.reallocate(ptr, 512);
//!   assert!(!bigger.is_null());
//!
//!   allocator.deallocate(bigger);
//! }
//! ```
//!
//! ## Features
//!
//! - **Fixed-region operation**: ideal for embedded targets, arenas carved
//!   out of a larger heap, and teaching demos
//! - **First-fit placement** over an address-ordered free list
//! - **Eager two-sided coalescing**: adjacent free blocks never coexist
//! - **In-place reallocation**: grows into a free neighbor on either side
//!   before falling back to allocate-copy-free
//!
//! ## Limitations
//!
//! - **Single-threaded only**: wrap the allocator in a lock to share it
//! - **No payload-alignment guarantees** beyond the machine word: callers
//!   needing stricter alignment must over-request and align by hand
//! - **No misuse detection**: double frees and foreign pointers are
//!   undefined behavior, exactly as with C `free`
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! All allocation and deallocation operations require `unsafe` blocks, and
//! the caller owns the backing buffer's lifetime.

pub mod align;
mod block;
mod freelist;

pub use freelist::{FreeListAllocator, print_heap};
