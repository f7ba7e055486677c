//! # Free-List Allocator
//!
//! A first-fit heap allocator that carves blocks out of a single,
//! caller-supplied byte buffer. The buffer is the whole universe: the
//! allocator never asks the operating system for memory and never gives any
//! back.
//!
//! ## How It Works
//!
//! The buffer is partitioned into **blocks** laid end to end with no gaps.
//! Every block carries a header before its payload and a footer after it
//! (boundary tags), and the free blocks are additionally threaded onto a
//! doubly-linked **free list** kept in ascending address order:
//!
//! ```text
//!   FreeListAllocator
//!   ┌────────────┐
//!   │ free_list ─┼────────────────┐
//!   └────────────┘                │
//!                                 ▼
//!   ┌───────────────┬─────────────────────┬──────────────┬──────────────┐
//!   │ Hdr│ data │Ftr │ Hdr│  free   │Ftr   │ Hdr│data│Ftr │ Hdr│free│Ftr │
//!   │    reserved   │     ▲    │          │   reserved   │      ▲       │
//!   └───────────────┴─────┼────┼──────────┴──────────────┴──────┼───────┘
//!                         │    └── next ───────────────────────►│
//!                         │◄─────────────────── prev ───────────┘
//! ```
//!
//! Address order makes every structural decision local:
//!
//! - **Placement** is a head-to-tail scan for the first block large enough
//!   (first-fit). A chosen block that is larger than needed is split, and the
//!   residual stays free.
//! - **Reclamation** inserts the freed block at its address-sorted position,
//!   then merges it with whichever physical neighbors are free. The
//!   neighbors are found through the boundary tags, not by searching: the
//!   record just below a header is the previous block's footer, and the
//!   record just past a footer is the next block's header.
//! - **Reallocation** prefers growing in place, absorbing the following
//!   block (no payload move) and then the preceding block (one overlapping
//!   move), before falling back to allocate-copy-free.
//!
//! ### Split
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────┐
//!   │ Header │              size bytes               │    Footer │  ==>
//!   └────────────────────────────────────────────────────────────┘
//!
//!   ┌────────────────────────────────────────────────────────────┐
//!   │ Header │ asked │ Footer │ Header │  remainder    │  Footer │
//!   └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Coalesce
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ Header1 │ data1 │ Footer1 │ Header2 │ data2 │ Footer2    │  ==>
//!   └──────────────────────────────────────────────────────────┘
//!
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ Header1 │           merged payload              │ Footer2 │
//!   └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sizing
//!
//! Requested payload sizes are rounded up to the machine word with the
//! [`align!`](crate::align) macro and the buffer length is truncated down to
//! a word multiple, so every header and footer in the buffer stays naturally
//! aligned. Callers that need stricter payload alignment must over-request
//! and align by hand.
//!
//! ## Trade-offs
//!
//! - **First-fit over a sorted list**: allocation is O(n) in the number of
//!   free blocks; freeing is O(n) for the sorted insert plus O(1) merges.
//! - **Eager coalescing**: no two adjacent blocks are ever both free, which
//!   bounds external fragmentation without a compaction pass.
//! - **No size classes, no bins**: one list serves every request size.
//!
//! ## Safety
//!
//! The allocator hands out raw pointers into a buffer it does not own, so
//! the usual C contract applies: pointers must not be used after they are
//! freed or reallocated, must not be freed twice, and must have come from
//! this allocator. The buffer must outlive the allocator and must not be
//! touched behind its back.

use std::{mem, ptr};

use crate::{
  align,
  block::{
    FOOTER_SIZE, Footer, HEADER_SIZE, Header, META_SIZE, footer_of, header_of_footer,
    header_of_payload, next_header, next_header_of_footer, payload_of, prev_footer, prev_header,
  },
};

/// Debug helper that dumps the block sequence and the free list.
///
/// Walks the buffer from its base, printing one line per block, then prints
/// the free list in list order. Intended for demos and troubleshooting.
///
/// # Safety
///
/// The allocator's structural invariants must hold (they do between any two
/// public operations).
///
/// # Example Output
///
/// ```text
/// heap at 0x55e3a2b412a0, 4096 bytes managed
///   block at 0x55e3a2b412a0: 104 bytes, reserved
///   block at 0x55e3a2b41338: 3944 bytes, free
///   free list: 0x55e3a2b41338 (3944 bytes)
/// ```
pub unsafe fn print_heap(allocator: &FreeListAllocator) {
  unsafe {
    println!(
      "heap at {:?}, {} bytes managed",
      allocator.memory, allocator.memory_size
    );

    if allocator.memory_size < META_SIZE + mem::size_of::<usize>() {
      println!("  (buffer too small to host a block)");
      return;
    }

    let end = allocator.memory as usize + allocator.memory_size;
    let mut header = allocator.memory.cast::<Header>();
    while (header as usize) < end {
      println!(
        "  block at {:?}: {} bytes, {}",
        header,
        (*header).size,
        if (*header).free { "free" } else { "reserved" },
      );
      header = next_header(header);
    }

    print!("  free list:");
    let mut node = allocator.free_list;
    if node.is_null() {
      print!(" (empty)");
    }
    while !node.is_null() {
      print!(" {:?} ({} bytes)", node, (*node).size);
      node = (*node).next;
    }
    println!();
  }
}

/// A first-fit, split-and-coalesce allocator over a fixed buffer.
///
/// The allocator borrows the buffer for its whole lifetime and partitions it
/// into boundary-tagged blocks; see the [module docs](self) for the layout.
/// All recoverable failures are reported as null pointers, mirroring the C
/// allocation interface this type emulates.
///
/// # Thread Safety
///
/// This allocator is **NOT** thread-safe. For multi-threaded usage,
/// external synchronization (e.g., a `Mutex`) is required.
///
/// # Example
///
/// ```rust
/// use fralloc::FreeListAllocator;
///
/// // Any word-aligned buffer works; here the storage is usize-backed.
/// let mut storage = vec![0usize; 512];
/// let size = storage.len() * size_of::<usize>();
///
/// unsafe {
///   let mut allocator = FreeListAllocator::new(storage.as_mut_ptr().cast(), size);
///
///   let ptr = allocator.allocate(size_of::<u64>()) as *mut u64;
///   assert!(!ptr.is_null());
///
///   ptr.write(42);
///   assert_eq!(42, ptr.read());
///
///   allocator.deallocate(ptr as *mut u8);
/// }
/// ```
pub struct FreeListAllocator {
  /// Base address of the managed buffer.
  memory: *mut u8,

  /// Managed byte count; truncated to a word multiple at construction.
  memory_size: usize,

  /// Head of the address-ordered free list; null when no block is free.
  free_list: *mut Header,
}

impl FreeListAllocator {
  /// Binds an allocator to the buffer `[memory, memory + size)`.
  ///
  /// The whole buffer becomes a single free block (minus the two metadata
  /// records), and the free list contains exactly that block. A buffer too
  /// small to host a header, a footer, and one word of payload yields a
  /// degenerate allocator whose free list is empty: every allocation
  /// request fails, harmlessly.
  ///
  /// # Safety
  ///
  /// - The range must be valid, writable, and exclusive to the allocator
  ///   for the allocator's entire lifetime.
  /// - `memory` must be word-aligned.
  pub unsafe fn new(
    memory: *mut u8,
    size: usize,
  ) -> Self {
    unsafe {
      debug_assert_eq!(0, memory as usize % mem::align_of::<Header>());

      // Keep every block boundary word-aligned by ignoring a trailing
      // sub-word sliver of the buffer.
      let word = mem::size_of::<usize>();
      let size = size & !(word - 1);

      if size < META_SIZE + word {
        return Self {
          memory,
          memory_size: size,
          free_list: ptr::null_mut(),
        };
      }

      // Initially, all of memory is one free block.
      let head = memory.cast::<Header>();
      (*head).size = size - META_SIZE;
      (*head).free = true;
      (*head).prev = ptr::null_mut();
      (*head).next = ptr::null_mut();

      let footer = footer_of(head);
      (*footer).size = (*head).size;
      (*footer).free = true;

      Self {
        memory,
        memory_size: size,
        free_list: head,
      }
    }
  }

  /// Reserves a block of at least `size` bytes and returns its payload.
  ///
  /// The free list is scanned head to tail and the first sufficiently
  /// large block wins; because the list is address-ordered this is
  /// lowest-address first-fit. A winner larger than needed is split so the
  /// residual stays allocatable.
  ///
  /// # Arguments
  ///
  /// * `size` - Requested payload byte count; rounded up to the machine
  ///   word before placement.
  ///
  /// # Returns
  ///
  /// A pointer to the payload, or null when `size` is zero, `size` is not
  /// below the buffer length, or no free block fits.
  ///
  /// # Safety
  ///
  /// The allocator's buffer must still be valid and no other code may be
  /// mutating the allocator concurrently.
  pub unsafe fn allocate(
    &mut self,
    size: usize,
  ) -> *mut u8 {
    unsafe {
      if size == 0 || size >= self.memory_size || self.free_list.is_null() {
        return ptr::null_mut();
      }
      let size = align!(size);

      let mut block = self.free_list;
      while !block.is_null() {
        if (*block).size >= size {
          // Carve off the surplus first (if any), then take the block.
          self.try_split_block(block, size);
          self.reserve(block);
          return payload_of(block);
        }
        block = (*block).next;
      }

      ptr::null_mut()
    }
  }

  /// Releases a payload previously returned by [`allocate`](Self::allocate)
  /// or [`reallocate`](Self::reallocate).
  ///
  /// The block is marked free, inserted at its address-sorted position in
  /// the free list, and eagerly merged with whichever physical neighbors
  /// are free; both may merge, collapsing three blocks into one. Freeing a
  /// null pointer is a no-op.
  ///
  /// # Safety
  ///
  /// `address` must have come from this allocator and must not have been
  /// freed or reallocated since; anything else is undefined behavior, as
  /// with C `free`.
  pub unsafe fn deallocate(
    &mut self,
    address: *mut u8,
  ) {
    unsafe {
      if address.is_null() {
        return;
      }

      let block = header_of_payload(address);
      let footer = footer_of(block);
      debug_assert!(!(*block).free);
      debug_assert!(!(*footer).free);
      debug_assert_eq!((*block).size, (*footer).size);

      (*block).free = true;
      (*footer).free = true;

      if self.free_list.is_null() {
        // The only free block; there is nothing to link or merge with.
        (*block).prev = ptr::null_mut();
        (*block).next = ptr::null_mut();
        self.free_list = block;
        return;
      } else if block < self.free_list {
        // Lower than every free block: becomes the new head.
        (*block).prev = ptr::null_mut();
        (*block).next = self.free_list;
        (*self.free_list).prev = block;
        self.free_list = block;
      } else {
        // Walk to the first free block past it and splice in before that.
        let mut prev = ptr::null_mut::<Header>();
        let mut next = self.free_list;
        while !next.is_null() && block > next {
          prev = next;
          next = (*next).next;
        }
        (*prev).next = block;
        (*block).prev = prev;
        (*block).next = next;
        if !next.is_null() {
          (*next).prev = block;
        }
      }

      // Merge with the preceding block, then with the following one. Both
      // checks consult only the boundary tags of the physical neighbors.
      let mut block = block;
      if !self.is_first_block(block) && (*prev_footer(block)).free {
        block = self.coalesce(prev_header(block), block);
      }
      if !self.is_last_block(footer) && (*next_header_of_footer(footer)).free {
        self.coalesce(block, next_header_of_footer(footer));
      }
    }
  }

  /// Resizes the allocation at `address` to at least `new_size` bytes.
  ///
  /// The cases, in order:
  ///
  /// 1. `address` is null: behaves like [`allocate`](Self::allocate).
  /// 2. `new_size` is zero: behaves like [`deallocate`](Self::deallocate)
  ///    and returns null.
  /// 3. Shrinking: splits the block in place; when the residual is too
  ///    small to host its own metadata the size simply stays as it was.
  ///    Returns `address`.
  /// 4. Growing: tries, in order, absorbing the following free block
  ///    (payload does not move), absorbing the preceding free block (the
  ///    payload moves down; the returned pointer changes), and finally
  ///    allocate-copy-free. Returns null if nothing works, leaving the
  ///    original allocation untouched.
  /// 5. Same size: returns `address` unchanged.
  ///
  /// On any non-null return, the first `min(old, new)` payload bytes are
  /// preserved.
  ///
  /// # Safety
  ///
  /// Same contract as [`deallocate`](Self::deallocate): `address` must be
  /// null or a live allocation of this allocator.
  pub unsafe fn reallocate(
    &mut self,
    address: *mut u8,
    new_size: usize,
  ) -> *mut u8 {
    unsafe {
      if address.is_null() {
        return self.allocate(new_size);
      }
      if new_size == 0 {
        self.deallocate(address);
        return ptr::null_mut();
      }

      let block = header_of_payload(address);
      debug_assert!(!(*block).free);
      let new_size = align!(new_size);

      let result = if new_size < (*block).size {
        // The reserved half stays put; the residual is released through
        // the ordinary free path. When the split is refused the block
        // keeps its current size, which is observable and deliberate.
        self.try_split_block(block, new_size);
        address
      } else if new_size > (*block).size {
        self.grow(block, new_size)
      } else {
        address
      };

      if !result.is_null() {
        let block = header_of_payload(result);
        debug_assert!((*block).size >= new_size);
        debug_assert_eq!((*block).size, (*footer_of(block)).size);
        debug_assert!(!(*block).free);
        debug_assert!(!(*footer_of(block)).free);
      }

      result
    }
  }

  /// Grows the reserved block at `block` to at least `new_size` bytes.
  ///
  /// Tries the following block first (no payload move), then the preceding
  /// block (overlapping move down), then relocation. A neighbor is shaved
  /// rather than absorbed whole only when what remains of it can still
  /// stand as a block, meaning metadata plus at least one word of payload;
  /// otherwise the whole neighbor is taken and the block ends up larger
  /// than asked, which the caller's size bookkeeping must tolerate.
  unsafe fn grow(
    &mut self,
    block: *mut Header,
    new_size: usize,
  ) -> *mut u8 {
    unsafe {
      let address = payload_of(block);
      let footer = footer_of(block);
      let word = mem::size_of::<usize>();

      if !self.is_last_block(footer) {
        let next = next_header_of_footer(footer);
        let available = (*block).size + META_SIZE + (*next).size;
        if (*next).free && available >= new_size {
          let next_footer = footer_of(next);
          debug_assert!((*next_footer).free);
          debug_assert_eq!((*next).size, (*next_footer).size);

          if available < new_size + META_SIZE + word {
            // Too little would remain of the neighbor; absorb it whole.
            // Its footer becomes ours.
            self.reserve(next);
            (*block).size = available;
            (*next_footer).size = available;
            debug_assert_eq!(footer_of(block), next_footer);
          } else {
            // Shave the neighbor from its leading edge. It keeps its
            // place in the free list under a relocated header, so all
            // three links referring to it must be repointed.
            let remainder = available - META_SIZE - new_size;
            let list_prev = (*next).prev;
            let list_next = (*next).next;

            (*next_footer).size = remainder;
            let moved = header_of_footer(next_footer);
            (*moved).size = remainder;
            (*moved).free = true;
            (*moved).prev = list_prev;
            (*moved).next = list_next;
            if list_prev.is_null() {
              self.free_list = moved;
            } else {
              (*list_prev).next = moved;
            }
            if !list_next.is_null() {
              (*list_next).prev = moved;
            }

            (*block).size = new_size;
            let new_footer = footer_of(block);
            (*new_footer).size = new_size;
            (*new_footer).free = false;
            debug_assert_eq!(moved, next_header(block));
          }

          return payload_of(block);
        }
      }

      if !self.is_first_block(block) && (*prev_footer(block)).free {
        let prev = prev_header(block);
        let available = (*prev).size + META_SIZE + (*block).size;
        if available >= new_size {
          debug_assert!((*prev).free);
          debug_assert_eq!((*prev).size, (*footer_of(prev)).size);
          let old_size = (*block).size;

          if available < new_size + META_SIZE + word {
            // Absorb the whole preceding block; its header becomes ours
            // and the payload slides down to sit just past it.
            self.reserve(prev);
            (*prev).size = available;
            (*footer).size = available;
            debug_assert_eq!(footer_of(prev), footer);

            ptr::copy(address, payload_of(prev), old_size);
            return payload_of(prev);
          } else {
            // The preceding block shrinks from its trailing edge and
            // keeps both its address and its place in the free list; a
            // fresh header for the reserved region goes just past its
            // new footer.
            let remainder = available - META_SIZE - new_size;
            (*prev).size = remainder;
            let prev_footer = footer_of(prev);
            (*prev_footer).size = remainder;
            (*prev_footer).free = true;

            let moved = next_header_of_footer(prev_footer);
            (*moved).size = new_size;
            (*moved).free = false;
            (*moved).prev = ptr::null_mut();
            (*moved).next = ptr::null_mut();
            (*footer).size = new_size;
            debug_assert_eq!(footer_of(moved), footer);

            ptr::copy(address, payload_of(moved), old_size);
            return payload_of(moved);
          }
        }
      }

      // Neither neighbor can help; move the allocation outright. On
      // failure the original block is left untouched.
      let new_address = self.allocate(new_size);
      if !new_address.is_null() {
        // Disjoint by construction: the old block is still reserved, so
        // the fresh one cannot overlap it.
        ptr::copy_nonoverlapping(address, new_address, (*block).size);
        self.deallocate(address);
      }
      new_address
    }
  }

  /// Splits `block` so its payload shrinks to exactly `size` bytes, turning
  /// the surplus into a new free block just past it.
  ///
  /// Refused (returning `false`) unless the surplus can host its own
  /// metadata plus at least one byte of payload: a zero-payload block
  /// could never satisfy a later request, so it is never created.
  ///
  /// A free source keeps both halves free, with the residual inheriting the
  /// source's list position. A reserved source keeps the leading half
  /// reserved and releases the residual through the ordinary free path,
  /// which may merge it forward (never backward; the leading half is
  /// reserved).
  unsafe fn try_split_block(
    &mut self,
    block: *mut Header,
    size: usize,
  ) -> bool {
    unsafe {
      debug_assert_eq!((*block).size, (*footer_of(block)).size);
      debug_assert_eq!((*block).free, (*footer_of(block)).free);

      // Checked before subtracting; usize underflow is as real as the
      // size_t kind.
      if size + META_SIZE >= (*block).size {
        return false;
      }
      let remainder = (*block).size - size - META_SIZE;

      let split_footer: *mut Footer = block.byte_add(HEADER_SIZE + size).cast();
      let remainder_header: *mut Header = block.byte_add(HEADER_SIZE + size + FOOTER_SIZE).cast();
      let remainder_footer = footer_of(block);

      (*remainder_header).size = remainder;
      (*remainder_footer).size = remainder;
      (*block).size = size;
      (*split_footer).size = size;
      (*split_footer).free = (*block).free;

      if (*block).free {
        (*remainder_header).free = true;
        (*remainder_footer).free = true;
        (*remainder_header).prev = block;
        (*remainder_header).next = (*block).next;
        (*block).next = remainder_header;
        if !(*remainder_header).next.is_null() {
          (*(*remainder_header).next).prev = remainder_header;
        }

        debug_assert_eq!((*block).next, next_header(block));
      } else {
        // The residual of a reserved block enters the free list through
        // the front door.
        (*remainder_header).free = false;
        (*remainder_footer).free = false;
        (*remainder_header).prev = ptr::null_mut();
        (*remainder_header).next = ptr::null_mut();
        self.deallocate(payload_of(remainder_header));
      }

      debug_assert_eq!((*block).size, (*footer_of(block)).size);
      debug_assert_eq!((*block).free, (*footer_of(block)).free);

      true
    }
  }

  /// Merges two physically adjacent free blocks, `second` immediately
  /// following `first`, into one; returns the merged block.
  ///
  /// `second`'s records are logically gone afterwards: its former footer is
  /// rewritten as the merged block's footer and the rest of its bytes
  /// become payload.
  unsafe fn coalesce(
    &mut self,
    first: *mut Header,
    second: *mut Header,
  ) -> *mut Header {
    unsafe {
      let second_footer = footer_of(second);
      debug_assert!((*first).free && (*footer_of(first)).free);
      debug_assert!((*second).free && (*second_footer).free);
      debug_assert_eq!((*first).next, second);
      debug_assert_eq!((*second).prev, first);
      debug_assert_eq!(next_header(first), second);

      (*first).size += META_SIZE + (*second).size;
      (*second_footer).size = (*first).size;
      (*first).next = (*second).next;
      if !(*first).next.is_null() {
        (*(*first).next).prev = first;
      }

      debug_assert_eq!(second_footer, footer_of(first));

      first
    }
  }

  /// Unlinks a free block from the free list and marks its tags reserved.
  unsafe fn reserve(
    &mut self,
    block: *mut Header,
  ) {
    unsafe {
      debug_assert!((*block).free);
      debug_assert!((*footer_of(block)).free);
      debug_assert_eq!((*block).size, (*footer_of(block)).size);

      if (*block).prev.is_null() {
        // Reserving the head of the list; promote its successor.
        self.free_list = (*block).next;
      } else {
        (*(*block).prev).next = (*block).next;
      }
      if !(*block).next.is_null() {
        (*(*block).next).prev = (*block).prev;
      }

      (*block).free = false;
      (*footer_of(block)).free = false;
      (*block).prev = ptr::null_mut();
      (*block).next = ptr::null_mut();
    }
  }

  /// Whether `header` is the block at the very base of the buffer.
  fn is_first_block(
    &self,
    header: *mut Header,
  ) -> bool {
    header.cast::<u8>() == self.memory
  }

  /// Whether `footer` closes the block at the very end of the buffer.
  fn is_last_block(
    &self,
    footer: *mut Footer,
  ) -> bool {
    footer as usize + FOOTER_SIZE >= self.memory as usize + self.memory_size
  }
}
