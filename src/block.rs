//! Boundary-tag records and the address arithmetic that navigates them.
//!
//! Every block in the managed buffer is a header, a payload, and a footer,
//! laid end to end:
//!
//! ```text
//!   ┌──────────┬──────────────────────────────┬──────────┐
//!   │  Header  │   payload (size bytes)       │  Footer  │
//!   └──────────┴──────────────────────────────┴──────────┘
//!   ▲          ▲                              ▲
//!   │          │                              │
//!   │          └── pointer handed to callers  └── mirrors the header
//!   └── carries size, free flag, free-list links
//! ```
//!
//! The footer lets a block's physical neighbors be reached in O(1) in both
//! directions: the record immediately below a header is the previous block's
//! footer, and the record immediately past a footer is the next block's
//! header. That back-to-back mirroring is what makes coalescing constant
//! time, so the footer must never be "optimized away".
//!
//! The functions here are pure address arithmetic over that layout. All of
//! them require that their argument points at a live, correctly initialized
//! record inside the managed buffer; the previous/next navigators must
//! additionally only be called when such a neighbor exists (the allocator
//! checks the buffer bounds first).

use std::mem;

/// Metadata record preceding every block's payload.
#[repr(C)]
pub struct Header {
  /// Payload byte count of the block; excludes both metadata records.
  pub size: usize,
  /// Whether the block is currently available for reservation.
  pub free: bool,
  /// Free-list back link. Meaningful only while `free` is set.
  pub prev: *mut Header,
  /// Free-list forward link. Meaningful only while `free` is set.
  pub next: *mut Header,
}

/// Metadata record following every block's payload, mirroring its header.
#[repr(C)]
pub struct Footer {
  /// Payload byte count of the preceding block.
  pub size: usize,
  /// Whether the preceding block is currently available for reservation.
  pub free: bool,
}

pub const HEADER_SIZE: usize = mem::size_of::<Header>();
pub const FOOTER_SIZE: usize = mem::size_of::<Footer>();

/// Per-block metadata overhead: one header plus one footer.
pub const META_SIZE: usize = HEADER_SIZE + FOOTER_SIZE;

/// Footer of the block that starts at `header`.
pub unsafe fn footer_of(header: *mut Header) -> *mut Footer {
  unsafe { header.byte_add(HEADER_SIZE + (*header).size).cast() }
}

/// Header of the block whose payload starts at `payload`.
pub unsafe fn header_of_payload(payload: *mut u8) -> *mut Header {
  unsafe { payload.sub(HEADER_SIZE).cast() }
}

/// Header of the block that ends at `footer`.
pub unsafe fn header_of_footer(footer: *mut Footer) -> *mut Header {
  unsafe { footer.byte_sub((*footer).size + HEADER_SIZE).cast() }
}

/// Payload of the block that starts at `header`.
pub unsafe fn payload_of(header: *mut Header) -> *mut u8 {
  unsafe { header.byte_add(HEADER_SIZE).cast() }
}

/// Footer of the block physically preceding the block at `header`.
pub unsafe fn prev_footer(header: *mut Header) -> *mut Footer {
  unsafe { header.byte_sub(FOOTER_SIZE).cast() }
}

/// Header of the block physically preceding the block at `header`.
pub unsafe fn prev_header(header: *mut Header) -> *mut Header {
  unsafe { header_of_footer(prev_footer(header)) }
}

/// Header of the block physically following the block at `header`.
pub unsafe fn next_header(header: *mut Header) -> *mut Header {
  unsafe { next_header_of_footer(footer_of(header)) }
}

/// Header of the block physically following `footer`.
pub unsafe fn next_header_of_footer(footer: *mut Footer) -> *mut Header {
  unsafe { footer.byte_add(FOOTER_SIZE).cast() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::ptr;

  /// Lays out two adjacent blocks by hand and returns their header addresses.
  ///
  /// The buffer is backed by `usize` storage so every record is naturally
  /// aligned.
  unsafe fn write_two_blocks(
    buffer: *mut u8,
    first_size: usize,
    second_size: usize,
  ) -> (*mut Header, *mut Header) {
    unsafe {
      let first = buffer.cast::<Header>();
      (*first).size = first_size;
      (*first).free = false;
      (*first).prev = ptr::null_mut();
      (*first).next = ptr::null_mut();

      let first_footer = footer_of(first);
      (*first_footer).size = first_size;
      (*first_footer).free = false;

      let second = next_header_of_footer(first_footer);
      (*second).size = second_size;
      (*second).free = true;
      (*second).prev = ptr::null_mut();
      (*second).next = ptr::null_mut();

      let second_footer = footer_of(second);
      (*second_footer).size = second_size;
      (*second_footer).free = true;

      (first, second)
    }
  }

  #[test]
  fn navigation_agrees_with_the_layout_formulas() {
    let mut storage = vec![0usize; 64];
    let buffer = storage.as_mut_ptr().cast::<u8>();

    unsafe {
      let (first, second) = write_two_blocks(buffer, 40, 24);

      assert_eq!(first as usize, buffer as usize);
      assert_eq!(payload_of(first) as usize, first as usize + HEADER_SIZE);
      assert_eq!(
        footer_of(first) as usize,
        first as usize + HEADER_SIZE + 40
      );
      assert_eq!(second as usize, first as usize + HEADER_SIZE + 40 + FOOTER_SIZE);
    }
  }

  #[test]
  fn payload_and_header_round_trip() {
    let mut storage = vec![0usize; 64];
    let buffer = storage.as_mut_ptr().cast::<u8>();

    unsafe {
      let (first, second) = write_two_blocks(buffer, 40, 24);

      assert_eq!(first, header_of_payload(payload_of(first)));
      assert_eq!(second, header_of_payload(payload_of(second)));
      assert_eq!(first, header_of_footer(footer_of(first)));
      assert_eq!(second, header_of_footer(footer_of(second)));
    }
  }

  #[test]
  fn neighbors_are_reachable_in_both_directions() {
    let mut storage = vec![0usize; 64];
    let buffer = storage.as_mut_ptr().cast::<u8>();

    unsafe {
      let (first, second) = write_two_blocks(buffer, 40, 24);

      assert_eq!(second, next_header(first));
      assert_eq!(first, prev_header(second));
      assert_eq!(footer_of(first), prev_footer(second));
    }
  }
}
