use fralloc::{FreeListAllocator, print_heap};

fn main() {
  // A 4 KiB region from the host allocator stands in for whatever fixed
  // buffer a real deployment would bring: a static array, a reserved RAM
  // window, a mapped page.
  const REGION_SIZE: usize = 4096;

  unsafe {
    let region = libc::malloc(REGION_SIZE) as *mut u8;
    assert!(!region.is_null());

    let mut allocator = FreeListAllocator::new(region, REGION_SIZE);
    println!("[0] Allocator bound to a {REGION_SIZE} byte region");
    print_heap(&allocator);

    // --------------------------------------------------------------------
    // 1) Impossible requests fail cleanly: zero bytes, or more than the
    //    region could ever hold.
    // --------------------------------------------------------------------
    println!("\n[1] allocate(0) -> {:?}", allocator.allocate(0));
    println!("[1] allocate({REGION_SIZE}) -> {:?}", allocator.allocate(REGION_SIZE));

    // --------------------------------------------------------------------
    // 2) Three allocations carve the region front to back.
    // --------------------------------------------------------------------
    let first = allocator.allocate(100);
    let second = allocator.allocate(200);
    let third = allocator.allocate(300);
    assert!(!first.is_null() && !second.is_null() && !third.is_null());

    for i in 0..100 {
      first.add(i).write(i as u8);
    }

    println!("\n[2] Allocated 100, 200 and 300 bytes");
    print_heap(&allocator);

    // --------------------------------------------------------------------
    // 3) Freeing the middle block leaves a hole between two reserved
    //    blocks.
    // --------------------------------------------------------------------
    allocator.deallocate(second);
    println!("\n[3] Freed the middle block");
    print_heap(&allocator);

    // --------------------------------------------------------------------
    // 4) An equal-sized request is first-fit: it lands back in the hole.
    // --------------------------------------------------------------------
    let reused = allocator.allocate(200);
    println!("\n[4] allocate(200) reused the hole: {}", reused == second);
    assert!(reused == second);

    // --------------------------------------------------------------------
    // 5) A larger request skips the hole and carves the tail instead.
    // --------------------------------------------------------------------
    allocator.deallocate(reused);
    let skipped = allocator.allocate(256);
    println!("\n[5] allocate(256) went past the 200 byte hole: {}", skipped > third);
    assert!(skipped > third);
    print_heap(&allocator);

    // --------------------------------------------------------------------
    // 6) Shrinking in place: the residual becomes free and merges into
    //    the neighboring hole.
    // --------------------------------------------------------------------
    let shrunk = allocator.reallocate(first, 40);
    println!("\n[6] Shrank the first block to 40 bytes (pointer unchanged: {})", shrunk == first);
    print_heap(&allocator);

    // --------------------------------------------------------------------
    // 7) Growing in place: the following hole supplies the bytes, so the
    //    pointer still does not move.
    // --------------------------------------------------------------------
    let regrown = allocator.reallocate(first, 150);
    println!("\n[7] Grew the first block to 150 bytes (pointer unchanged: {})", regrown == first);
    for i in 0..40 {
      assert_eq!(i as u8, first.add(i).read());
    }
    println!("[7] The first 40 bytes survived both moves of the footer");
    print_heap(&allocator);

    // --------------------------------------------------------------------
    // 8) Growing with no free neighbor big enough: the allocation
    //    relocates, and its bytes come along.
    // --------------------------------------------------------------------
    for i in 0..300 {
      third.add(i).write((i % 251) as u8);
    }

    let moved = allocator.reallocate(third, 1000);
    assert!(!moved.is_null());
    println!("\n[8] Grew the third block to 1000 bytes; it moved: {}", moved != third);
    for i in 0..300 {
      assert_eq!((i % 251) as u8, moved.add(i).read());
    }
    println!("[8] All 300 original bytes arrived at the new address");
    print_heap(&allocator);

    // --------------------------------------------------------------------
    // 9) Freeing everything coalesces the region back into one block.
    // --------------------------------------------------------------------
    allocator.deallocate(first);
    allocator.deallocate(skipped);
    allocator.deallocate(moved);
    println!("\n[9] Freed everything");
    print_heap(&allocator);

    libc::free(region as *mut libc::c_void);
  }
}
