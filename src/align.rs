/// Rounds the given size up to the next machine-word multiple.
///
/// Every payload size the allocator manages passes through this macro, which
/// keeps all block boundaries (and therefore all header and footer records)
/// naturally aligned.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use fralloc::align;
///
/// match mem::size_of::<usize>() {
///   8 => assert_eq!(align!(13), 16), // 64 bit machine.
///   4 => assert_eq!(align!(11), 12), // 32 bit machine.
///   _ => {}
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + mem::size_of::<usize>() - 1) & !(mem::size_of::<usize>() - 1)
  };
}
