pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Builds the error reported when `requested` elements of `element_size` bytes
/// do not fit in the address space.
#[cold]
pub fn capacity_overflow(requested: usize, element_size: usize) -> crate::error::Error {
    crate::error::ErrorKind::CapacityOverflow {
        requested,
        element_size,
    }
    .into()
}

/// Unwraps the result of an allocating operation whose signature cannot report
/// failure, the way the standard collections do: allocator refusal is routed to
/// [`std::alloc::handle_alloc_error`], any other error (capacity overflow) panics.
#[track_caller]
pub fn unwrap_alloc<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => match e.kind() {
            crate::error::ErrorKind::AllocFailed { size, align } => {
                match std::alloc::Layout::from_size_align(*size, *align) {
                    Ok(layout) => std::alloc::handle_alloc_error(layout),
                    Err(_) => panic!("{e}"),
                }
            }
            _ => panic!("{e}"),
        },
    }
}
