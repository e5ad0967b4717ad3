//! Small helpers shared across crates.

/// Returns the unqualified name of `T`, without module path or generic
/// arguments: `short_type_name::<Vec<u8>>()` is `"Vec"`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
