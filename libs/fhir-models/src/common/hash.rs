//! Memoized structural hashing
//!
//! Model values are immutable once built, so their hash is computed from all
//! fields on first use and stored in a [`HashCache`]. The cache is invisible
//! to equality.

use std::fmt;
use std::sync::OnceLock;

#[derive(Clone, Default)]
pub struct HashCache(OnceLock<u64>);

impl HashCache {
    pub fn get_or_compute(&self, compute: impl FnOnce() -> u64) -> u64 {
        *self.0.get_or_init(compute)
    }

    pub fn is_computed(&self) -> bool {
        self.0.get().is_some()
    }
}

impl PartialEq for HashCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for HashCache {}

impl fmt::Debug for HashCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            Some(value) => write!(f, "HashCache({value:#018x})"),
            None => f.write_str("HashCache(-)"),
        }
    }
}

/// Implement `Hash` for a model type by hashing the listed fields once and
/// memoizing the result in its `hash_cache` field.
macro_rules! impl_cached_hash {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl ::std::hash::Hash for $ty {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                let value = self.hash_cache.get_or_compute(|| {
                    let mut hasher = ::std::collections::hash_map::DefaultHasher::new();
                    $( ::std::hash::Hash::hash(&self.$field, &mut hasher); )+
                    ::std::hash::Hasher::finish(&hasher)
                });
                state.write_u64(value);
            }
        }
    };
}

pub(crate) use impl_cached_hash;
