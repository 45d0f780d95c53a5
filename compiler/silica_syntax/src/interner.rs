//! String interner for identifier storage.
//!
//! Interned strings live for the duration of the compilation; the interner
//! hands out stable `&'static str` references backed by leaked allocations,
//! so a [`Name`] can be resolved without holding a lock.

// Arc is needed so the interner can be shared between the parser side and
// the semantic core without lifetime plumbing.
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings were interned.
    #[error("interner exceeded capacity: {count} strings")]
    Overflow { count: usize },
}

struct Inner {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// Interner mapping strings to compact [`Name`] handles.
///
/// The empty string is pre-interned at index 0 ([`Name::EMPTY`]).
pub struct StringInterner {
    inner: RwLock<Inner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        StringInterner {
            inner: RwLock::new(Inner {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// Returns an error only on index overflow (more than `u32::MAX`
    /// distinct strings).
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(&idx) = self.inner.read().map.get(s) {
            return Ok(Name::from_raw(idx));
        }

        let mut inner = self.inner.write();
        // Re-check under the write lock; another caller may have raced us.
        if let Some(&idx) = inner.map.get(s) {
            return Ok(Name::from_raw(idx));
        }

        let count = inner.strings.len();
        let idx = u32::try_from(count).map_err(|_| InternError::Overflow { count })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        inner.map.insert(leaked, idx);
        inner.strings.push(leaked);
        Ok(Name::from_raw(idx))
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// # Panics
    /// Panics on index overflow; use [`try_intern`](Self::try_intern) to
    /// handle that case gracefully.
    pub fn intern(&self, s: &str) -> Name {
        match self.try_intern(s) {
            Ok(name) => name,
            Err(e) => panic!("{e}"),
        }
    }

    /// Resolve a [`Name`] back to its string.
    ///
    /// Unknown handles resolve to the empty string rather than panicking;
    /// they can only arise from mixing names across interners.
    pub fn resolve(&self, name: Name) -> &'static str {
        self.inner
            .read()
            .strings
            .get(name.raw() as usize)
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings, including the pre-interned empty string.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Check whether only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Shareable handle to a [`StringInterner`].
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a fresh interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Debug for SharedInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_dedupes() {
        let interner = StringInterner::new();
        let a = interner.intern("clk");
        let b = interner.intern("clk");
        let c = interner.intern("rst");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "clk");
        assert_eq!(interner.resolve(c), "rst");
    }

    #[test]
    fn empty_preinterned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.resolve(Name::EMPTY), "");
        assert!(interner.is_empty());
    }

    #[test]
    fn unknown_name_resolves_empty() {
        let interner = StringInterner::new();
        assert_eq!(interner.resolve(Name::from_raw(999)), "");
    }

    #[test]
    fn shared_interner_clones_share_storage() {
        let shared = SharedInterner::new();
        let other = shared.clone();
        let a = shared.intern("net");
        assert_eq!(other.resolve(a), "net");
    }
}
