//! Capability traits for objects held by the second-chance cache.

/// Equality of a stored object against a lookup key.
///
/// This is the cache's only hit test: an entry is a hit for `key` when
/// its object reports `matches_key(key)`. There is no separate index,
/// so the object's own notion of identity decides residency.
pub trait KeyProvider<K: ?Sized> {
    /// Whether this object is the one identified by `key`.
    fn matches_key(&self, key: &K) -> bool;
}

/// Construction of an object from the key that missed.
pub trait FromKey<K: ?Sized>: Sized {
    /// Build the object the cache will store for `key`.
    fn from_key(key: &K) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(String);

    impl KeyProvider<str> for Named {
        fn matches_key(&self, key: &str) -> bool {
            self.0 == key
        }
    }

    impl FromKey<str> for Named {
        fn from_key(key: &str) -> Self {
            Named(key.to_owned())
        }
    }

    #[test]
    fn unsized_keys_are_supported() {
        let n = Named::from_key("alpha");
        assert!(n.matches_key("alpha"));
        assert!(!n.matches_key("beta"));
    }
}
