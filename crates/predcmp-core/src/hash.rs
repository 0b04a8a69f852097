//! Structural hashing for IR nodes, AST nodes and plain JSON values.
//!
//! Hashes are content-addressed: equal structure yields equal hashes, and
//! object keys are fed in sorted order so key insertion order never leaks into
//! the digest. Digests are stable for the lifetime of a process; they are not
//! a persisted format.

use derive_more::Deref;
use serde_json::Value;
use std::{fmt, sync::Arc};
use xxhash_rust::xxh3::{Xxh3, xxh3_64_with_seed};

/// Seed used by every structural digest.
pub const HASH_SEED: u64 = 0;

/// Namespace seed for folding unordered collections.
const UNORDERED_NAMESPACE: u64 = 0x756e_6f72_6465_7265;

// Per-type tag bytes; null/true/false/none each get their own sentinel.
const TAG_NONE: u8 = 0xA0;
const TAG_NULL: u8 = 0xA1;
const TAG_TRUE: u8 = 0xA2;
const TAG_FALSE: u8 = 0xA3;
const TAG_NUMBER: u8 = 0xA4;
const TAG_STRING: u8 = 0xA5;
const TAG_ARRAY: u8 = 0xA6;
const TAG_OBJECT: u8 = 0xA7;
const TAG_HASH: u8 = 0xA8;

///
/// NodeHash
///
/// Canonical, content-derived identifier. Computed digests render as 16 hex
/// digits; hand-built nodes (tests, tooling) may carry arbitrary labels.
///

#[derive(Clone, Debug, Deref, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[deref(forward)]
pub struct NodeHash(Arc<str>);

impl NodeHash {
    #[must_use]
    pub fn from_digest(digest: u64) -> Self {
        Self(Arc::from(format!("{digest:016x}")))
    }

    /// Wrap an explicit label as a hash.
    #[must_use]
    pub fn label(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Numeric projection used to sort members of unordered collections.
    fn digest(&self) -> u64 {
        xxh3_64_with_seed(self.0.as_bytes(), HASH_SEED)
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

///
/// StructuralHasher
///
/// Streaming hasher with typed, tag-prefixed writes. Strings and nested
/// hashes are length-prefixed to avoid concatenation collisions.
///

pub struct StructuralHasher {
    inner: Xxh3,
}

impl StructuralHasher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(HASH_SEED),
        }
    }

    fn tag(&mut self, tag: u8) {
        self.inner.update(&[tag]);
    }

    fn write_len(&mut self, len: usize) {
        self.inner.update(&(len as u64).to_be_bytes());
    }

    pub fn write_none(&mut self) {
        self.tag(TAG_NONE);
    }

    pub fn write_null(&mut self) {
        self.tag(TAG_NULL);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.tag(if value { TAG_TRUE } else { TAG_FALSE });
    }

    pub fn write_f64(&mut self, value: f64) {
        self.tag(TAG_NUMBER);
        self.inner.update(&canonical_f64_bits(value).to_be_bytes());
    }

    // Integers share the number domain so `1` and `1.0` agree.
    #[expect(clippy::cast_precision_loss)]
    pub fn write_i64(&mut self, value: i64) {
        self.write_f64(value as f64);
    }

    pub fn write_str(&mut self, value: &str) {
        self.tag(TAG_STRING);
        self.write_len(value.len());
        self.inner.update(value.as_bytes());
    }

    pub fn write_hash(&mut self, hash: &NodeHash) {
        self.tag(TAG_HASH);
        self.write_len(hash.len());
        self.inner.update(hash.as_bytes());
    }

    /// Open an ordered sequence of `len` items; callers then write each item.
    pub fn begin_array(&mut self, len: usize) {
        self.tag(TAG_ARRAY);
        self.write_len(len);
    }

    /// Open a keyed record of `len` entries; callers then write key/value pairs
    /// in sorted key order.
    pub fn begin_object(&mut self, len: usize) {
        self.tag(TAG_OBJECT);
        self.write_len(len);
    }

    #[must_use]
    pub fn finish(&self) -> NodeHash {
        NodeHash::from_digest(self.inner.digest())
    }
}

impl Default for StructuralHasher {
    fn default() -> Self {
        Self::new()
    }
}

///
/// StructuralHash
///
/// Types that can feed their structure into a `StructuralHasher`.
///

pub trait StructuralHash {
    fn feed(&self, hasher: &mut StructuralHasher);

    fn structural_hash(&self) -> NodeHash {
        let mut hasher = StructuralHasher::new();
        self.feed(&mut hasher);
        hasher.finish()
    }
}

impl StructuralHash for Value {
    fn feed(&self, hasher: &mut StructuralHasher) {
        match self {
            Self::Null => hasher.write_null(),
            Self::Bool(b) => hasher.write_bool(*b),
            Self::Number(n) => match n.as_f64() {
                Some(f) => hasher.write_f64(f),
                None => hasher.write_str(&n.to_string()),
            },
            Self::String(s) => hasher.write_str(s),
            Self::Array(items) => {
                hasher.begin_array(items.len());
                for item in items {
                    item.feed(hasher);
                }
            }
            Self::Object(entries) => {
                // Canonical key order keeps the digest independent of how the
                // caller built the map.
                let mut ordered = entries.iter().collect::<Vec<_>>();
                ordered.sort_by(|(left, _), (right, _)| left.cmp(right));

                hasher.begin_object(ordered.len());
                for (key, value) in ordered {
                    hasher.write_str(key);
                    value.feed(hasher);
                }
            }
        }
    }
}

/// Hash one plain JSON value.
#[must_use]
pub fn hash_value(value: &Value) -> NodeHash {
    value.structural_hash()
}

/// Hash a collection without regard to member order.
///
/// Each member is reduced to a numeric digest, the digests are sorted, and
/// the sorted sequence is folded under a dedicated namespace seed.
pub fn unordered_hash<'a, I>(items: I) -> NodeHash
where
    I: IntoIterator<Item = &'a NodeHash>,
{
    let mut digests = items.into_iter().map(NodeHash::digest).collect::<Vec<_>>();
    digests.sort_unstable();

    let mut hasher = Xxh3::with_seed(UNORDERED_NAMESPACE);
    hasher.update(&(digests.len() as u64).to_be_bytes());
    for digest in digests {
        hasher.update(&digest.to_be_bytes());
    }

    NodeHash::from_digest(hasher.digest())
}

// Fold -0.0 into 0.0 and every NaN into one payload.
fn canonical_f64_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn object_hash_ignores_key_order() {
        let left = json!({ "foo": "apple", "bar": "orange" });
        let right = json!({ "bar": "orange", "foo": "apple" });

        assert_eq!(hash_value(&left), hash_value(&right));
    }

    #[test]
    fn array_hash_is_order_sensitive() {
        assert_ne!(hash_value(&json!([1, 2])), hash_value(&json!([2, 1])));
    }

    #[test]
    fn unordered_hash_ignores_member_order() {
        let a = hash_value(&json!("a"));
        let b = hash_value(&json!("b"));

        assert_eq!(unordered_hash([&a, &b]), unordered_hash([&b, &a]));
        assert_ne!(unordered_hash([&a, &b]), unordered_hash([&a]));
    }

    #[test]
    fn sentinels_are_distinct() {
        let hashes = [
            hash_value(&json!(null)),
            hash_value(&json!(false)),
            hash_value(&json!(true)),
            hash_value(&json!(0)),
            hash_value(&json!("")),
            hash_value(&json!([])),
            hash_value(&json!({})),
        ];

        for (i, left) in hashes.iter().enumerate() {
            for right in &hashes[i + 1..] {
                assert_ne!(left, right);
            }
        }
    }

    #[test]
    fn signed_zero_and_integer_forms_agree() {
        let mut neg = StructuralHasher::new();
        neg.write_f64(-0.0);
        let mut pos = StructuralHasher::new();
        pos.write_f64(0.0);
        assert_eq!(neg.finish(), pos.finish());

        assert_eq!(hash_value(&json!(1)), hash_value(&json!(1.0)));
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut joined = StructuralHasher::new();
        joined.write_str("ab");
        joined.write_str("c");

        let mut split = StructuralHasher::new();
        split.write_str("a");
        split.write_str("bc");

        assert_ne!(joined.finish(), split.finish());
    }

    #[test]
    fn computed_hashes_render_as_hex() {
        let hash = hash_value(&json!("x"));

        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    proptest! {
        #[test]
        fn unordered_hash_is_permutation_invariant(
            labels in prop::collection::vec("[a-z]{1,4}", 0..8),
            seed in any::<usize>(),
        ) {
            let hashes = labels.iter().map(NodeHash::label).collect::<Vec<_>>();
            let mut shuffled = hashes.clone();
            if !shuffled.is_empty() {
                let len = shuffled.len();
                shuffled.rotate_left(seed % len);
                shuffled.reverse();
            }

            prop_assert_eq!(unordered_hash(&hashes), unordered_hash(&shuffled));
        }
    }
}
