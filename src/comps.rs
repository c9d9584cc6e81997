//! Comparison maps: what a program's execution compared against what.

use crate::Width;
use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};
use core::fmt;

/// The comparisons observed while executing a single call.
///
/// A `CompMap` maps an observed value to the set of values it was compared
/// against. Integer entries are keyed by the [`Width`] at which the comparison
/// was recorded as well as by value, so that the same bit pattern observed at
/// different widths stays distinct. Byte-sequence entries are keyed by the
/// observed bytes.
///
/// Candidate sets are true sets: inserting the same pair twice is a no-op.
/// Nothing is validated on insertion; entries whose candidate does not fit
/// the key's width or length are skipped when hints are resolved.
///
/// # Example
///
/// ```
/// use cmphints::{CompMap, Width};
///
/// let mut comps = CompMap::new();
///
/// // The target compared a 32-bit value `0xdeadbeef` against `0xcafebabe`.
/// comps.add_comparison(Width::W32, 0xdeadbeef, 0xcafebabe);
///
/// // Comparisons are recorded in both directions.
/// assert!(comps.int_candidates(Width::W32, 0xdeadbeef).unwrap().contains(&0xcafebabe));
/// assert!(comps.int_candidates(Width::W32, 0xcafebabe).unwrap().contains(&0xdeadbeef));
///
/// // But only at the width they were recorded at.
/// assert!(comps.int_candidates(Width::W64, 0xdeadbeef).is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompMap {
    ints: BTreeMap<(Width, u64), BTreeSet<u64>>,
    data: BTreeMap<Vec<u8>, BTreeSet<Vec<u8>>>,
}

impl CompMap {
    /// Create a new, empty comparison map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `observed` was compared against `operand` at `width`.
    pub fn insert_int(&mut self, width: Width, observed: u64, operand: u64) {
        self.ints
            .entry((width, observed))
            .or_default()
            .insert(operand);
    }

    /// Record a comparison between `a` and `b` at `width`, in both directions.
    ///
    /// Tracers usually cannot tell which side of a comparison came from the
    /// program's input, so either operand may be the one worth replacing.
    pub fn add_comparison(&mut self, width: Width, a: u64, b: u64) {
        self.insert_int(width, a, b);
        self.insert_int(width, b, a);
    }

    /// Record that the byte sequence `observed` was compared against
    /// `operand`.
    pub fn insert_data(&mut self, observed: impl Into<Vec<u8>>, operand: impl Into<Vec<u8>>) {
        self.data
            .entry(observed.into())
            .or_default()
            .insert(operand.into());
    }

    /// Record a comparison between two byte sequences, in both directions.
    pub fn add_data_comparison(&mut self, a: impl Into<Vec<u8>>, b: impl Into<Vec<u8>>) {
        let a = a.into();
        let b = b.into();
        self.insert_data(a.clone(), b.clone());
        self.insert_data(b, a);
    }

    /// Get the values that `observed` was compared against at `width`.
    #[must_use]
    pub fn int_candidates(&self, width: Width, observed: u64) -> Option<&BTreeSet<u64>> {
        self.ints.get(&(width, observed))
    }

    /// Get the byte sequences that `observed` was compared against.
    #[must_use]
    pub fn data_candidates(&self, observed: &[u8]) -> Option<&BTreeSet<Vec<u8>>> {
        self.data.get(observed)
    }

    /// Iterate over every integer entry as `(width, observed, candidates)`.
    pub fn int_entries(&self) -> impl Iterator<Item = (Width, u64, &BTreeSet<u64>)> + '_ {
        self.ints.iter().map(|(&(w, v), set)| (w, v, set))
    }

    /// Iterate over every byte-sequence entry as `(observed, candidates)`.
    pub fn data_entries(&self) -> impl Iterator<Item = (&[u8], &BTreeSet<Vec<u8>>)> + '_ {
        self.data.iter().map(|(k, set)| (k.as_slice(), set))
    }

    /// The total number of `observed -> operand` pairs in this map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ints.values().map(BTreeSet::len).sum::<usize>()
            + self.data.values().map(BTreeSet::len).sum::<usize>()
    }

    /// Whether this map has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ints.is_empty() && self.data.is_empty()
    }

    /// Keep only the pairs that are also present in `other`.
    ///
    /// Comparisons whose operands change from one run of the same program to
    /// the next (pointers, timestamps, random numbers) make poor hints.
    /// Intersecting the maps of two runs filters them out.
    ///
    /// # Example
    ///
    /// ```
    /// use cmphints::{CompMap, Width};
    ///
    /// let mut first = CompMap::new();
    /// first.insert_int(Width::W64, 0x1, 0x2);
    /// first.insert_int(Width::W64, 0x1, 0x7f001234);
    ///
    /// let mut second = CompMap::new();
    /// second.insert_int(Width::W64, 0x1, 0x2);
    /// second.insert_int(Width::W64, 0x1, 0x7f005678);
    ///
    /// first.retain_common(&second);
    /// assert_eq!(first.len(), 1);
    /// assert!(first.int_candidates(Width::W64, 0x1).unwrap().contains(&0x2));
    /// ```
    pub fn retain_common(&mut self, other: &CompMap) {
        self.ints.retain(|key, set| match other.ints.get(key) {
            Some(theirs) => {
                set.retain(|v| theirs.contains(v));
                !set.is_empty()
            }
            None => false,
        });
        self.data.retain(|key, set| match other.data.get(key) {
            Some(theirs) => {
                set.retain(|v| theirs.contains(v));
                !set.is_empty()
            }
            None => false,
        });
    }
}

impl fmt::Display for CompMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (&(width, observed), set) in &self.ints {
            write!(f, "{width} {observed:#x} => {{")?;
            for (i, v) in set.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{v:#x}")?;
            }
            writeln!(f, "}}")?;
        }
        for (observed, set) in &self.data {
            write!(f, "data ")?;
            write_hex(f, observed)?;
            write!(f, " => {{")?;
            for (i, v) in set.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_hex(f, v)?;
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

pub(crate) fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "\"")?;
    for b in bytes {
        write!(f, "{b:02x}")?;
    }
    write!(f, "\"")
}
