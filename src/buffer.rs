//! Resolving patches for byte-buffer arguments.
//!
//! A buffer is treated as an opaque string: any byte sequence the target
//! compared may occur anywhere inside it, any number of times, overlapping or
//! not. Every occurrence of every recorded sequence yields one patch per
//! candidate.
//!
//! The target may also read a little-endian integer out of the buffer and
//! compare that. Every 1, 2, 4 and 8 byte window is decoded and resolved like
//! an integer argument of that width, and each replacement is written back
//! into the same window.

use crate::{log, scalar::window_hints, CompMap, HintConfig, Width};
use alloc::{collections::BTreeSet, vec::Vec};

/// A length-preserving overwrite of `bytes.len()` bytes at `offset`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Patch {
    /// Where in the buffer the patch starts.
    pub offset: usize,
    /// The bytes written at `offset`.
    pub bytes: Vec<u8>,
}

impl Patch {
    /// Overwrite `data` with this patch.
    ///
    /// Returns `false`, leaving `data` untouched, if the patch does not fit.
    pub fn apply(&self, data: &mut [u8]) -> bool {
        let Some(end) = self.offset.checked_add(self.bytes.len()) else {
            return false;
        };
        match data.get_mut(self.offset..end) {
            Some(region) => {
                region.copy_from_slice(&self.bytes);
                true
            }
            None => false,
        }
    }
}

/// Get the patches that `comps` suggests for a buffer currently holding
/// `data`.
///
/// Patches are ordered by offset. At each offset, byte-sequence patches come
/// first (in key order, then candidate order), followed by integer patches
/// (by window width, then ascending value). No patch leaves `data` unchanged,
/// and no two patches produce the same buffer.
///
/// # Example
///
/// ```
/// use cmphints::{buffer_hints, CompMap, HintConfig, Patch, Width};
///
/// let mut comps = CompMap::new();
/// comps.insert_data(*b"cd", *b"42");
///
/// let patches = buffer_hints(b"abcdef", &comps, &HintConfig::default());
/// assert_eq!(patches, vec![Patch { offset: 2, bytes: b"42".to_vec() }]);
///
/// let mut data = b"abcdef".to_vec();
/// assert!(patches[0].apply(&mut data));
/// assert_eq!(data, b"ab42ef");
///
/// // A 16-bit integer compared after being read from the buffer.
/// let mut comps = CompMap::new();
/// comps.insert_int(Width::W16, 0x6463, 0x3234);
/// assert_eq!(
///     buffer_hints(b"abcdef", &comps, &HintConfig::default()),
///     vec![Patch { offset: 2, bytes: b"42".to_vec() }],
/// );
/// ```
pub fn buffer_hints(data: &[u8], comps: &CompMap, config: &HintConfig) -> Vec<Patch> {
    let limit = match config.max_data_len {
        Some(max) => data.len().min(max),
        None => data.len(),
    };

    let mut patches = Patches::default();

    for offset in 0..limit {
        let rest = &data[offset..];
        for (key, candidates) in comps.data_entries() {
            if key.is_empty() || !rest.starts_with(key) {
                continue;
            }
            for candidate in candidates {
                if candidate.len() != key.len() {
                    log::trace!(
                        "dropping data hint of length {} for key of length {}",
                        candidate.len(),
                        key.len()
                    );
                    continue;
                }
                patches.push(offset, &rest[..key.len()], candidate.clone());
            }
        }

        for width in Width::ALL {
            let Some(window) = rest.get(..width.bytes()) else {
                break;
            };
            for v in window_hints(read_le(window), width, comps, config) {
                patches.push(offset, window, v.to_le_bytes()[..width.bytes()].to_vec());
            }
        }
    }

    patches.list
}

/// Patches accumulated for one buffer.
///
/// Two patches that differ only where they agree with the buffer have the
/// same effect, so they are deduplicated on the span that actually changes.
#[derive(Default)]
struct Patches {
    seen: BTreeSet<(usize, Vec<u8>)>,
    list: Vec<Patch>,
}

impl Patches {
    /// Record overwriting `old`, found at `offset`, with `new`.
    fn push(&mut self, offset: usize, old: &[u8], new: Vec<u8>) {
        let Some((start, end)) = changed_span(old, &new) else {
            return;
        };
        if self.seen.insert((offset + start, new[start..end].to_vec())) {
            self.list.push(Patch { offset, bytes: new });
        }
    }
}

/// Decode a little-endian integer of up to eight bytes.
fn read_le(window: &[u8]) -> u64 {
    let mut bytes = [0; 8];
    bytes[..window.len()].copy_from_slice(window);
    u64::from_le_bytes(bytes)
}

/// The `start..end` range in which `old` and `new` differ, or `None` if they
/// are equal.
fn changed_span(old: &[u8], new: &[u8]) -> Option<(usize, usize)> {
    debug_assert_eq!(old.len(), new.len());
    let start = old.iter().zip(new).position(|(a, b)| a != b)?;
    let end = old.len() - old.iter().rev().zip(new.iter().rev()).position(|(a, b)| a != b)?;
    Some((start, end))
}
