//! Resolving replacement values for integer arguments.
//!
//! The width at which the target compared a value rarely matches the width at
//! which the program declared it. A 64-bit argument may only have its low byte
//! checked, and an 8-bit argument may be promoted to a machine word (and
//! sign-extended on the way) before it is compared. Hints are therefore looked
//! up at every width, and whatever is found is converted back to the
//! argument's width.

use crate::{log, CompMap, HintConfig, Width};
use alloc::{collections::BTreeSet, vec::Vec};

/// Get the replacement values that `comps` suggests for a `width`-bit
/// argument currently holding `value`.
///
/// Every returned value fits in `width` and differs from `value`. The result
/// is sorted ascending with no duplicates.
///
/// # Example
///
/// ```
/// use cmphints::{scalar_hints, CompMap, HintConfig, Width};
///
/// let mut comps = CompMap::new();
/// // The target only looked at the low byte of the argument...
/// comps.insert_int(Width::W8, 0xab, 0x1);
/// // ...and compared a sign-extended copy of it elsewhere.
/// comps.insert_int(Width::W64, 0xffff_ffff_ffff_ffab, 0x2);
///
/// let config = HintConfig::default();
/// assert_eq!(scalar_hints(0x12ab, Width::W64, &comps, &config), vec![0x1]);
/// assert_eq!(scalar_hints(0xab, Width::W8, &comps, &config), vec![0x1, 0x2]);
/// ```
pub fn scalar_hints(value: u64, width: Width, comps: &CompMap, config: &HintConfig) -> Vec<u64> {
    resolve(value, width, Width::ALL, comps, config)
}

/// Like [`scalar_hints`], but only for comparisons recorded at `width` or
/// wider.
///
/// Used for integers read out of buffers, where a narrower comparison is
/// found through the narrower window at the same offset instead.
pub(crate) fn window_hints(value: u64, width: Width, comps: &CompMap, config: &HintConfig) -> Vec<u64> {
    let widths = Width::ALL.into_iter().filter(|&w| w >= width);
    resolve(value, width, widths, comps, config)
}

fn resolve(
    value: u64,
    width: Width,
    widths: impl IntoIterator<Item = Width>,
    comps: &CompMap,
    config: &HintConfig,
) -> Vec<u64> {
    let value = width.truncate(value);
    let mut replacers = BTreeSet::new();

    for w in widths {
        for probe in probes(value, width, w).into_iter().flatten() {
            let Some(candidates) = comps.int_candidates(w, probe) else {
                continue;
            };
            for &candidate in candidates {
                if !w.fits(candidate) {
                    log::trace!("dropping {candidate:#x}: recorded at {w} but wider");
                    continue;
                }
                // A narrower recording carries no sign information, so it
                // comes back zero-extended. A wider one is cut down to size.
                let replacer = if w <= width {
                    candidate
                } else {
                    width.truncate(candidate)
                };
                replacers.insert(replacer);
                if config.boundary_nudge {
                    replacers.insert(width.truncate(replacer.wrapping_add(1)));
                    replacers.insert(width.truncate(replacer.wrapping_sub(1)));
                }
            }
        }
    }

    replacers.remove(&value);
    replacers.into_iter().collect()
}

/// The keys under which a comparison of `value` (declared at `width`) would
/// have been recorded at width `w`.
fn probes(value: u64, width: Width, w: Width) -> [Option<u64>; 2] {
    if w <= width {
        // Shrink, or the argument's own width.
        return [Some(w.truncate(value)), None];
    }

    // Expand: the target may have zero- or sign-extended the value.
    let signed = width.top_bit_set(value).then(|| width.sign_extend(value, w));
    [Some(value), signed]
}
