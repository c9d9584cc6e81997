/*!

# How Scalar Hints Are Resolved

Instrumentation records a comparison at whatever width the target's source
code used for it. That width often differs from the width the program declared
for the argument that flowed into the comparison:

* A 64-bit flags argument may only have its low byte tested (`if ((flags &
  0xff) == 0x42)`). The comparison is recorded at 8 bits.

* An 8-bit argument may be promoted to `int` or `long` before it is compared.
  If the target's type was signed, the promotion sign-extends it, so `0xab`
  turns into `0xffffffffffffffab`.

[`scalar_hints`][crate::scalar_hints] handles both directions. Given an
argument of width `W` holding `V`, for each width `w` in 8, 16, 32 and 64 bits
it looks up these *probe keys* at width `w`:

| `w` vs `W` | probe keys |
|---|---|
| `w < W` (shrink) | the low `w` bits of `V` |
| `w == W` | `V` |
| `w > W` (expand) | `V` zero-extended, and `V` sign-extended if its top bit is set |

Each candidate `X` found under a probe key was recorded at width `w`, and is
converted back to width `W`:

* If `w <= W`, `X` is zero-extended. A narrower recording carries no sign
  information beyond its own bits.
* If `w > W`, `X` is truncated to its low `W` bits.

Candidates that do not fit in `w` bits are malformed and skipped. The results
from all widths are merged, the current value `V` is removed, and what remains
is returned in ascending order.

## Example

```
use cmphints::{scalar_hints, CompMap, HintConfig, Width};

let mut comps = CompMap::new();
comps.insert_int(Width::W8, 0xab, 0x1);                   // shrink
comps.insert_int(Width::W16, 0x12ab, 0x2);                // same width
comps.insert_int(Width::W32, 0x0000_12ab, 0x0003_0003);   // expand, truncated back

let hints = scalar_hints(0x12ab, Width::W16, &comps, &HintConfig::default());
assert_eq!(hints, vec![0x1, 0x2, 0x3]);
```

## Integers Inside Buffers

A target often reads an integer straight out of a byte buffer and compares
that. [`buffer_hints`][crate::buffer_hints] decodes every 1, 2, 4 and 8 byte
window of a fixed-length buffer as a little-endian integer of that width and
resolves it as above, except that comparisons narrower than the window are
left to the narrower window at the same offset. Each replacement is written
back into the window it was read from.

## Boundary Nudges

A comparison like `if (len > 0x100)` records `0x100`, but substituting `0x100`
does not take the branch. With
[`Session::boundary_nudge`][crate::Session::boundary_nudge] enabled, every
candidate `X` is accompanied by `X + 1` and `X - 1`, wrapping within `W` bits.
This is off by default because it triples the number of scalar hints.

 */
