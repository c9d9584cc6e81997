//! Walking a program's arguments and turning comparison maps into hinted
//! mutations.
//!
//! Every hint substitutes exactly one argument: a new value for an integer
//! constant, or one patch for a fixed-length buffer. Hints are never combined,
//! so when a mutated program reaches new coverage it is clear which single
//! substitution did it.

use crate::{buffer_hints, log, scalar_hints, Arg, ArgPath, CompMap, Error, Patch, Program, Result};
use alloc::vec::Vec;
use core::ops::ControlFlow;

/// Configuration for hint resolution.
///
/// Usually managed by a [`Session`][crate::Session], but the resolvers take it
/// directly as well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HintConfig {
    /// Also suggest each candidate plus and minus one.
    ///
    /// This helps get past `<`/`<=` and `>`/`>=` comparisons where the
    /// recorded operand itself is just on the wrong side of the boundary.
    /// Defaults to `false`.
    pub boundary_nudge: bool,

    /// Only look for byte sequences starting within the first `n` bytes of a
    /// buffer. Defaults to `None`, meaning no limit.
    pub max_data_len: Option<usize>,
}

/// A single hinted substitution within a program.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Hint {
    /// The argument to substitute.
    pub path: ArgPath,
    /// What to substitute it with.
    pub replacement: Replacement,
}

/// The new contents for a hinted argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Replacement {
    /// Replace an integer constant's value.
    Scalar(u64),
    /// Overwrite part of a byte buffer.
    Patch(Patch),
}

impl Program {
    /// Apply `hint` to this program in place.
    ///
    /// Returns `false`, leaving the program untouched, if the hint does not
    /// apply: its path is dangling, it targets the wrong kind of argument, or
    /// the replacement does not fit.
    pub fn apply_hint(&mut self, hint: &Hint) -> bool {
        let Ok(arg) = self.arg_mut(&hint.path) else {
            return false;
        };
        match (arg, &hint.replacement) {
            (Arg::Const(c), Replacement::Scalar(v)) => c.set_value(*v).is_ok(),
            (Arg::Data(d), Replacement::Patch(p)) if d.is_fixed() => p.apply(&mut d.bytes),
            _ => false,
        }
    }
}

/// Enumerate every hint that `comps` suggests for `program`.
///
/// `comps` must hold exactly one comparison map per call of `program`, in
/// the same order; use an empty map for calls without any comparisons.
///
/// Hints are returned in emission order: calls in order, arguments depth-first
/// in order within each call, and each argument's candidates in the order its
/// resolver produces them.
///
/// # Example
///
/// ```
/// use cmphints::{Arg, Call, CompMap, Program, Replacement, Width};
///
/// # fn foo() -> cmphints::Result<()> {
/// let program = Program::new(vec![Call::new("ioctl", vec![Arg::constant(0x12ab, Width::W64)?])]);
///
/// let mut comps = CompMap::new();
/// comps.insert_int(Width::W8, 0xab, 0x1);
///
/// let hints = cmphints::hints(&program, &[comps])?;
/// assert_eq!(hints.len(), 1);
/// assert_eq!(hints[0].replacement, Replacement::Scalar(0x1));
/// # Ok(())
/// # }
/// # foo().unwrap();
/// ```
pub fn hints(program: &Program, comps: &[CompMap]) -> Result<Vec<Hint>> {
    collect_hints(program, comps, &HintConfig::default())
}

/// Produce one mutated copy of `program` per hint, passing each to
/// `consumer`.
///
/// Each program given to `consumer` is a fresh clone of `program` with exactly
/// one hint applied. `program` itself is never modified. Return
/// `ControlFlow::Break(())` from `consumer` to stop early.
///
/// Fails, without calling `consumer`, if `comps` does not hold exactly one
/// comparison map per call.
///
/// # Example
///
/// ```
/// use cmphints::{Arg, Call, CompMap, Program};
/// use std::ops::ControlFlow;
///
/// # fn foo() -> cmphints::Result<()> {
/// let program = Program::new(vec![Call::new(
///     "write",
///     vec![Arg::fixed_data([0x01u8, 0x02, 0x01, 0x02, 0x01, 0x02])],
/// )]);
///
/// let mut comps = CompMap::new();
/// comps.insert_data([0x01u8, 0x02], [0x08u8, 0x09]);
///
/// let mut mutated = vec![];
/// cmphints::mutate_with_hints(&program, &[comps], |p| {
///     mutated.push(p);
///     ControlFlow::Continue(())
/// })?;
///
/// // One program per occurrence.
/// assert_eq!(mutated.len(), 3);
/// assert_eq!(
///     mutated[1].calls[0].args[0],
///     Arg::fixed_data([0x01u8, 0x02, 0x08, 0x09, 0x01, 0x02]),
/// );
/// # Ok(())
/// # }
/// # foo().unwrap();
/// ```
pub fn mutate_with_hints(
    program: &Program,
    comps: &[CompMap],
    consumer: impl FnMut(Program) -> ControlFlow<()>,
) -> Result<()> {
    for_each_mutation(program, comps, &HintConfig::default(), consumer)
}

pub(crate) fn collect_hints(
    program: &Program,
    comps: &[CompMap],
    config: &HintConfig,
) -> Result<Vec<Hint>> {
    let mut hints = Vec::new();
    let _ = visit_hints(program, comps, config, &mut |hint| {
        hints.push(hint);
        ControlFlow::Continue(())
    })?;
    Ok(hints)
}

pub(crate) fn for_each_mutation(
    program: &Program,
    comps: &[CompMap],
    config: &HintConfig,
    mut consumer: impl FnMut(Program) -> ControlFlow<()>,
) -> Result<()> {
    let mut emitted = 0usize;
    let flow = visit_hints(program, comps, config, &mut |hint| {
        let mut mutated = program.clone();
        if !mutated.apply_hint(&hint) {
            log::trace!("skipping hint that does not apply: {hint:?}");
            return ControlFlow::Continue(());
        }
        emitted += 1;
        consumer(mutated)
    })?;
    if flow.is_break() {
        log::debug!("consumer stopped the hint pass after {emitted} programs");
    } else {
        log::debug!("emitted {emitted} hinted programs");
    }
    Ok(())
}

/// Call `f` with every hint for `program`, in emission order, until `f`
/// breaks.
pub(crate) fn visit_hints(
    program: &Program,
    comps: &[CompMap],
    config: &HintConfig,
    f: &mut dyn FnMut(Hint) -> ControlFlow<()>,
) -> Result<ControlFlow<()>> {
    if comps.len() != program.calls.len() {
        log::warn!(
            "comparison maps out of sync with program: {} maps for {} calls",
            comps.len(),
            program.calls.len()
        );
        return Err(Error::comps_mismatch(program.calls.len(), comps.len()));
    }

    for (i, (call, comps)) in program.calls.iter().zip(comps).enumerate() {
        if comps.is_empty() {
            continue;
        }
        let mut path = ArgPath {
            call: i,
            steps: Vec::new(),
        };
        for (j, arg) in call.args.iter().enumerate() {
            path.steps.push(j);
            if visit_arg(arg, &mut path, comps, config, f).is_break() {
                return Ok(ControlFlow::Break(()));
            }
            path.steps.pop();
        }
    }
    Ok(ControlFlow::Continue(()))
}

/// Pre-order walk of `arg` and the arguments reachable from it.
fn visit_arg(
    arg: &Arg,
    path: &mut ArgPath,
    comps: &CompMap,
    config: &HintConfig,
    f: &mut dyn FnMut(Hint) -> ControlFlow<()>,
) -> ControlFlow<()> {
    match arg {
        Arg::Const(c) => {
            let replacers = scalar_hints(c.value(), c.width(), comps, config);
            log::trace!("{} scalar hints at {path:?}", replacers.len());
            for v in replacers {
                f(Hint {
                    path: path.clone(),
                    replacement: Replacement::Scalar(v),
                })?;
            }
        }
        Arg::Data(d) if d.is_fixed() => {
            let patches = buffer_hints(&d.bytes, comps, config);
            log::trace!("{} buffer hints at {path:?}", patches.len());
            for p in patches {
                f(Hint {
                    path: path.clone(),
                    replacement: Replacement::Patch(p),
                })?;
            }
        }
        _ => {
            for k in 0..arg.child_count() {
                if let Some(child) = arg.child(k) {
                    path.steps.push(k);
                    let flow = visit_arg(child, path, comps, config, f);
                    path.steps.pop();
                    flow?;
                }
            }
        }
    }
    ControlFlow::Continue(())
}

/// A lazy, finite sequence of hinted mutations of a program.
///
/// Created by [`Session::hinted_mutations`][crate::Session::hinted_mutations].
/// Hints are resolved up front, but each mutated program is only cloned when
/// it is yielded. Clone the iterator to replay the sequence from the same
/// position.
#[derive(Clone, Debug)]
pub struct HintedMutations<'a> {
    program: &'a Program,
    hints: alloc::vec::IntoIter<Hint>,
}

impl<'a> HintedMutations<'a> {
    pub(crate) fn new(program: &'a Program, hints: Vec<Hint>) -> Self {
        Self {
            program,
            hints: hints.into_iter(),
        }
    }
}

impl Iterator for HintedMutations<'_> {
    type Item = Program;

    fn next(&mut self) -> Option<Program> {
        for hint in self.hints.by_ref() {
            let mut mutated = self.program.clone();
            if mutated.apply_hint(&hint) {
                return Some(mutated);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.hints.len()))
    }
}
