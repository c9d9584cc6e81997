#![doc = include_str!("../README.md")]
#![no_std]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod _guide;
mod buffer;
mod comps;
pub mod error;
mod hints;
mod log;
mod prog;
mod rng;
mod scalar;
mod width;

use alloc::vec::Vec;
use core::ops::ControlFlow;

pub use buffer::{buffer_hints, Patch};
pub use comps::CompMap;
pub use error::{Error, ErrorKind, ErrorMessage, Result, ResultExt};
pub use hints::{hints, mutate_with_hints, Hint, HintConfig, HintedMutations, Replacement};
pub use prog::{Arg, ArgPath, BufferLen, ByteBuffer, Call, Program, ScalarConstant};
pub use scalar::scalar_hints;
pub use width::Width;

use rng::Rng;

/// A hinting session and its configuration.
///
/// This type allows you to configure things like the RNG seed used when a
/// single hint is chosen at random, or whether to nudge hints across
/// comparison boundaries.
///
/// A session should be reused across the programs of one fuzzing worker, so
/// that its random choices are reproducible from its seed.
///
/// # Example
///
/// ```
/// # fn foo() -> cmphints::Result<()> {
/// use cmphints::{Arg, Call, CompMap, Program, Session, Width};
///
/// let mut session = Session::new()
///     // Configure the RNG seed, changing which hint is chosen.
///     .seed(0x12345678)
///     // Also try each candidate plus and minus one.
///     .boundary_nudge(true);
///
/// let mut program = Program::new(vec![Call::new(
///     "lseek",
///     vec![Arg::constant(0x10, Width::W32)?],
/// )]);
///
/// let mut comps = CompMap::new();
/// comps.insert_int(Width::W32, 0x10, 0x1000);
///
/// // Either 0xfff, 0x1000, or 0x1001.
/// session.mutate_with_hints(&mut program, &[comps])?;
/// println!("mutated program is {program}");
/// # Ok(())
/// # }
/// # foo().unwrap();
/// ```
#[derive(Debug)]
pub struct Session {
    config: HintConfig,
    rng: Rng,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a new, default `Session`.
    pub fn new() -> Self {
        Self {
            config: HintConfig::default(),
            rng: Rng::default(),
        }
    }

    /// Set the seed for the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Rng::new(seed);
        self
    }

    /// Set whether to also suggest each candidate plus and minus one.
    ///
    /// Defaults to `false`.
    pub fn boundary_nudge(mut self, nudge: bool) -> Self {
        self.config.boundary_nudge = nudge;
        self
    }

    /// Only look for byte sequences starting within the first `max` bytes of
    /// each buffer.
    ///
    /// Defaults to `None`, meaning no limit.
    pub fn max_data_len(mut self, max: Option<usize>) -> Self {
        self.config.max_data_len = max;
        self
    }

    /// Get this session's hint configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HintConfig {
        &self.config
    }

    /// Enumerate every hint that `comps` suggests for `program`.
    ///
    /// See [`hints()`][crate::hints()] for details.
    pub fn hints(&self, program: &Program, comps: &[CompMap]) -> Result<Vec<Hint>> {
        hints::collect_hints(program, comps, &self.config)
    }

    /// Produce one mutated copy of `program` per hint, passing each to
    /// `consumer`.
    ///
    /// See [`mutate_with_hints()`][crate::mutate_with_hints()] for details.
    pub fn for_each_hint(
        &self,
        program: &Program,
        comps: &[CompMap],
        consumer: impl FnMut(Program) -> ControlFlow<()>,
    ) -> Result<()> {
        hints::for_each_mutation(program, comps, &self.config, consumer)
    }

    /// Get a lazy iterator over the mutated copies of `program`, one per hint.
    ///
    /// # Example
    ///
    /// ```
    /// # fn foo() -> cmphints::Result<()> {
    /// use cmphints::{Arg, Call, CompMap, Program, Session, Width};
    ///
    /// let program = Program::new(vec![Call::new(
    ///     "ioctl",
    ///     vec![Arg::constant(0xabcd, Width::W16)?],
    /// )]);
    ///
    /// let mut comps = CompMap::new();
    /// comps.insert_int(Width::W16, 0xabcd, 0x1);
    /// comps.insert_int(Width::W16, 0xabcd, 0x2);
    ///
    /// let session = Session::new();
    /// let mutations = session.hinted_mutations(&program, &[comps])?;
    ///
    /// // The sequence can be replayed by cloning it.
    /// assert_eq!(mutations.clone().count(), 2);
    /// for mutated in mutations {
    ///     assert_ne!(mutated, program);
    /// }
    /// # Ok(())
    /// # }
    /// # foo().unwrap();
    /// ```
    pub fn hinted_mutations<'a>(
        &self,
        program: &'a Program,
        comps: &[CompMap],
    ) -> Result<HintedMutations<'a>> {
        let hints = self.hints(program, comps)?;
        Ok(HintedMutations::new(program, hints))
    }

    /// Apply a single hint, chosen at random, to `program` in place.
    ///
    /// Returns an [`Exhausted`][ErrorKind::Exhausted] error if `comps`
    /// suggests no hints for `program`. Use
    /// [`ignore_exhausted`][ResultExt::ignore_exhausted] if that is expected.
    pub fn mutate_with_hints(&mut self, program: &mut Program, comps: &[CompMap]) -> Result<()> {
        log::trace!("=== choosing and applying a hint ===");

        // Count how many hints we *could* apply.
        let mut phase = Phase::Count(0);
        let _ = hints::visit_hints(program, comps, &self.config, &mut |_hint| {
            phase.count();
            ControlFlow::Continue(())
        })?;
        let count = match phase {
            Phase::Count(count) => count,
            Phase::Choose { .. } => unreachable!(),
        };
        log::trace!("counted {count} hints");

        // Choose a random target hint to actually apply.
        let Some(target) = self.rng.gen_index(count) else {
            log::trace!("no hints to apply");
            return Err(Error::exhausted());
        };
        log::trace!("targeting hint {target}");

        // Find the chosen target hint. Enumeration is deterministic, so the
        // second pass sees the same hints in the same order.
        let mut phase = Phase::Choose {
            current: 0,
            target,
            chosen: None,
        };
        let _ = hints::visit_hints(program, comps, &self.config, &mut |hint| phase.offer(hint))?;
        let chosen = match phase {
            Phase::Choose {
                chosen: Some(hint), ..
            } => hint,
            _ => unreachable!("hint enumeration must be deterministic"),
        };

        if program.apply_hint(&chosen) {
            Ok(())
        } else {
            Err(Error::other("chosen hint does not apply to the program"))
        }
    }
}

enum Phase {
    Count(usize),
    Choose {
        current: usize,
        target: usize,
        chosen: Option<Hint>,
    },
}

impl Phase {
    fn count(&mut self) {
        if let Phase::Count(count) = self {
            *count += 1;
        }
    }

    fn offer(&mut self, hint: Hint) -> ControlFlow<()> {
        match self {
            Phase::Choose {
                current,
                target,
                chosen,
            } => {
                if *current == *target {
                    *chosen = Some(hint);
                    ControlFlow::Break(())
                } else {
                    *current += 1;
                    ControlFlow::Continue(())
                }
            }
            Phase::Count(_) => unreachable!(),
        }
    }
}
