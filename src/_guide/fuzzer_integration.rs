/*!

# Integrating Hints with a Fuzzer

`cmphints` does not execute programs, collect comparisons, or decide which
programs are interesting. It sits between those steps:

1. Run a program from the corpus with comparison tracing enabled, and build
   one [`CompMap`][crate::CompMap] per call from the trace. Calls that recorded
   nothing get an empty map.

2. Optionally, run the program a second time and intersect the maps with
   [`CompMap::retain_common`][crate::CompMap::retain_common]. This drops
   comparisons against values that change from run to run, such as pointers
   and timestamps.

3. Hand the program and its maps to
   [`Session::for_each_hint`][crate::Session::for_each_hint] (or
   [`mutate_with_hints`][crate::mutate_with_hints()]) and execute each mutated
   program that comes out, keeping those that reach new coverage.

When a fuzzing loop wants a single hinted mutation rather than all of them,
[`Session::mutate_with_hints`][crate::Session::mutate_with_hints] picks one at
random using the session's seeded RNG.

## Example

```no_run
use cmphints::{CompMap, Program, Session};
use std::ops::ControlFlow;

# struct Corpus;
# impl Corpus {
#     fn choose(&self) -> Program { todo!() }
#     fn insert(&mut self, _: Program) {}
# }
# struct Run { comps: Vec<CompMap>, new_coverage: bool }
# fn execute_with_comparisons(_: &Program) -> Run { todo!() }
# fn time_is_up() -> bool { todo!() }
fn hint_stage(corpus: &mut Corpus, session: &Session) -> cmphints::Result<()> {
    let program = corpus.choose();

    // Two runs, so that unstable comparisons can be filtered out.
    let first = execute_with_comparisons(&program);
    let second = execute_with_comparisons(&program);
    let mut comps = first.comps;
    for (mine, theirs) in comps.iter_mut().zip(&second.comps) {
        mine.retain_common(theirs);
    }

    let mut interesting = vec![];
    session.for_each_hint(&program, &comps, |mutated| {
        if execute_with_comparisons(&mutated).new_coverage {
            interesting.push(mutated);
        }
        if time_is_up() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    for p in interesting {
        corpus.insert(p);
    }
    Ok(())
}
```

 */
