use cmphints::{Arg, Call, CompMap, Program, ResultExt, Session, Width};
use std::ops::ControlFlow;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn program() -> anyhow::Result<Program> {
    Ok(Program::new(vec![
        Call::new("open", vec![Arg::fixed_data(*b"/dev/null")]),
        Call::new(
            "ioctl",
            vec![
                Arg::Resource { id: 0 },
                Arg::constant(0x1234, Width::W32)?,
                Arg::constant(0xab, Width::W8)?,
            ],
        ),
    ]))
}

fn comps() -> Vec<CompMap> {
    let mut open = CompMap::new();
    open.insert_data(*b"null", *b"zero");

    let mut ioctl = CompMap::new();
    ioctl.insert_int(Width::W32, 0x1234, 0x4008ae8a);
    ioctl.insert_int(Width::W32, 0x1234, 0xc008ae88);
    ioctl.insert_int(Width::W64, 0xffff_ffff_ffff_ffab, 0x7);

    vec![open, ioctl]
}

#[test]
fn random_hint_is_one_of_the_hints() -> anyhow::Result<()> {
    init_logging();
    let original = program()?;
    let comps = comps();

    let mut all = vec![];
    Session::new().for_each_hint(&original, &comps, |p| {
        all.push(p);
        ControlFlow::Continue(())
    })?;
    assert_eq!(all.len(), 4);

    let mut session = Session::new().seed(0xaabbccdd);
    for _ in 0..32 {
        let mut p = original.clone();
        session.mutate_with_hints(&mut p, &comps)?;
        assert!(all.contains(&p), "{p}");
    }
    Ok(())
}

#[test]
fn random_hint_is_reproducible() -> anyhow::Result<()> {
    init_logging();
    let original = program()?;
    let comps = comps();

    let run = |seed| -> anyhow::Result<Vec<Program>> {
        let mut session = Session::new().seed(seed);
        let mut out = vec![];
        for _ in 0..16 {
            let mut p = original.clone();
            session.mutate_with_hints(&mut p, &comps)?;
            out.push(p);
        }
        Ok(out)
    };
    assert_eq!(run(1)?, run(1)?);
    Ok(())
}

#[test]
fn random_hint_exhausted() -> anyhow::Result<()> {
    init_logging();
    let mut p = program()?;
    let original = p.clone();
    let mut session = Session::new();

    let err = session
        .mutate_with_hints(&mut p, &[CompMap::new(), CompMap::new()])
        .unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(p, original);

    session
        .mutate_with_hints(&mut p, &[CompMap::new(), CompMap::new()])
        .ignore_exhausted()?;

    // A desynchronized set of maps is still an error.
    assert!(session
        .mutate_with_hints(&mut p, &[CompMap::new()])
        .ignore_exhausted()
        .unwrap_err()
        .is_comps_mismatch());
    Ok(())
}

#[test]
fn lazy_mutations_match_callback_mutations() -> anyhow::Result<()> {
    init_logging();
    let original = program()?;
    let comps = comps();
    let session = Session::new();

    let mut eager = vec![];
    session.for_each_hint(&original, &comps, |p| {
        eager.push(p);
        ControlFlow::Continue(())
    })?;

    let lazy = session.hinted_mutations(&original, &comps)?;
    let replay = lazy.clone();
    assert_eq!(lazy.collect::<Vec<_>>(), eager);
    assert_eq!(replay.collect::<Vec<_>>(), eager);

    assert!(session
        .hinted_mutations(&original, &comps[..1])
        .unwrap_err()
        .is_comps_mismatch());
    Ok(())
}

#[test]
fn boundary_nudge_is_opt_in() -> anyhow::Result<()> {
    init_logging();
    let p = Program::new(vec![Call::new("f", vec![Arg::constant(0x10, Width::W8)?])]);
    let mut comps = CompMap::new();
    comps.insert_int(Width::W8, 0x10, 0x80);
    let comps = [comps];

    assert!(!Session::new().config().boundary_nudge);
    assert_eq!(Session::new().hints(&p, &comps)?.len(), 1);

    let values: Vec<Program> = Session::new()
        .boundary_nudge(true)
        .hinted_mutations(&p, &comps)?
        .collect();
    let mut expected = vec![];
    for v in [0x7f, 0x80, 0x81] {
        expected.push(Program::new(vec![Call::new(
            "f",
            vec![Arg::constant(v, Width::W8)?],
        )]));
    }
    assert_eq!(values, expected);
    Ok(())
}

#[test]
fn max_data_len_limits_buffer_hints() -> anyhow::Result<()> {
    init_logging();
    let p = Program::new(vec![Call::new("f", vec![Arg::fixed_data(*b"xxxxxxxx")])]);
    let mut comps = CompMap::new();
    comps.insert_data(*b"x", *b"y");
    let comps = [comps];

    assert_eq!(Session::new().hints(&p, &comps)?.len(), 8);
    assert_eq!(
        Session::new()
            .max_data_len(Some(3))
            .hints(&p, &comps)?
            .len(),
        3
    );
    Ok(())
}

#[test]
fn retained_comparisons_only() -> anyhow::Result<()> {
    init_logging();
    let p = Program::new(vec![Call::new("f", vec![Arg::constant(0x1, Width::W64)?])]);

    let mut first = CompMap::new();
    first.insert_int(Width::W64, 0x1, 0x2);
    first.insert_int(Width::W64, 0x1, 0x7fff_0000_1000);
    let mut second = CompMap::new();
    second.insert_int(Width::W64, 0x1, 0x2);
    second.insert_int(Width::W64, 0x1, 0x7fff_0000_2000);

    first.retain_common(&second);
    let hints = Session::new().hints(&p, &[first])?;
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].replacement, cmphints::Replacement::Scalar(0x2));
    Ok(())
}
