use cmphints::{Arg, ArgPath, Call, CompMap, Patch, Program, Replacement, Width};
use std::ops::ControlFlow;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn simple_program(value: u64) -> anyhow::Result<Program> {
    Ok(Program::new(vec![Call::new(
        "syz_test$simple_test_call",
        vec![Arg::constant(value, Width::W64)?],
    )]))
}

fn data_program(bytes: &[u8]) -> Program {
    Program::new(vec![Call::new(
        "syz_test$simple_test_data",
        vec![Arg::pointer(0x2000_0000, Arg::fixed_data(bytes))],
    )])
}

fn collect(program: &Program, comps: &[CompMap]) -> anyhow::Result<Vec<Program>> {
    let mut got = vec![];
    cmphints::mutate_with_hints(program, comps, |p| {
        got.push(p);
        ControlFlow::Continue(())
    })?;
    Ok(got)
}

/// The values of every scalar argument of the first call of each program.
fn first_args(programs: &[Program]) -> Vec<u64> {
    programs
        .iter()
        .map(|p| match &p.calls[0].args[0] {
            Arg::Const(c) => c.value(),
            other => panic!("unexpected arg {other:?}"),
        })
        .collect()
}

#[test]
fn dumb_scalar() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    comps.insert_int(Width::W64, 0xdeadbeef, 0xcafebabe);
    let got = collect(&simple_program(0xdeadbeef)?, &[comps])?;
    assert_eq!(got, vec![simple_program(0xcafebabe)?]);
    Ok(())
}

#[test]
fn one_program_per_operand() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    for v in [0x3, 0x1, 0x2] {
        comps.insert_int(Width::W64, 0xabcd, v);
    }
    let got = collect(&simple_program(0xabcd)?, &[comps])?;
    assert_eq!(first_args(&got), vec![0x1, 0x2, 0x3]);
    Ok(())
}

#[test]
fn const_arg_shrink_size() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    comps.insert_int(Width::W8, 0xab, 0x1);

    // Positive values: the high bytes are ignored.
    // Negative values: the 0xff.. prefix is ignored.
    for v in [
        0x12ab,
        0x123456ab,
        0x1234567890abcdab,
        0xffab,
        0xffffffab,
        0xffffffffffffffab,
    ] {
        let got = collect(&simple_program(v)?, &[comps.clone()])?;
        assert_eq!(got, vec![simple_program(0x1)?], "value {v:#x}");
    }
    Ok(())
}

#[test]
fn const_arg_expand_size() -> anyhow::Result<()> {
    init_logging();
    let cases: &[(Width, u64, &[(Width, u64)])] = &[
        (
            Width::W64,
            0xffffffffffffffab,
            &[(Width::W8, 0xab), (Width::W16, 0xffab), (Width::W32, 0xffffffab)],
        ),
        (
            Width::W32,
            0xffffffab,
            &[(Width::W8, 0xab), (Width::W16, 0xffab)],
        ),
        (Width::W16, 0xffab, &[(Width::W8, 0xab)]),
    ];

    for &(key_width, key, args) in cases {
        let mut comps = CompMap::new();
        comps.insert_int(key_width, key, 0x1);
        for &(arg_width, value) in args {
            let program =
                Program::new(vec![Call::new("f", vec![Arg::constant(value, arg_width)?])]);
            let got = collect(&program, &[comps.clone()])?;
            let want = Program::new(vec![Call::new("f", vec![Arg::constant(0x1, arg_width)?])]);
            assert_eq!(got, vec![want], "arg {value:#x} at {arg_width}, key {key:#x}");
        }
    }
    Ok(())
}

#[test]
fn data_dumb() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    comps.insert_data(*b"cd", *b"42");
    let got = collect(&data_program(b"abcdef"), &[comps])?;
    assert_eq!(got, vec![data_program(b"ab42ef")]);
    Ok(())
}

#[test]
fn data_every_occurrence() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    comps.insert_data([0x01u8, 0x02], [0x08u8, 0x09]);
    let got = collect(&data_program(&[0x01, 0x02, 0x01, 0x02, 0x01, 0x02]), &[comps])?;
    assert_eq!(
        got,
        vec![
            data_program(&[0x08, 0x09, 0x01, 0x02, 0x01, 0x02]),
            data_program(&[0x01, 0x02, 0x08, 0x09, 0x01, 0x02]),
            data_program(&[0x01, 0x02, 0x01, 0x02, 0x08, 0x09]),
        ]
    );
    Ok(())
}

#[test]
fn data_integer_comparison() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    // The target read a little-endian u16 from the start of the buffer.
    comps.insert_int(Width::W16, 0xadde, 0x4242);
    comps.insert_int(Width::W16, 0xdead, 0x4242);
    let got = collect(&data_program(b"\xde\xad\xbe\xef\x44\x45"), &[comps])?;
    assert_eq!(got, vec![data_program(b"\x42\x42\xbe\xef\x44\x45")]);
    Ok(())
}

#[test]
fn empty_comps_emit_nothing() -> anyhow::Result<()> {
    init_logging();
    let program = Program::new(vec![
        Call::new("a", vec![Arg::constant(0x1, Width::W32)?]),
        Call::new("b", vec![Arg::constant(0x1, Width::W32)?]),
    ]);
    let mut comps = CompMap::new();
    comps.insert_int(Width::W32, 0x1, 0x2);

    // Only the second call has comparisons.
    let got = collect(&program, &[CompMap::new(), comps])?;
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].calls[0], program.calls[0]);
    assert_eq!(got[0].calls[1].args[0], Arg::constant(0x2, Width::W32)?);

    assert!(collect(&program, &[CompMap::new(), CompMap::new()])?.is_empty());
    Ok(())
}

#[test]
fn comps_mismatch_fails_loudly() -> anyhow::Result<()> {
    init_logging();
    let program = simple_program(0x1)?;
    let mut called = false;
    let err = cmphints::mutate_with_hints(&program, &[CompMap::new(), CompMap::new()], |_| {
        called = true;
        ControlFlow::Continue(())
    })
    .unwrap_err();
    assert!(err.is_comps_mismatch());
    assert!(!called);

    assert!(cmphints::hints(&program, &[]).unwrap_err().is_comps_mismatch());
    Ok(())
}

#[test]
fn inert_arguments_are_skipped() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    comps.insert_int(Width::W64, 0x5, 0x6);
    comps.insert_data(*b"ab", *b"xy");

    let program = Program::new(vec![Call::new(
        "f",
        vec![
            Arg::Resource { id: 0x5 },
            Arg::Pointer {
                addr: 0x5,
                pointee: None,
            },
            Arg::Union {
                index: 0,
                option: Box::new(Arg::constant(0x5, Width::W64)?),
            },
            Arg::variable_data(*b"ab"),
        ],
    )]);
    assert!(collect(&program, &[comps])?.is_empty());
    Ok(())
}

#[test]
fn visits_nested_args_in_order() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    comps.insert_int(Width::W32, 0x10, 0x11);
    comps.insert_data(*b"k", *b"K");

    let program = Program::new(vec![Call::new(
        "f",
        vec![
            Arg::pointer(
                0x1000,
                Arg::Group(vec![
                    Arg::constant(0x10, Width::W32)?,
                    Arg::fixed_data(*b"kk"),
                ]),
            ),
            Arg::constant(0x10, Width::W32)?,
        ],
    )]);

    let hints = cmphints::hints(&program, &[comps])?;
    let paths: Vec<(Vec<usize>, Replacement)> = hints
        .into_iter()
        .map(|h| (h.path.steps, h.replacement))
        .collect();
    assert_eq!(
        paths,
        vec![
            (vec![0, 0, 0], Replacement::Scalar(0x11)),
            (
                vec![0, 0, 1],
                Replacement::Patch(Patch {
                    offset: 0,
                    bytes: b"K".to_vec()
                })
            ),
            (
                vec![0, 0, 1],
                Replacement::Patch(Patch {
                    offset: 1,
                    bytes: b"K".to_vec()
                })
            ),
            (vec![1], Replacement::Scalar(0x11)),
        ]
    );
    Ok(())
}

#[test]
fn single_substitution() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    comps.add_comparison(Width::W16, 0x1234, 0x4321);
    comps.add_data_comparison(*b"MZ", *b"PE");

    let program = Program::new(vec![Call::new(
        "f",
        vec![
            Arg::constant(0x1234, Width::W16)?,
            Arg::fixed_data(*b"MZMZ"),
            Arg::constant(0x4321, Width::W16)?,
        ],
    )]);

    let hints = cmphints::hints(&program, &[comps.clone()])?;
    let got = collect(&program, &[comps])?;
    assert_eq!(hints.len(), got.len());
    assert_eq!(got.len(), 4);

    for (hint, mutated) in hints.iter().zip(&got) {
        assert_ne!(mutated, &program);
        let changed: Vec<usize> = (0..3)
            .filter(|&i| mutated.calls[0].args[i] != program.calls[0].args[i])
            .collect();
        assert_eq!(changed, vec![hint.path.steps[0]]);
    }
    Ok(())
}

#[test]
fn deterministic() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    for v in [9, 3, 7, 1] {
        comps.insert_int(Width::W32, 0xffff_fff0, v);
        comps.insert_int(Width::W8, 0xf0, v << 4);
    }
    comps.insert_data(*b"\x00\x00", *b"\x01\x02");

    let program = Program::new(vec![Call::new(
        "f",
        vec![
            Arg::constant(0xfff0, Width::W16)?,
            Arg::fixed_data([0u8; 8]),
        ],
    )]);

    let first = collect(&program, &[comps.clone()])?;
    let second = collect(&program, &[comps])?;
    assert!(!first.is_empty());
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn consumer_can_stop_early() -> anyhow::Result<()> {
    init_logging();
    let mut comps = CompMap::new();
    for v in 1..=10 {
        comps.insert_int(Width::W64, 0x0, v);
    }
    let program = simple_program(0x0)?;

    let mut seen = 0;
    cmphints::mutate_with_hints(&program, &[comps], |_| {
        seen += 1;
        if seen == 3 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;
    assert_eq!(seen, 3);
    Ok(())
}

#[test]
fn apply_hint_rejects_mismatched_hints() -> anyhow::Result<()> {
    let mut program = Program::new(vec![Call::new(
        "f",
        vec![Arg::constant(0x1, Width::W8)?, Arg::variable_data(*b"ab")],
    )]);
    let original = program.clone();

    let hints = [
        // Too wide for the argument.
        cmphints::Hint {
            path: ArgPath {
                call: 0,
                steps: vec![0],
            },
            replacement: Replacement::Scalar(0x100),
        },
        // Wrong kind of argument.
        cmphints::Hint {
            path: ArgPath {
                call: 0,
                steps: vec![0],
            },
            replacement: Replacement::Patch(Patch {
                offset: 0,
                bytes: vec![1],
            }),
        },
        // Variable-length buffers are never patched.
        cmphints::Hint {
            path: ArgPath {
                call: 0,
                steps: vec![1],
            },
            replacement: Replacement::Patch(Patch {
                offset: 0,
                bytes: vec![1],
            }),
        },
        // Dangling.
        cmphints::Hint {
            path: ArgPath {
                call: 3,
                steps: vec![0],
            },
            replacement: Replacement::Scalar(0x2),
        },
    ];
    for hint in &hints {
        assert!(!program.apply_hint(hint), "{hint:?}");
    }
    assert_eq!(program, original);
    Ok(())
}
