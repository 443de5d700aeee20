use lcg_reverser::{Lcg, Rand, RandomCall, ReverseError, Reverser};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fresh cursor at the given internal seed.
fn rand_at(seed: i64) -> Rand {
    Rand::of_internal_seed(&Lcg::JAVA, seed)
}

#[test]
fn recovers_the_seed_behind_a_single_long() {
    init_logging();

    let origin: i64 = 0x5DEECE66D ^ 42;
    let value = rand_at(origin).next_long();

    let mut reverser = Reverser::new();
    reverser.add_call(RandomCall::long_range(value, value).unwrap());

    let seeds: Vec<i64> = reverser.solve().unwrap().collect();
    assert!(seeds.contains(&origin));

    for &seed in &seeds {
        assert_eq!(rand_at(seed).next_long(), value);
    }
}

#[test]
fn every_reported_long_seed_reproduces_the_literal() {
    init_logging();

    let value: i64 = -3_700_000_000;
    let mut reverser = Reverser::new();
    reverser.add_call(RandomCall::long_range(value, value).unwrap());

    for seed in reverser.solve().unwrap() {
        assert_eq!(rand_at(seed).next_long(), value);
    }
}

#[test]
fn float_window_yields_seeds_inside_it() {
    init_logging();

    let mut reverser = Reverser::new();
    reverser.add_call(RandomCall::float_range(0.25, 0.5).unwrap());

    let seeds: Vec<i64> = reverser.solve().unwrap().take(40).collect();
    assert_eq!(seeds.len(), 40);
    for &seed in &seeds {
        let f = rand_at(seed).next_float();
        assert!((0.25..=0.5).contains(&f));
    }
}

#[test]
fn exclusive_float_bounds_are_a_strict_subset() {
    init_logging();

    // A state producing exactly 0.25: passes the inclusive window, fails
    // the exclusive one
    let boundary_state = (1i64 << 46) | 0x2A5F3;
    let rewound = Lcg::JAVA.of_step(-1).unwrap().next_seed(boundary_state);
    assert_eq!(rand_at(rewound).next_float(), 0.25);

    let inclusive = RandomCall::float_range(0.25, 0.5).unwrap();
    let exclusive = RandomCall::float_range_exclusive(0.25, 0.5, true, true).unwrap();
    assert!(inclusive.validate(&mut rand_at(rewound)));
    assert!(!exclusive.validate(&mut rand_at(rewound)));

    // Solving with only the upper bound exclusive keeps the stream strictly
    // below 0.5 while the inclusive run can reach it
    let mut reverser = Reverser::new();
    reverser.add_call(RandomCall::float_range_exclusive(0.25, 0.5, false, true).unwrap());
    for seed in reverser.solve().unwrap().take(40) {
        let f = rand_at(seed).next_float();
        assert!((0.25..0.5).contains(&f));
    }
}

#[test]
fn skip_gap_transcript_recovers_the_generating_seed() {
    init_logging();

    let origin: i64 = 0xDEADBEEF;
    let mut source = rand_at(origin);
    let first = source.next_int32();
    source.next_seed();
    let second = source.next_int32();

    let mut reverser = Reverser::new();
    reverser.add_call(RandomCall::int_range(first, first).unwrap());
    reverser.skip();
    reverser.add_call(RandomCall::int_range(second, second).unwrap());

    let seeds: Vec<i64> = reverser.solve().unwrap().collect();
    assert!(seeds.contains(&origin));

    for &seed in &seeds {
        let mut replay = rand_at(seed);
        assert_eq!(replay.next_int32(), first);
        replay.next_seed();
        assert_eq!(replay.next_int32(), second);
    }
}

#[test]
fn filter_only_entries_survive_outside_the_lattice() {
    init_logging();

    let origin: i64 = 0xCAFEF00D;
    let mut source = rand_at(origin);
    let first = source.next_int32();
    source.next_seed();
    let second = source.next_int32();

    let mut measured = Reverser::new();
    measured.add_call(RandomCall::int_range(first, first).unwrap());
    measured.skip();
    measured.add_call(RandomCall::int_range(second, second).unwrap());
    let mut expected: Vec<i64> = measured.solve().unwrap().collect();
    expected.sort_unstable();

    let mut filtered = Reverser::new();
    filtered.add_filter(RandomCall::int_range(first, first).unwrap());
    filtered.skip();
    filtered.add_call(RandomCall::int_range(second, second).unwrap());
    let mut found: Vec<i64> = filtered.solve().unwrap().collect();
    found.sort_unstable();

    assert_eq!(found, expected);
    assert!(found.contains(&origin));
}

#[test]
fn mixed_call_transcript_round_trips() {
    init_logging();

    let origin: i64 = 0x123456789A;
    let mut source = rand_at(origin);
    let flag = source.next_boolean();
    let value = source.next_long();
    let pick = source.next_int(16);

    let mut reverser = Reverser::new();
    reverser.add_call(RandomCall::boolean(flag));
    reverser.add_call(RandomCall::long_range(value, value).unwrap());
    reverser.add_call(RandomCall::int_range_pow2(16, pick, pick).unwrap());

    let seeds: Vec<i64> = reverser.solve().unwrap().collect();
    assert!(seeds.contains(&origin));

    for &seed in &seeds {
        let mut replay = rand_at(seed);
        assert_eq!(replay.next_boolean(), flag);
        assert_eq!(replay.next_long(), value);
        assert_eq!(replay.next_int(16), pick);
    }
}

#[test]
fn parallel_traversal_finds_the_same_seeds() {
    use rayon::iter::ParallelIterator;

    init_logging();

    let origin: i64 = 0xBADC0FFEE;
    let mut source = rand_at(origin);
    let first = source.next_int32();
    let second = source.next_int32();

    let mut reverser = Reverser::new();
    reverser.add_call(RandomCall::int_range(first, first).unwrap());
    reverser.add_call(RandomCall::int_range(second, second).unwrap());

    let mut sequential: Vec<i64> = reverser.solve().unwrap().collect();
    sequential.sort_unstable();
    let mut parallel: Vec<i64> = reverser.solve().unwrap().into_par_iter().collect();
    parallel.sort_unstable();

    assert_eq!(sequential, parallel);
    assert!(sequential.contains(&origin));
}

#[test]
fn contradictory_bounds_fail_before_enumeration() {
    init_logging();

    use lcg_reverser::math::fraction::Fraction;
    use lcg_reverser::math::simplex::LpBuilder;

    let result = LpBuilder::of_size(1)
        .with_lower_bound(0, &Fraction::from(1))
        .unwrap()
        .with_upper_bound(0, &Fraction::from(0))
        .unwrap()
        .build();
    assert!(matches!(result, Err(ReverseError::InfeasibleConstraints)));
}

#[test]
fn brute_force_cross_check_on_a_small_generator() {
    init_logging();

    // Every seed of a 16-bit generator, checked directly
    let lcg = Lcg::new(25173, 13849, 1 << 16);

    let mut reverser = Reverser::new();
    reverser.add_call(RandomCall::seed(0x1000, 0x1FFF));
    reverser.skip();
    reverser.add_call(RandomCall::seed(0x8000, 0x9FFF));

    let mut found: Vec<i64> = reverser.solve_with(&lcg).unwrap().collect();
    found.sort_unstable();

    let mut expected = Vec::new();
    for seed in 0..(1i64 << 16) {
        let s1 = lcg.next_seed(seed);
        let s2 = lcg.next_seed(lcg.next_seed(s1));
        if (0x1000..=0x1FFF).contains(&s1) && (0x8000..=0x9FFF).contains(&s2) {
            expected.push(seed);
        }
    }

    assert_eq!(found, expected);
    assert!(!found.is_empty());
}
