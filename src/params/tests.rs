use std::ops::ControlFlow;

use num_bigint_dig::BigUint;
use num_traits::{One, Zero};

use super::*;
use crate::math;
use crate::primality::MillerRabinOracle;
use crate::random::RandomSource;

fn generate_with(opts: &KeygenOptions) -> GeneratedParams {
    generate(
        RandomSource::global(),
        &MillerRabinOracle,
        opts,
        Standard::Fips186_2,
        None,
    )
    .unwrap()
}

fn assert_invariants(params: &GeneratedParams, l: usize, n: usize) {
    let (p, q, g) = (
        params.components.p(),
        params.components.q(),
        params.components.g(),
    );
    assert_eq!(math::bitsize(p), l);
    assert_eq!(math::bitsize(q), n);
    assert!(((p - 1u32) % q).is_zero(), "q must divide p - 1");
    assert!(*g > BigUint::one());
    assert!(g < p);
    assert!(math::mod_exp(g, q, p).is_one(), "g must have order q");
    assert!(params.h >= BigUint::from(2u32));
}

#[test]
fn resolve_applies_per_standard_defaults() {
    let opts = KeygenOptions::new(2048);
    assert_eq!(resolve(&opts, Standard::Fips186_2).unwrap().n, 160);
    assert_eq!(resolve(&opts, Standard::Fips186_4).unwrap().n, 256);
    assert_eq!(
        resolve(&KeygenOptions::new(1024), Standard::Fips186_4)
            .unwrap()
            .n,
        160
    );

    let explicit = KeygenOptions {
        qsize: Some(224),
        ..KeygenOptions::new(2048)
    };
    assert_eq!(resolve(&explicit, Standard::Fips186_4).unwrap().n, 224);
}

#[test]
fn resolve_rejects_bad_sizes() {
    assert!(resolve(&KeygenOptions::new(255), Standard::Fips186_2).is_err());

    let bad_legacy_qsize = KeygenOptions {
        qsize: Some(256),
        ..KeygenOptions::new(2048)
    };
    assert!(resolve(&bad_legacy_qsize, Standard::Fips186_2).is_err());

    for qsize in [0usize, 513] {
        let opts = KeygenOptions {
            qsize: Some(qsize),
            ..KeygenOptions::new(2048)
        };
        assert!(resolve(&opts, Standard::Fips186_4).is_err(), "{}", qsize);
    }

    // L must leave at least 8 bits of headroom above N.
    let tight = KeygenOptions {
        qsize: Some(512),
        ..KeygenOptions::new(256)
    };
    assert!(resolve(&tight, Standard::Fips186_4).is_err());
}

#[test]
fn resolve_discards_unusable_seeds() {
    let short_legacy = KeygenOptions {
        seed: Some(vec![7u8; 19]),
        ..KeygenOptions::new(512)
    };
    assert!(resolve(&short_legacy, Standard::Fips186_2)
        .unwrap()
        .seed
        .is_none());

    let exact_legacy = KeygenOptions {
        seed: Some(vec![7u8; 20]),
        ..KeygenOptions::new(512)
    };
    assert!(resolve(&exact_legacy, Standard::Fips186_2)
        .unwrap()
        .seed
        .is_some());

    let short_modern = KeygenOptions {
        qsize: Some(256),
        seed: Some(vec![7u8; 31]),
        ..KeygenOptions::new(2048)
    };
    assert!(resolve(&short_modern, Standard::Fips186_4)
        .unwrap()
        .seed
        .is_none());

    let wide_modern = KeygenOptions {
        qsize: Some(256),
        seed: Some(vec![7u8; 40]),
        ..KeygenOptions::new(2048)
    };
    assert!(resolve(&wide_modern, Standard::Fips186_4)
        .unwrap()
        .seed
        .is_some());
}

#[test]
fn prove_parsing() {
    assert_eq!("P".parse::<Prove>().unwrap(), Prove::P);
    assert_eq!("q".parse::<Prove>().unwrap(), Prove::Q);
    assert_eq!("1".parse::<Prove>().unwrap(), Prove::Both);
    assert_eq!("false".parse::<Prove>().unwrap(), Prove::None);
    assert!("PQ".parse::<Prove>().is_err());
    assert!(Prove::from_flag(true).proves_p());
    assert!(Prove::from_flag(true).proves_q());
    assert!(!Prove::from_flag(false).proves_p());
    assert!(Prove::P.proves_p());
    assert!(!Prove::P.proves_q());
}

#[test]
fn legacy_generation_reproduces_the_fips_worked_example() {
    // FIPS 186-2 Appendix 5 worked example: this seed leads straight to the
    // published q, and the first acceptable p appears at counter 105.
    let seed = hex::decode("d5014e4b60ef2ba8b6211b4062ba3224e0427dd3").unwrap();
    let expected_q = math::os2ip(&hex::decode("c773218c737ec8ee993b4f2ded30f48edace915f").unwrap());

    let opts = KeygenOptions {
        seed: Some(seed.clone()),
        ..KeygenOptions::new(512)
    };
    let params = generate_with(&opts);

    assert_eq!(params.seed, seed, "accepted seed is the caller's seed");
    assert_eq!(*params.components.q(), expected_q);
    assert_eq!(params.counter, 105);
    assert_eq!(params.h, BigUint::from(2u32));
    assert_invariants(&params, 512, 160);
}

#[test]
fn legacy_generation_with_random_seed_upholds_invariants() {
    let mut ticks = 0u64;
    let mut hook = |_phase: Phase, _i: u64| {
        ticks += 1;
        ControlFlow::Continue(())
    };
    let params = generate(
        RandomSource::global(),
        &MillerRabinOracle,
        &KeygenOptions::new(512),
        Standard::Fips186_2,
        Some(&mut hook),
    )
    .unwrap();
    assert_invariants(&params, 512, 160);
    assert_eq!(params.seed.len(), 20);
    assert!(ticks > 0, "progress hook must be invoked");
}

#[test]
fn modern_generation_upholds_invariants() {
    let opts = KeygenOptions {
        qsize: Some(256),
        standard: Some(Standard::Fips186_4),
        ..KeygenOptions::new(1024)
    };
    let params = generate_with(&opts);
    assert_invariants(&params, 1024, 256);
    assert_eq!(params.seed.len(), 32);
}

#[test]
fn proven_generation_upholds_invariants() {
    let opts = KeygenOptions {
        prove: Prove::Both,
        ..KeygenOptions::new(256)
    };
    let params = generate_with(&opts);
    assert_invariants(&params, 256, 160);
}

#[test]
fn cancellation_surfaces_cleanly() {
    let mut hook = |_phase: Phase, _i: u64| ControlFlow::Break(());
    let err = generate(
        RandomSource::global(),
        &MillerRabinOracle,
        &KeygenOptions::new(512),
        Standard::Fips186_2,
        Some(&mut hook),
    )
    .unwrap_err();
    assert_eq!(err, Error::Cancelled { phase: Phase::Q });
}

#[test]
fn seed_increment_wraps_with_carry() {
    let mut seed = [0x00, 0xff, 0xff];
    increment(&mut seed);
    assert_eq!(seed, [0x01, 0x00, 0x00]);

    let mut all_ones = [0xff, 0xff];
    increment(&mut all_ones);
    assert_eq!(all_ones, [0x00, 0x00]);

    let mut plain = [0x01, 0x02];
    increment(&mut plain);
    assert_eq!(plain, [0x01, 0x03]);
}

#[test]
fn generator_derivation_returns_subgroup_generator() {
    // p = 23, q = 11: e = 2, h = 2 gives g = 4 immediately.
    let (g, h) = derive_generator(&BigUint::from(23u32), &BigUint::from(11u32));
    assert_eq!(g, BigUint::from(4u32));
    assert_eq!(h, BigUint::from(2u32));
}
