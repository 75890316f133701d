//! End-to-end tests over the public engine surface

use std::ops::ControlFlow;

use fips_dsa::{
    Components, Dsa, Error, Input, Key, KeygenOptions, MillerRabinOracle, Phase, Standard,
};

#[test]
fn legacy_keygen_sign_verify() {
    let dsa = Dsa::new();
    assert_eq!(dsa.standard(), Standard::Fips186_2);

    let generated = dsa.keygen(&KeygenOptions::new(512)).unwrap();
    let key = &generated.key;
    assert!(key.has_private());
    assert_eq!(key.p().bits(), 512);
    assert_eq!(key.q().bits(), 160);
    key.validate(&MillerRabinOracle).unwrap();

    let sig = dsa.sign(key, Input::Message(b"foo bar")).unwrap();
    assert!(dsa.verify(key, &sig, Input::Message(b"foo bar")).unwrap());
    assert!(!dsa.verify(key, &sig, Input::Message(b"foo baz")).unwrap());
}

#[test]
fn modern_keygen_sign_verify() {
    let dsa = Dsa::with_standard(Standard::Fips186_4);
    let opts = KeygenOptions {
        qsize: Some(256),
        ..KeygenOptions::new(1024)
    };
    let generated = dsa.keygen(&opts).unwrap();
    let key = &generated.key;
    assert_eq!(key.p().bits(), 1024);
    assert_eq!(key.q().bits(), 256);
    key.validate(&MillerRabinOracle).unwrap();

    let sig = dsa.sign(key, Input::Message(b"foo bar")).unwrap();
    assert!(dsa.verify(key, &sig, Input::Message(b"foo bar")).unwrap());
    assert!(!dsa.verify(key, &sig, Input::Message(b"foo baz")).unwrap());
}

#[test]
fn keys_round_trip_through_plain_integers() {
    // An envelope codec sees only the integer fields; rebuilding a key from
    // them must verify signatures made with the original.
    let dsa = Dsa::new();
    let generated = dsa.keygen(&KeygenOptions::new(512)).unwrap();
    let key = &generated.key;
    let sig = dsa.sign(key, Input::Message(b"exported")).unwrap();

    let rebuilt_components =
        Components::from_components(key.p().clone(), key.q().clone(), key.g().clone()).unwrap();
    let rebuilt = Key::new(rebuilt_components, key.pub_key().clone());
    rebuilt.validate(&MillerRabinOracle).unwrap();
    assert!(!rebuilt.has_private());
    assert!(dsa.verify(&rebuilt, &sig, Input::Message(b"exported")).unwrap());
}

#[test]
fn generation_witness_is_returned() {
    let dsa = Dsa::new();
    let generated = dsa.generate_params(&KeygenOptions::new(512)).unwrap();
    assert_eq!(generated.seed.len(), 20);
    assert!(generated.counter < 4096);
    generated.components.validate(&MillerRabinOracle).unwrap();
}

#[test]
fn progress_hook_observes_both_phases() {
    let dsa = Dsa::new();
    let mut q_ticks = 0u64;
    let mut p_ticks = 0u64;
    let mut hook = |phase: Phase, _i: u64| {
        match phase {
            Phase::Q => q_ticks += 1,
            Phase::P => p_ticks += 1,
        }
        ControlFlow::Continue(())
    };
    dsa.keygen_with_progress(&KeygenOptions::new(512), &mut hook)
        .unwrap();
    assert!(q_ticks > 0);
    assert!(p_ticks > 0);
}

#[test]
fn cancelled_generation_reports_the_phase() {
    let dsa = Dsa::new();
    let mut hook = |_phase: Phase, _i: u64| ControlFlow::Break(());
    let err = dsa
        .keygen_with_progress(&KeygenOptions::new(512), &mut hook)
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled { phase: Phase::Q }));
}

#[test]
fn usage_errors_surface_immediately() {
    let dsa = Dsa::new();
    assert!(matches!(
        dsa.keygen(&KeygenOptions::new(128)),
        Err(Error::InvalidParameter(_))
    ));

    let bad_qsize = KeygenOptions {
        qsize: Some(224),
        ..KeygenOptions::new(512)
    };
    assert!(matches!(
        dsa.keygen(&bad_qsize),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn standard_override_per_call() {
    let dsa = Dsa::new();
    let generated = dsa.keygen(&KeygenOptions::new(512)).unwrap();
    let key = &generated.key;

    // Same key, signed under the modern standard's hash on request.
    let sig = dsa
        .sign_with(key, Input::Message(b"payload"), Standard::Fips186_4)
        .unwrap();
    assert!(dsa
        .verify_with(key, &sig, Input::Message(b"payload"), Standard::Fips186_4)
        .unwrap());
    assert!(!dsa.verify(key, &sig, Input::Message(b"payload")).unwrap());
}
