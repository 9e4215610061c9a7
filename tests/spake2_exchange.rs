//! End-to-end SPAKE2 exchange tests, matching the known-answer scenarios
//! from the protocol's testable-properties list: matching-credential
//! correctness across repeated runs, password/identity separation, and the
//! password-scalar-hack compatibility toggle.

use spake2_edwards25519::{Role, Spake2Config};

/// Surfaces the crate's `tracing` events (role/state transitions, decode
/// failures) on stderr when these tests run with `--nocapture`; harmless,
/// idempotent if a subscriber is already installed.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn exchange(
    alice_names: (&str, &str),
    bob_names: (&str, &str),
    password_a: &[u8],
    password_b: &[u8],
) -> ([u8; 64], [u8; 64]) {
    let mut alice = Spake2Config::new(Role::Alice, alice_names.0, alice_names.1).build();
    let mut bob = Spake2Config::new(Role::Bob, bob_names.0, bob_names.1).build();

    let msg_a = alice.generate_message(password_a).unwrap();
    let msg_b = bob.generate_message(password_b).unwrap();

    let key_a = alice.process_message(&msg_b).unwrap();
    let key_b = bob.process_message(&msg_a).unwrap();
    (key_a, key_b)
}

#[test]
fn twenty_runs_with_matching_credentials_agree() {
    init_tracing();
    for _ in 0..20 {
        let (key_a, key_b) = exchange(("alice", "bob"), ("alice", "bob"), b"password", b"password");
        assert_eq!(key_a, key_b);
    }
}

#[test]
fn wrong_password_completes_but_disagrees() {
    init_tracing();
    let (key_a, key_b) = exchange(("alice", "bob"), ("alice", "bob"), b"password", b"wrong password");
    assert_ne!(key_a, key_b);
}

#[test]
fn mismatched_identities_disagree() {
    init_tracing();
    let (key_a, key_b) = exchange(("alice", "bob"), ("alice", "eve"), b"password", b"password");
    assert_ne!(key_a, key_b);
}

#[test]
fn password_scalar_hack_toggle_matches_when_symmetric() {
    init_tracing();
    for _ in 0..20 {
        let mut alice = Spake2Config::new(Role::Alice, "alice", "bob")
            .disable_password_scalar_hack(true)
            .build();
        let mut bob = Spake2Config::new(Role::Bob, "alice", "bob")
            .disable_password_scalar_hack(true)
            .build();

        let msg_a = alice.generate_message(b"password").unwrap();
        let msg_b = bob.generate_message(b"password").unwrap();
        let key_a = alice.process_message(&msg_b).unwrap();
        let key_b = bob.process_message(&msg_a).unwrap();
        assert_eq!(key_a, key_b);
    }
}

#[test]
fn password_scalar_hack_toggle_mismatch_sometimes_disagrees() {
    init_tracing();
    let mut mismatches = 0;
    let trials = 64;
    for _ in 0..trials {
        let mut alice = Spake2Config::new(Role::Alice, "alice", "bob").build();
        let mut bob = Spake2Config::new(Role::Bob, "alice", "bob")
            .disable_password_scalar_hack(true)
            .build();

        let msg_a = alice.generate_message(b"password").unwrap();
        let msg_b = bob.generate_message(b"password").unwrap();
        let key_a = alice.process_message(&msg_b).unwrap();
        let key_b = bob.process_message(&msg_a).unwrap();
        if key_a != key_b {
            mismatches += 1;
        }
    }
    // Three bits of freedom in the hack's low-bit clearing give roughly a
    // 1/8 collision rate; assert some mismatches occur without pinning the
    // exact count to a single RNG draw.
    assert!(mismatches > 0, "expected at least one mismatch across {trials} trials");
}
