use criterion::{criterion_group, criterion_main, Criterion};
use spake2_edwards25519::{Role, Spake2Config};

fn full_exchange(c: &mut Criterion) {
    c.bench_function("spake2 generate_message + process_message round trip", |b| {
        b.iter(|| {
            let mut alice = Spake2Config::new(Role::Alice, "alice", "bob").build();
            let mut bob = Spake2Config::new(Role::Bob, "alice", "bob").build();

            let msg_a = alice.generate_message(b"password").unwrap();
            let msg_b = bob.generate_message(b"password").unwrap();

            let key_a = alice.process_message(&msg_b).unwrap();
            let key_b = bob.process_message(&msg_a).unwrap();
            assert_eq!(key_a, key_b);
        })
    });
}

fn generate_message_only(c: &mut Criterion) {
    c.bench_function("spake2 generate_message", |b| {
        b.iter(|| {
            let mut alice = Spake2Config::new(Role::Alice, "alice", "bob").build();
            alice.generate_message(b"password").unwrap();
        })
    });
}

criterion_group!(benches, full_exchange, generate_message_only);
criterion_main!(benches);
