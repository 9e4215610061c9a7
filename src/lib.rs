//! SPAKE2 password-authenticated key exchange over edwards25519, wire-compatible
//! with the BoringSSL reference implementation.
//!
//! The crate is layered bottom-up: [`field`] (prime-field arithmetic mod
//! `2^255 - 19`), [`scalar`] (arithmetic mod the group order ℓ), [`group`]
//! (point arithmetic in four coordinate systems plus scalar multiplication),
//! [`curve`] (the standard base point and the SPAKE2 mask points M/N), and
//! finally [`spake2`], the protocol state machine most callers want.
//!
//! ```no_run
//! use spake2_edwards25519::{Role, Spake2Config};
//!
//! let mut alice = Spake2Config::new(Role::Alice, "alice", "bob").build();
//! let mut bob = Spake2Config::new(Role::Bob, "alice", "bob").build();
//!
//! let msg_a = alice.generate_message(b"password").unwrap();
//! let msg_b = bob.generate_message(b"password").unwrap();
//!
//! let key_a = alice.process_message(&msg_b).unwrap();
//! let key_b = bob.process_message(&msg_a).unwrap();
//! assert_eq!(key_a, key_b);
//! ```

pub mod curve;
pub mod error;
pub mod field;
pub mod group;
pub mod scalar;
pub mod spake2;
pub mod util;

pub use error::SpakeError;
pub use spake2::{Role, Spake2Config, Spake2Context, State};
