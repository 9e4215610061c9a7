//! The SPAKE2 state machine: message generation, peer-message processing,
//! and the transcript-hash key derivation, built on the [`crate::group`] and
//! [`crate::curve`] layers below.

use crate::curve;
use crate::error::SpakeError;
use crate::group::{self, P3};
use crate::scalar::{self, Scalar32};
use crate::util;
use sha2::{Digest, Sha512};
use tracing::{debug, trace, warn};

/// Which side of the exchange this context plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Alice,
    Bob,
}

/// The context's lifecycle. Transitions are monotonic: `Init` →
/// `MsgGenerated` → `KeyGenerated`, with `Destroyed` reachable from any
/// state via [`Spake2Context::destroy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Init,
    MsgGenerated,
    KeyGenerated,
    Destroyed,
}

/// Construction parameters for a [`Spake2Context`], mirroring the role/name
/// fields a caller must supply plus the optional compatibility toggle.
#[derive(Clone, Debug)]
pub struct Spake2Config {
    role: Role,
    my_name: Vec<u8>,
    their_name: Vec<u8>,
    disable_password_scalar_hack: bool,
}

impl Spake2Config {
    pub fn new(role: Role, my_name: impl Into<Vec<u8>>, their_name: impl Into<Vec<u8>>) -> Self {
        Spake2Config {
            role,
            my_name: my_name.into(),
            their_name: their_name.into(),
            disable_password_scalar_hack: false,
        }
    }

    /// Disables the BoringSSL password-scalar compatibility workaround.
    /// Must be set identically on both peers to interoperate.
    pub fn disable_password_scalar_hack(mut self, disable: bool) -> Self {
        self.disable_password_scalar_hack = disable;
        self
    }

    pub fn build(self) -> Spake2Context {
        Spake2Context::new(self.role, self.my_name, self.their_name, self.disable_password_scalar_hack)
    }
}

/// A single SPAKE2 exchange. Not `Sync`/shareable across concurrent use —
/// the ephemeral private key and password scalar are mutated in place as
/// the state machine advances.
pub struct Spake2Context {
    role: Role,
    my_name: Vec<u8>,
    their_name: Vec<u8>,
    state: State,
    disable_password_scalar_hack: bool,

    private_key: Scalar32,
    my_msg: [u8; 32],
    password_scalar: Scalar32,
    password_hash: [u8; 64],
}

impl Spake2Context {
    /// Builds a context in [`State::Init`]. Use [`Spake2Config`] for the
    /// builder-style equivalent.
    pub fn new(role: Role, my_name: impl Into<Vec<u8>>, their_name: impl Into<Vec<u8>>, disable_password_scalar_hack: bool) -> Self {
        let my_name = my_name.into();
        let their_name = their_name.into();
        debug!(
            role = ?role,
            my_name_len = my_name.len(),
            their_name_len = their_name.len(),
            "spake2 context constructed"
        );
        Spake2Context {
            role,
            my_name,
            their_name,
            state: State::Init,
            disable_password_scalar_hack,
            private_key: Scalar32::zero(),
            my_msg: [0u8; 32],
            password_scalar: Scalar32::zero(),
            password_hash: [0u8; 64],
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Enables or disables the password-scalar hack. Must be called before
    /// [`Self::generate_message`]; has no effect afterward (the original
    /// BoringSSL contract calls this a setup-time toggle).
    pub fn set_disable_password_scalar_hack(&mut self, disable: bool) {
        self.disable_password_scalar_hack = disable;
    }

    /// Draws the ephemeral private key, derives the password scalar, and
    /// returns this party's 32-byte outgoing message.
    pub fn generate_message(&mut self, password: &[u8]) -> Result<[u8; 32], SpakeError> {
        if self.state != State::Init {
            warn!(state = ?self.state, "generate_message called outside Init");
            return Err(SpakeError::InvalidState("generate_message requires State::Init"));
        }

        let random = util::random_bytes(64);
        let mut random_buf = [0u8; 64];
        random_buf.copy_from_slice(&random);
        let reduced = scalar::reduce_wide(&random_buf);
        self.private_key = Scalar32(reduced).shl_small(3);

        let p = group::scalar_mult_fixed_base(curve::base_table(), &self.private_key.0);

        let mut hasher = Sha512::new();
        hasher.update(password);
        let digest: [u8; 64] = hasher.finalize().into();
        self.password_hash = digest;

        let mut ps_bytes = [0u8; 32];
        ps_bytes.copy_from_slice(&scalar::reduce_wide(&self.password_hash));
        self.password_scalar = Scalar32(ps_bytes);

        if !self.disable_password_scalar_hack {
            self.apply_password_scalar_hack();
        }

        let mask_table = match self.role {
            Role::Alice => curve::m_table(),
            Role::Bob => curve::n_table(),
        };
        let mask = group::scalar_mult_small_table(mask_table, &self.password_scalar.0);

        let combined = group::p1p1_to_p3(&group::add(&p, &mask.to_cached()));
        self.my_msg = combined.compress();
        self.state = State::MsgGenerated;
        trace!(state = ?self.state, "generate_message succeeded");
        Ok(self.my_msg)
    }

    /// BoringSSL historically omitted the ×8 cofactor clear on the
    /// password scalar; this adds multiples of ℓ so the low three bits of
    /// byte 0 end up zero, without ever reducing mod ℓ.
    fn apply_password_scalar_hack(&mut self) {
        let ell = scalar::ell();
        let mut acc = self.password_scalar;
        let mut multiple = ell;
        for bit in 0..3u32 {
            let mask: u32 = if acc.byte0_bit(bit) { 0xffff_ffff } else { 0 };
            let candidate = acc.add(&multiple);
            // cmov keeps its first operand where the mask bit is set, so the
            // candidate goes first to select it when the tested bit is 1.
            acc = candidate.cmov(&acc, mask);
            multiple = multiple.dbl();
        }
        self.password_scalar = acc;
    }

    /// Decodes the peer's message, completes the Diffie-Hellman step, and
    /// returns the 64-byte derived key.
    pub fn process_message(&mut self, their_msg: &[u8]) -> Result<[u8; 64], SpakeError> {
        if self.state != State::MsgGenerated {
            warn!(state = ?self.state, "process_message called outside MsgGenerated");
            return Err(SpakeError::InvalidState("process_message requires State::MsgGenerated"));
        }
        if their_msg.len() != 32 {
            return Err(SpakeError::InvalidArgument("peer message must be 32 bytes"));
        }
        let mut their_msg_bytes = [0u8; 32];
        their_msg_bytes.copy_from_slice(their_msg);

        let decoded = match P3::from_bytes_negate_vartime(&their_msg_bytes) {
            Some(p) => p,
            None => {
                warn!("peer message failed to decode to a curve point");
                return Err(SpakeError::InvalidPoint);
            }
        };

        let peer_mask_table = match self.role {
            Role::Alice => curve::n_table(),
            Role::Bob => curve::m_table(),
        };
        let peer_mask = group::scalar_mult_small_table(peer_mask_table, &self.password_scalar.0);

        let q_ext = group::p1p1_to_p3(&group::sub(&decoded, &peer_mask.to_cached()));
        let dh_point = group::scalar_mult_variable_base(&q_ext, &self.private_key.0);
        let dh = dh_point.compress();

        let key = self.transcript_hash(&their_msg_bytes, &dh);
        self.state = State::KeyGenerated;
        trace!(state = ?self.state, "process_message succeeded");
        Ok(key)
    }

    fn transcript_hash(&self, their_msg: &[u8; 32], dh: &[u8; 32]) -> [u8; 64] {
        let mut buf = Vec::new();
        match self.role {
            Role::Alice => {
                util::append_length_prefixed(&mut buf, &self.my_name);
                util::append_length_prefixed(&mut buf, &self.their_name);
                util::append_length_prefixed(&mut buf, &self.my_msg);
                util::append_length_prefixed(&mut buf, their_msg);
            }
            Role::Bob => {
                util::append_length_prefixed(&mut buf, &self.their_name);
                util::append_length_prefixed(&mut buf, &self.my_name);
                util::append_length_prefixed(&mut buf, their_msg);
                util::append_length_prefixed(&mut buf, &self.my_msg);
            }
        }
        util::append_length_prefixed(&mut buf, dh);
        util::append_length_prefixed(&mut buf, &self.password_hash);

        let digest: [u8; 64] = Sha512::digest(&buf).into();
        digest
    }

    /// Zero-fills sensitive state and transitions to [`State::Destroyed`].
    /// Any further operation on this context fails.
    pub fn destroy(&mut self) {
        self.private_key = Scalar32::zero();
        self.my_msg = [0u8; 32];
        self.password_scalar = Scalar32::zero();
        self.password_hash = [0u8; 64];
        self.state = State::Destroyed;
        debug!("spake2 context destroyed");
    }
}

impl std::fmt::Debug for Spake2Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spake2Context")
            .field("role", &self.role)
            .field("state", &self.state)
            .field("my_name_len", &self.my_name.len())
            .field("their_name_len", &self.their_name.len())
            .field("disable_password_scalar_hack", &self.disable_password_scalar_hack)
            .finish()
    }
}

impl Drop for Spake2Context {
    fn drop(&mut self) {
        if self.state != State::Destroyed {
            self.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_exchange(
        password_a: &[u8],
        password_b: &[u8],
        disable_hack_a: bool,
        disable_hack_b: bool,
    ) -> Result<([u8; 64], [u8; 64]), SpakeError> {
        let mut alice = Spake2Config::new(Role::Alice, "alice", "bob")
            .disable_password_scalar_hack(disable_hack_a)
            .build();
        let mut bob = Spake2Config::new(Role::Bob, "alice", "bob")
            .disable_password_scalar_hack(disable_hack_b)
            .build();

        let msg_a = alice.generate_message(password_a)?;
        let msg_b = bob.generate_message(password_b)?;

        let key_a = alice.process_message(&msg_b)?;
        let key_b = bob.process_message(&msg_a)?;
        Ok((key_a, key_b))
    }

    #[test]
    fn matching_password_and_identity_yields_equal_keys() {
        for _ in 0..20 {
            let (key_a, key_b) = run_exchange(b"password", b"password", false, false).unwrap();
            assert_eq!(key_a, key_b);
        }
    }

    #[test]
    fn mismatched_password_yields_different_keys() {
        let (key_a, key_b) = run_exchange(b"password", b"wrong password", false, false).unwrap();
        assert_ne!(key_a, key_b);
    }

    #[test]
    fn both_sides_disabling_hack_still_agree() {
        for _ in 0..20 {
            let (key_a, key_b) = run_exchange(b"password", b"password", true, true).unwrap();
            assert_eq!(key_a, key_b);
        }
    }

    #[test]
    fn corrupted_message_never_reproduces_the_key() {
        let mut alice = Spake2Config::new(Role::Alice, "alice", "bob").build();
        let mut bob_reference = Spake2Config::new(Role::Bob, "alice", "bob").build();

        let msg_a = alice.generate_message(b"password").unwrap();
        let msg_b = bob_reference.generate_message(b"password").unwrap();
        let key_a = alice.process_message(&msg_b).unwrap();

        for bit in 0..256u32 {
            let byte = (bit / 8) as usize;
            let bitpos = bit % 8;
            let mut corrupted = msg_a;
            corrupted[byte] ^= 1 << bitpos;

            let mut bob = Spake2Config::new(Role::Bob, "alice", "bob").build();
            let _ = bob.generate_message(b"password").unwrap();
            match bob.process_message(&corrupted) {
                Err(SpakeError::InvalidPoint) => {}
                Ok(bob_key) => assert_ne!(bob_key, key_a, "bit {bit} silently reproduced the key"),
                Err(other) => panic!("unexpected error for bit {bit}: {other:?}"),
            }
        }
    }

    #[test]
    fn state_machine_rejects_out_of_order_calls() {
        let mut ctx = Spake2Config::new(Role::Alice, "alice", "bob").build();
        assert_eq!(
            ctx.process_message(&[0u8; 32]),
            Err(SpakeError::InvalidState("process_message requires State::MsgGenerated"))
        );
        ctx.generate_message(b"password").unwrap();
        ctx.destroy();
        assert_eq!(ctx.state(), State::Destroyed);
        assert!(ctx.process_message(&[0u8; 32]).is_err());
    }

    #[test]
    fn process_message_rejects_wrong_length() {
        let mut ctx = Spake2Config::new(Role::Alice, "alice", "bob").build();
        ctx.generate_message(b"password").unwrap();
        assert_eq!(
            ctx.process_message(&[0u8; 31]),
            Err(SpakeError::InvalidArgument("peer message must be 32 bytes"))
        );
    }
}
