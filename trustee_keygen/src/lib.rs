//! Key generation for election trustees over a Schnorr group, following the
//! Belenios trustee model. Two paths produce key material:
//!
//! - single trustee: one keypair with a proof of knowledge of the secret,
//! - Pedersen threshold: `n` trustees run Feldman verifiable secret sharing
//!   over an append-only bulletin board, each ending up with an additive
//!   share of a joint secret no single party ever holds.
//!
//! All artifacts that reach the bulletin board are public: commitments,
//! proofs, signed messages and sealed (encrypted) channel payloads. Secret
//! values stay inside [`schnorr_proofs::KeyPair`] or sealed channels.

/// Position of a trustee in the election setup.
pub type TrusteeId = u16;

macro_rules! iter {
    ($v: expr) => {{
        #[cfg(feature = "parallel")]
        let it = $v.par_iter();
        #[cfg(not(feature = "parallel"))]
        let it = $v.iter();
        it
    }};
}

pub mod aggregate;
pub mod bundle;
pub mod channel;
pub mod error;
pub mod identity;
pub mod pedersen;
pub mod single;
pub mod verification;

pub use aggregate::aggregate;
pub use bundle::{
    ElectionBundle, PedersenMember, PedersenTrusteeModel, SingleTrusteeModel, TrusteeKind,
};
pub use channel::{ChannelMessage, SignedMessage, Transcribe};
pub use error::KeygenError;
pub use identity::{CertPayload, IdentityKeys, Seed};
pub use pedersen::{Coefexps, Polynomial};
pub use single::TrusteePublicKey;
pub use verification::{verify_voutput, SenderInput, VInput, VOutput, VerifiedShares};
