//! Schnorr proof of knowledge of a discrete log and Schnorr signatures over
//! a prime-order subgroup of `Z_p*`, with non-interactive challenges derived
//! through Fiat-Shamir. Both protocols share the same keypair shape: a
//! secret exponent in `[1, q)` and the public element `g^secret mod p`.

pub mod keypair;
pub mod pok;
pub mod signature;

pub use keypair::KeyPair;
pub use pok::ProofOfKnowledge;
pub use signature::Signature;
