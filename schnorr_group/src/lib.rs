//! Arithmetic over a prime-order multiplicative subgroup of `Z_p*`, the
//! setting in which election trustee keys live. A group is described by a
//! prime modulus `p`, the prime order `q` of the subgroup and a generator
//! `g` with `g^q = 1 mod p`. Secret exponents are integers in `[0, q)`,
//! public values are subgroup elements mod `p`.

pub mod error;
pub mod group;
pub mod named;
pub mod transcript;

pub use error::GroupError;
pub use group::SchnorrGroup;
