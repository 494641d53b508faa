use digest::Digest;
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{error::GroupError, transcript};

/// A multiplicative subgroup of `Z_p*` of prime order `q`, generated by `g`.
///
/// Construction checks the structural relations (`g^q = 1 mod p`, ranges);
/// primality of `p` and `q` is the responsibility of whoever supplies the
/// parameters, normally one of the [named](crate::named) production groups
/// or a test fixture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrGroup {
    p: BigUint,
    q: BigUint,
    g: BigUint,
}

impl SchnorrGroup {
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self, GroupError> {
        let one = BigUint::one();
        // q > 3 keeps the scalar sampling range [1, q-2] non-empty
        if p <= one || q <= BigUint::from(3u32) || q >= p || g <= one || g >= p {
            return Err(GroupError::InvalidGroupParameters);
        }
        if g.modpow(&q, &p) != one {
            return Err(GroupError::InvalidGroupParameters);
        }
        Ok(Self { p, q, g })
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// `base^exp mod p`. `BigUint::modpow` uses a fixed-window ladder but is
    /// not guaranteed constant-time with respect to the exponent; this is
    /// the closest available approximation of the constant-time goal.
    pub fn pow(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        base.modpow(exp, &self.p)
    }

    /// `g^exp mod p`
    pub fn gpow(&self, exp: &BigUint) -> BigUint {
        self.g.modpow(exp, &self.p)
    }

    /// `a * b mod p`
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    /// Membership check for the order-`q` subgroup: `0 < x < p` and
    /// `x^q = 1 mod p`.
    pub fn check_element(&self, x: &BigUint) -> Result<(), GroupError> {
        if x.is_zero() || x >= &self.p {
            return Err(GroupError::InvalidGroupElement);
        }
        if x.modpow(&self.q, &self.p) != BigUint::one() {
            return Err(GroupError::InvalidGroupElement);
        }
        Ok(())
    }

    pub fn check_scalar(&self, x: &BigUint) -> Result<(), GroupError> {
        if x >= &self.q {
            return Err(GroupError::ScalarOutOfRange);
        }
        Ok(())
    }

    /// Uniform sample in `[1, q-2]`.
    pub fn random_scalar<R: RngCore>(&self, rng: &mut R) -> BigUint {
        let bound = &self.q - 2u32;
        rng.gen_biguint_below(&bound) + 1u32
    }

    /// Digest of `bytes` reduced mod `q`, as used for Fiat-Shamir challenges.
    pub fn hash_to_scalar<D: Digest>(&self, bytes: &[u8]) -> BigUint {
        BigUint::from_bytes_be(&D::digest(bytes)) % &self.q
    }

    /// Deterministic non-zero scalar from a seed under a domain-separation
    /// prefix. A zero digest would produce a degenerate key, so the input is
    /// extended and rehashed until the result is non-zero (try-and-increment).
    pub fn scalar_from_seed<D: Digest>(&self, domain: &[u8], seed: &[u8]) -> BigUint {
        let mut input = Vec::with_capacity(domain.len() + seed.len());
        input.extend_from_slice(domain);
        input.extend_from_slice(seed);
        loop {
            let s = self.hash_to_scalar::<D>(&input);
            if !s.is_zero() {
                return s;
            }
            input.extend_from_slice(b"|retry");
        }
    }

    /// `a + b mod q`
    pub fn scalar_add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.q
    }

    /// `a - b mod q` for already-reduced `a` and `b`
    pub fn scalar_sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        ((a + &self.q) - b) % &self.q
    }

    /// `a * b mod q`
    pub fn scalar_mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.q
    }

    /// Appends `p || q || g` to a challenge transcript.
    pub fn append_to_transcript(&self, out: &mut Vec<u8>) {
        transcript::append_scalar(out, &self.p);
        transcript::append_scalar(out, &self.q);
        transcript::append_scalar(out, &self.g);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blake2::Blake2b512;
    use rand::{rngs::StdRng, SeedableRng};
    use sha2::Sha256;

    fn toy_group() -> SchnorrGroup {
        // 4 generates the order-11 subgroup of Z_23*
        SchnorrGroup::new(
            BigUint::from(23u32),
            BigUint::from(11u32),
            BigUint::from(4u32),
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_parameters() {
        // 5^11 mod 23 != 1, so 5 does not generate the order-11 subgroup
        assert_eq!(
            SchnorrGroup::new(
                BigUint::from(23u32),
                BigUint::from(11u32),
                BigUint::from(5u32)
            ),
            Err(GroupError::InvalidGroupParameters)
        );
        assert_eq!(
            SchnorrGroup::new(
                BigUint::from(11u32),
                BigUint::from(23u32),
                BigUint::from(4u32)
            ),
            Err(GroupError::InvalidGroupParameters)
        );
        // Subgroups of order 2 or 3 are structurally valid but leave no
        // room for scalar sampling
        assert_eq!(
            SchnorrGroup::new(
                BigUint::from(3u32),
                BigUint::from(2u32),
                BigUint::from(2u32)
            ),
            Err(GroupError::InvalidGroupParameters)
        );
        assert_eq!(
            SchnorrGroup::new(
                BigUint::from(7u32),
                BigUint::from(3u32),
                BigUint::from(2u32)
            ),
            Err(GroupError::InvalidGroupParameters)
        );
    }

    #[test]
    fn element_and_scalar_checks() {
        let group = toy_group();
        for exp in 0u32..11 {
            assert!(group.check_element(&group.gpow(&BigUint::from(exp))).is_ok());
        }
        // 5 is not in the subgroup generated by 4
        assert_eq!(
            group.check_element(&BigUint::from(5u32)),
            Err(GroupError::InvalidGroupElement)
        );
        assert_eq!(
            group.check_element(&BigUint::zero()),
            Err(GroupError::InvalidGroupElement)
        );
        assert_eq!(
            group.check_element(&BigUint::from(23u32)),
            Err(GroupError::InvalidGroupElement)
        );
        assert!(group.check_scalar(&BigUint::from(10u32)).is_ok());
        assert_eq!(
            group.check_scalar(&BigUint::from(11u32)),
            Err(GroupError::ScalarOutOfRange)
        );
    }

    #[test]
    fn random_scalar_stays_in_range() {
        let group = toy_group();
        let mut rng = StdRng::seed_from_u64(0u64);
        for _ in 0..200 {
            let s = group.random_scalar(&mut rng);
            assert!(s >= BigUint::one());
            assert!(s <= BigUint::from(9u32));
        }
    }

    #[test]
    fn hash_to_scalar_is_reduced_and_deterministic() {
        let group = toy_group();
        let a = group.hash_to_scalar::<Sha256>(b"transcript");
        let b = group.hash_to_scalar::<Sha256>(b"transcript");
        assert_eq!(a, b);
        assert!(a < BigUint::from(11u32));
        // A different digest gives an independent value
        let c = group.hash_to_scalar::<Blake2b512>(b"transcript");
        assert!(c < BigUint::from(11u32));
    }

    #[test]
    fn scalar_from_seed_is_never_zero() {
        let group = toy_group();
        // With q = 11 roughly one seed in eleven hashes to zero; enough
        // attempts to exercise the retry path.
        for i in 0..100u32 {
            let s = group.scalar_from_seed::<Sha256>(b"sk|", format!("seed-{i}").as_bytes());
            assert!(!s.is_zero());
            assert!(s < BigUint::from(11u32));
        }
    }

    #[test]
    fn modular_ops() {
        let group = toy_group();
        assert_eq!(group.gpow(&BigUint::from(11u32)), BigUint::one());
        assert_eq!(
            group.mul(&BigUint::from(20u32), &BigUint::from(20u32)),
            BigUint::from(9u32)
        );
        assert_eq!(
            group.scalar_sub(&BigUint::from(3u32), &BigUint::from(7u32)),
            BigUint::from(7u32)
        );
    }

    #[test]
    fn serde_round_trip() {
        let group = toy_group();
        let json = serde_json::to_string(&group).unwrap();
        let back: SchnorrGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(group, back);
    }
}
