use digest::Digest;
use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;
use schnorr_group::{GroupError, SchnorrGroup};

/// A secret exponent together with its public element `g^secret mod p`.
///
/// Deliberately not serializable and without a `Debug` impl so the secret
/// cannot leak through logging or accidental persistence. The secret is
/// overwritten with zero on drop.
#[derive(Clone)]
pub struct KeyPair {
    public: BigUint,
    private: BigUint,
}

impl KeyPair {
    pub fn generate<R: RngCore>(rng: &mut R, group: &SchnorrGroup) -> Self {
        let private = group.random_scalar(rng);
        let public = group.gpow(&private);
        Self { public, private }
    }

    /// Rebuilds the pair from a known secret. Zero is accepted: an additive
    /// share can legitimately sum to zero mod `q`.
    pub fn from_private(group: &SchnorrGroup, private: BigUint) -> Result<Self, GroupError> {
        group.check_scalar(&private)?;
        let public = group.gpow(&private);
        Ok(Self { public, private })
    }

    /// Deterministic pair from a seed under a domain-separation prefix. The
    /// derived secret is guaranteed non-zero and reduced mod `q`.
    pub fn from_seed<D: Digest>(group: &SchnorrGroup, domain: &[u8], seed: &[u8]) -> Self {
        let private = group.scalar_from_seed::<D>(domain, seed);
        let public = group.gpow(&private);
        Self { public, private }
    }

    pub fn public(&self) -> &BigUint {
        &self.public
    }

    pub fn private(&self) -> &BigUint {
        &self.private
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.private = BigUint::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;
    use rand::{rngs::StdRng, SeedableRng};

    fn toy_group() -> SchnorrGroup {
        SchnorrGroup::new(
            BigUint::from(23u32),
            BigUint::from(11u32),
            BigUint::from(4u32),
        )
        .unwrap()
    }

    #[test]
    fn generate_and_rebuild() {
        let group = toy_group();
        let mut rng = StdRng::seed_from_u64(0u64);
        let keypair = KeyPair::generate(&mut rng, &group);
        assert_eq!(keypair.public(), &group.gpow(keypair.private()));

        let rebuilt = KeyPair::from_private(&group, keypair.private().clone()).unwrap();
        assert_eq!(rebuilt.public(), keypair.public());
    }

    #[test]
    fn from_private_rejects_out_of_range() {
        let group = toy_group();
        assert!(matches!(
            KeyPair::from_private(&group, BigUint::from(11u32)),
            Err(GroupError::ScalarOutOfRange)
        ));
        // Zero maps to the identity element
        let zero = KeyPair::from_private(&group, BigUint::zero()).unwrap();
        assert_eq!(zero.public(), &BigUint::one());
        assert!(KeyPair::from_private(&group, BigUint::one()).is_ok());
    }

    #[test]
    fn from_seed_is_deterministic() {
        use sha2::Sha256;
        let group = toy_group();
        let a = KeyPair::from_seed::<Sha256>(&group, b"sk|", b"seed");
        let b = KeyPair::from_seed::<Sha256>(&group, b"sk|", b"seed");
        assert_eq!(a.private(), b.private());
        assert_eq!(a.public(), b.public());
        // Different domain prefixes give independent keys
        let c = KeyPair::from_seed::<Sha256>(&group, b"vk|", b"seed");
        assert_ne!(a.private(), c.private());
    }
}
