use digest::Digest;
use num_bigint::BigUint;
use rand::RngCore;
use schnorr_group::SchnorrGroup;
use schnorr_proofs::{KeyPair, ProofOfKnowledge};
use serde::{Deserialize, Serialize};

/// Public half of a trustee key together with a proof that the trustee
/// knows the matching secret. Published on the bulletin board; verified by
/// the server and by auditors before being trusted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrusteePublicKey {
    pub public_key: BigUint,
    pub pok: ProofOfKnowledge,
}

impl TrusteePublicKey {
    pub fn verify<D: Digest>(&self, group: &SchnorrGroup) -> bool {
        self.pok.verify::<D>(group, &self.public_key)
    }
}

/// Non-threshold path: one trustee, one key, no sharing. The keypair is
/// returned to the caller for safekeeping; only the public part is ever
/// published.
pub fn generate<R: RngCore, D: Digest>(
    rng: &mut R,
    group: &SchnorrGroup,
) -> (TrusteePublicKey, KeyPair) {
    let keypair = KeyPair::generate(rng, group);
    let pok = ProofOfKnowledge::prove::<R, D>(rng, group, &keypair);
    let public = TrusteePublicKey {
        public_key: keypair.public().clone(),
        pok,
    };
    (public, keypair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;
    use rand::{rngs::StdRng, SeedableRng};
    use sha2::Sha256;

    #[test]
    fn generated_key_verifies() {
        let group = SchnorrGroup::named("BELENIOS-2048").unwrap();
        let mut rng = StdRng::seed_from_u64(0u64);
        let (public, keypair) = generate::<_, Sha256>(&mut rng, &group);
        assert_eq!(&public.public_key, keypair.public());
        assert!(public.verify::<Sha256>(&group));

        let mut bad = public.clone();
        bad.public_key = group.mul(&bad.public_key, group.g());
        assert!(!bad.verify::<Sha256>(&group));
    }

    #[test]
    fn serde_round_trip() {
        let group = SchnorrGroup::named("BELENIOS-2048").unwrap();
        let mut rng = StdRng::seed_from_u64(0u64);
        let (public, _) = generate::<_, Sha256>(&mut rng, &group);
        let json = serde_json::to_string(&public).unwrap();
        let back: TrusteePublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(public, back);
        assert!(back.verify::<Sha256>(&group));
        assert!(BigUint::one() < back.public_key);
    }
}
