use digest::Digest;
use num_bigint::BigUint;
use rand::RngCore;
use schnorr_group::{transcript, SchnorrGroup};
use serde::{Deserialize, Serialize};

use crate::keypair::KeyPair;

/// Non-interactive proof of knowledge of the discrete log of a public
/// element, produced with the Fiat-Shamir transform. Only the challenge and
/// response are published; the verifier recomputes the commitment as
/// `g^response * public^challenge` and recomputes the challenge from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfKnowledge {
    pub challenge: BigUint,
    pub response: BigUint,
}

impl ProofOfKnowledge {
    pub fn prove<R: RngCore, D: Digest>(
        rng: &mut R,
        group: &SchnorrGroup,
        keypair: &KeyPair,
    ) -> Self {
        let w = group.random_scalar(rng);
        let commitment = group.gpow(&w);
        let challenge = challenge::<D>(group, keypair.public(), &commitment);
        let response = group.scalar_sub(&w, &group.scalar_mul(&challenge, keypair.private()));
        Self {
            challenge,
            response,
        }
    }

    pub fn verify<D: Digest>(&self, group: &SchnorrGroup, public: &BigUint) -> bool {
        if group.check_element(public).is_err()
            || group.check_scalar(&self.challenge).is_err()
            || group.check_scalar(&self.response).is_err()
        {
            return false;
        }
        let commitment = group.mul(
            &group.gpow(&self.response),
            &group.pow(public, &self.challenge),
        );
        challenge::<D>(group, public, &commitment) == self.challenge
    }
}

fn challenge<D: Digest>(
    group: &SchnorrGroup,
    public: &BigUint,
    commitment: &BigUint,
) -> BigUint {
    let mut bytes = Vec::new();
    transcript::append_bytes(&mut bytes, b"pok|");
    group.append_to_transcript(&mut bytes);
    transcript::append_scalar(&mut bytes, public);
    transcript::append_scalar(&mut bytes, commitment);
    group.hash_to_scalar::<D>(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blake2::Blake2b512;
    use num_traits::One;
    use rand::{rngs::StdRng, SeedableRng};
    use sha2::Sha256;

    // Negative tests need a group where a forged challenge cannot collide
    // with the recomputed one by chance, so they run on the 2048-bit group.
    fn group() -> SchnorrGroup {
        SchnorrGroup::named("BELENIOS-2048").unwrap()
    }

    #[test]
    fn prove_and_verify() {
        let group = group();
        let mut rng = StdRng::seed_from_u64(0u64);
        let keypair = KeyPair::generate(&mut rng, &group);
        let proof = ProofOfKnowledge::prove::<_, Sha256>(&mut rng, &group, &keypair);
        assert!(proof.verify::<Sha256>(&group, keypair.public()));
        // Hash choice is part of the challenge
        assert!(!proof.verify::<Blake2b512>(&group, keypair.public()));

        let proof = ProofOfKnowledge::prove::<_, Blake2b512>(&mut rng, &group, &keypair);
        assert!(proof.verify::<Blake2b512>(&group, keypair.public()));
    }

    #[test]
    fn tampered_proof_is_rejected() {
        let group = group();
        let mut rng = StdRng::seed_from_u64(0u64);
        let keypair = KeyPair::generate(&mut rng, &group);
        let proof = ProofOfKnowledge::prove::<_, Sha256>(&mut rng, &group, &keypair);

        let mut bad = proof.clone();
        bad.response ^= BigUint::one();
        assert!(!bad.verify::<Sha256>(&group, keypair.public()));

        let mut bad = proof.clone();
        bad.challenge ^= BigUint::one();
        assert!(!bad.verify::<Sha256>(&group, keypair.public()));

        // Proof does not transfer to another public element
        let other = KeyPair::generate(&mut rng, &group);
        assert!(!proof.verify::<Sha256>(&group, other.public()));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let group = group();
        let mut rng = StdRng::seed_from_u64(0u64);
        let keypair = KeyPair::generate(&mut rng, &group);
        let proof = ProofOfKnowledge::prove::<_, Sha256>(&mut rng, &group, &keypair);

        let mut bad = proof.clone();
        bad.response += group.q();
        assert!(!bad.verify::<Sha256>(&group, keypair.public()));
        // p - 1 has order 2, not q
        assert!(!proof.verify::<Sha256>(&group, &(group.p() - 1u32)));
    }

    #[test]
    fn serde_round_trip() {
        let group = group();
        let mut rng = StdRng::seed_from_u64(0u64);
        let keypair = KeyPair::generate(&mut rng, &group);
        let proof = ProofOfKnowledge::prove::<_, Sha256>(&mut rng, &group, &keypair);
        let json = serde_json::to_string(&proof).unwrap();
        let back: ProofOfKnowledge = serde_json::from_str(&json).unwrap();
        assert_eq!(proof, back);
        assert!(back.verify::<Sha256>(&group, keypair.public()));
    }
}
