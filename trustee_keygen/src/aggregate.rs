//! Election public-key aggregation from public bulletin-board state.

use digest::Digest;
use num_bigint::BigUint;
use num_traits::One;

use crate::{
    bundle::{ElectionBundle, TrusteeKind},
    error::KeygenError,
};

/// Multiplies every trustee group's public contribution into the election
/// public key: the trustee key itself on the single path, the constant-term
/// commitment `A[0]` of each member on the Pedersen path. Proofs and
/// signatures are re-checked so the result only ever derives from verified
/// artifacts. Touches public data only and is idempotent, so any auditor
/// can re-derive the key from the bulletin board.
pub fn aggregate<D: Digest>(bundle: &ElectionBundle) -> Result<BigUint, KeygenError> {
    let group = bundle.group();
    let mut key = BigUint::one();
    for kind in bundle.trustee_kinds() {
        match kind {
            TrusteeKind::Single(single) => {
                if !single.key.verify::<D>(group) {
                    return Err(KeygenError::InvalidProofOfKnowledge);
                }
                key = group.mul(&key, &single.key.public_key);
            }
            TrusteeKind::Pedersen(model) => {
                for member in model.members() {
                    let polynomial = bundle
                        .polynomial(member.trustee_id)
                        .ok_or(KeygenError::MissingPolynomial(member.trustee_id))?;
                    polynomial
                        .coefexps
                        .verify::<D>(group, &member.cert.payload.verification_key)?;
                    let constant = polynomial
                        .coefexps
                        .payload
                        .constant_term()
                        .ok_or(KeygenError::ThresholdMismatch)?;
                    key = group.mul(&key, constant);
                }
            }
        }
    }
    Ok(key)
}
