use schnorr_group::GroupError;

use crate::TrusteeId;

/// Every variant is terminal for the key-generation run it occurs in.
/// Retrying with the same seed or polynomial after a detected fault would
/// reuse one-shot commitments, so recovery always means a fresh run with
/// fresh key material, decided by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeygenError {
    Group(GroupError),
    /// Signature did not verify under the expected verification key
    SignatureInvalid,
    /// Ciphertext failed authenticated decryption
    DecryptionFailed,
    /// Key derivation or symmetric encryption failed internally
    SymmetricCipher,
    /// Trustee is not part of the Pedersen trustee set
    TrusteeIdNotFound(TrusteeId),
    /// Feldman check or channel opening failed for this sender's share
    ShareVerificationFailed { sender: TrusteeId },
    /// Number of coefficients or shares disagrees with the threshold
    ThresholdMismatch,
    /// Trustee already published a polynomial
    DuplicatePolynomial(TrusteeId),
    /// Trustee id already registered in the bundle
    DuplicateTrusteeId(TrusteeId),
    InvalidProofOfKnowledge,
    /// No polynomial published for this trustee yet
    MissingPolynomial(TrusteeId),
    /// Decrypted payload does not decode as the expected shape
    MalformedPayload,
    /// Bundle has no Pedersen trustee set
    NoPedersenTrustees,
    /// Published trustee public key disagrees with the commitments
    InconsistentTrusteePublicKey,
}

impl From<GroupError> for KeygenError {
    fn from(e: GroupError) -> Self {
        Self::Group(e)
    }
}
