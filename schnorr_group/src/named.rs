//! Registry of named production group parameters.

use num_bigint::BigUint;

use crate::{error::GroupError, group::SchnorrGroup};

/// 2048-bit MODP safe prime from RFC 3526, section 3.
const MODP_2048_P_HEX: &[u8] = b"FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

impl SchnorrGroup {
    /// Looks up well-known group parameters by name.
    ///
    /// `BELENIOS-2048` (alias `RFC3526-2048`) is the 2048-bit MODP safe
    /// prime `p` with `q = (p - 1) / 2` and generator `g = 4`. As a square,
    /// 4 generates the order-`q` subgroup of quadratic residues.
    pub fn named(name: &str) -> Result<Self, GroupError> {
        match name {
            "BELENIOS-2048" | "RFC3526-2048" => {
                let p = BigUint::parse_bytes(MODP_2048_P_HEX, 16)
                    .ok_or(GroupError::InvalidGroupParameters)?;
                let q = (&p - 1u32) >> 1;
                Self::new(p, q, BigUint::from(4u32))
            }
            _ => Err(GroupError::UnknownGroup(name.to_string())),
        }
    }
}
