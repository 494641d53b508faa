//! Length-prefixed byte encoding shared by challenge computations, channel
//! signatures and sealed payloads. Every field is prefixed with its length
//! as a 4-byte big-endian integer so that concatenations are unambiguous.

use num_bigint::BigUint;

pub fn append_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

pub fn append_scalar(out: &mut Vec<u8>, x: &BigUint) {
    append_bytes(out, &x.to_bytes_be());
}

pub fn append_scalars(out: &mut Vec<u8>, xs: &[BigUint]) {
    out.extend_from_slice(&(xs.len() as u32).to_be_bytes());
    for x in xs {
        append_scalar(out, x);
    }
}

/// Inverse of [`append_scalar`]; `at` is advanced past the field.
pub fn read_scalar(bytes: &[u8], at: &mut usize) -> Option<BigUint> {
    let len = read_len(bytes, at)?;
    if bytes.len().checked_sub(*at)? < len {
        return None;
    }
    let x = BigUint::from_bytes_be(&bytes[*at..*at + len]);
    *at += len;
    Some(x)
}

/// Inverse of [`append_scalars`].
pub fn read_scalars(bytes: &[u8], at: &mut usize) -> Option<Vec<BigUint>> {
    let count = read_len(bytes, at)?;
    // Each scalar takes at least its 4-byte length prefix
    if bytes.len().checked_sub(*at)? < count.checked_mul(4)? {
        return None;
    }
    let mut xs = Vec::with_capacity(count);
    for _ in 0..count {
        xs.push(read_scalar(bytes, at)?);
    }
    Some(xs)
}

fn read_len(bytes: &[u8], at: &mut usize) -> Option<usize> {
    if bytes.len().checked_sub(*at)? < 4 {
        return None;
    }
    let mut len = [0u8; 4];
    len.copy_from_slice(&bytes[*at..*at + 4]);
    *at += 4;
    Some(u32::from_be_bytes(len) as usize)
}
