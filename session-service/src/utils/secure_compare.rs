use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Constant-time equality for shared secrets.
///
/// Both sides are reduced to SHA-256 digests first so the comparison runs over
/// fixed-length input and a length mismatch is indistinguishable from any other.
pub fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    let provided = Sha256::digest(provided);
    let expected = Sha256::digest(expected);
    provided.as_slice().ct_eq(expected.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs_match() {
        let key = b"f271c81ff7084ee5b99a5091b42d486e";
        assert!(constant_time_eq(key, key));
    }

    #[test]
    fn any_difference_fails() {
        let key = b"f271c81ff7084ee5b99a5091b42d486e";
        assert!(!constant_time_eq(b"f271c81ff7084ee5b99a5091b42d486f", key));
        assert!(!constant_time_eq(b"f271c81ff7084ee5", key));
        assert!(!constant_time_eq(b"", key));
    }
}
