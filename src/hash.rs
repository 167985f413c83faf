/// Initial state words (the first four SHA-256 IV constants)
const INIT: [u32; 4] = [0x6A09E667, 0xBB67AE85, 0x3C6EF372, 0xA54FF53A];

/// Additive constant applied to the second word every step
const GOLDEN: u32 = 0x9E3779B9;

/// Rounds used when no explicit count is requested
pub const DEFAULT_ROUNDS: usize = 64;

/// Size of every hash output in bytes
pub const HASH_LEN: usize = 32;

/// Mixes `input` into a 32 byte digest by running `rounds` passes over it.
///
/// The input is zero padded to a multiple of 4 bytes and consumed as big endian words.
/// All arithmetic wraps modulo 2^32. This is a keystream generator, not a secure hash.
///
/// # Examples
/// ```rust
/// # use ntrs::hash::keystream_hash;
/// let a = keystream_hash(b"password", 64);
/// let b = keystream_hash(b"password", 64);
/// assert_eq!(a, b);
/// assert_ne!(a, keystream_hash(b"passwore", 64));
/// ```
pub fn keystream_hash(input: &[u8], rounds: usize) -> [u8; HASH_LEN] {
    let mut state = INIT;
    let mut padded = input.to_vec();
    padded.resize(input.len().next_multiple_of(4), 0);

    for _ in 0..rounds {
        for chunk in padded.chunks_exact(4) {
            let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            state[0] = state[0].rotate_left(7) ^ word;
            state[1] = state[0].wrapping_add(state[1]).wrapping_add(GOLDEN);
            state[2] = state[1].rotate_left(11) ^ state[3];
            state[3] = state[2].wrapping_add(state[0]);
            state.rotate_right(1);
        }
    }

    let mut out = [0u8; HASH_LEN];
    for (slot, word) in out.chunks_exact_mut(8).zip(state) {
        slot[..4].copy_from_slice(&word.to_be_bytes());
        slot[4..].copy_from_slice(&(!word).to_be_bytes());
    }
    out
}

/// Password derived key material driving every pseudo-random step of a session
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Seed([u8; HASH_LEN]);

impl Seed {
    pub fn from_password(password: &str) -> Self {
        Self(keystream_hash(password.as_bytes(), DEFAULT_ROUNDS))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LEN]> for Seed {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

// Never print key material
impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(..)")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_input_keeps_initial_state() {
        let out = keystream_hash(&[], 64);
        assert_eq!(&out[0..4], &0x6A09E667u32.to_be_bytes());
        assert_eq!(&out[4..8], &(!0x6A09E667u32).to_be_bytes());
        assert_eq!(&out[24..28], &0xA54FF53Au32.to_be_bytes());
    }

    #[test]
    fn single_step() {
        // One word of zeros, one round, worked by hand
        let s0 = 0x6A09E667u32.rotate_left(7);
        let s1 = s0.wrapping_add(0xBB67AE85).wrapping_add(GOLDEN);
        let s2 = s1.rotate_left(11) ^ 0xA54FF53A;
        let s3 = s2.wrapping_add(s0);
        let out = keystream_hash(&[0, 0, 0, 0], 1);
        let words: Vec<u32> = out
            .chunks_exact(8)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(words, vec![s3, s0, s1, s2]);
    }

    #[test]
    fn zero_padding() {
        assert_eq!(keystream_hash(b"abc", 16), keystream_hash(b"abc\0", 16));
    }

    #[test]
    fn complement_halves() {
        let out = keystream_hash(b"some input", 8);
        for pair in out.chunks_exact(8) {
            for i in 0..4 {
                assert_eq!(pair[i], !pair[i + 4]);
            }
        }
    }

    #[test]
    fn avalanche() {
        let a = keystream_hash(b"avalanche test", 64);
        let b = keystream_hash(b"avalanche tesu", 64);
        // Only the first half of each 8 byte pair is independent
        let flipped: u32 = a
            .chunks_exact(8)
            .zip(b.chunks_exact(8))
            .flat_map(|(x, y)| x[..4].iter().zip(&y[..4]).map(|(p, q)| (p ^ q).count_ones()))
            .sum();
        assert!(flipped > 24, "only {flipped} of 128 bits changed");
    }

    #[test]
    fn seed_from_password() {
        assert_eq!(Seed::from_password("pw1"), Seed::from_password("pw1"));
        assert_ne!(Seed::from_password("pw1"), Seed::from_password("pw2"));
        assert_eq!(format!("{:?}", Seed::from_password("pw1")), "Seed(..)");
        let raw = keystream_hash(b"pw1", DEFAULT_ROUNDS);
        assert_eq!(Seed::from(raw), Seed::from_password("pw1"));
        assert_eq!(Seed::from(raw).as_bytes(), &raw);
    }
}
