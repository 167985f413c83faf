use crate::hash::{keystream_hash, HASH_LEN};

/// Rounds per hash when expanding the chaos buffer
const CHAOS_ROUNDS: usize = 16;

/// Derives a permutation of `[0, count)` from `seed`.
///
/// The seed is expanded by chained hashing into `count` little endian `u32` keys,
/// and the result is the stable argsort of those keys.
///
/// # Examples
/// ```rust
/// # use ntrs::chaos::permutation_indices;
/// let mut perm = permutation_indices(10, b"seed");
/// perm.sort();
/// assert_eq!(perm, (0..10).collect::<Vec<_>>());
/// ```
pub fn permutation_indices(count: usize, seed: &[u8]) -> Vec<usize> {
    let needed = count * 4;
    let rounds = needed.div_ceil(HASH_LEN) + 1;

    let mut buffer = Vec::with_capacity(rounds * HASH_LEN);
    let mut current = seed.to_vec();
    for _ in 0..rounds {
        let next = keystream_hash(&current, CHAOS_ROUNDS);
        buffer.extend_from_slice(&next);
        current = next.to_vec();
    }

    let keys: Vec<u32> = buffer[..needed]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let mut indices: Vec<usize> = (0..count).collect();
    indices.sort_by_key(|&i| keys[i]);
    indices
}
