use crate::{
    chaos::permutation_indices,
    hash::{keystream_hash, Seed, DEFAULT_ROUNDS},
};

/// Appended to the seed before deriving the mask stream
const MASK_SALT: &[u8] = b"NTRS_SALT";

/// Rounds per hash when expanding the mask stream
const MASK_ROUNDS: usize = 8;

/// Produces `len` bytes of mask keystream for `seed`
pub fn mask_stream(seed: &Seed, len: usize) -> Vec<u8> {
    let mut salted = seed.as_bytes().to_vec();
    salted.extend_from_slice(MASK_SALT);
    let mut current = keystream_hash(&salted, DEFAULT_ROUNDS);

    let mut mask = Vec::with_capacity(len.next_multiple_of(current.len()));
    while mask.len() < len {
        current = keystream_hash(&current, MASK_ROUNDS);
        mask.extend_from_slice(&current);
    }
    mask.truncate(len);
    mask
}

fn apply_mask(data: &mut [u8], seed: &Seed) {
    let mask = mask_stream(seed, data.len());
    for (byte, key) in data.iter_mut().zip(mask) {
        *byte ^= key;
    }
}

/// Shuffles `coords` with the chaos permutation, serialises each as a big endian `u16`,
/// and masks the result with the keystream.
///
/// # Examples
/// ```rust
/// # use ntrs::{cipher::{encrypt, decrypt}, hash::Seed};
/// let seed = Seed::from_password("pw");
/// let blob = encrypt(&[3, 500, 9000], &seed);
/// assert_eq!(blob.len(), 6);
/// let mut coords = decrypt(&blob, &seed);
/// coords.sort();
/// assert_eq!(coords, vec![3, 500, 9000]);
/// ```
pub fn encrypt(coords: &[u16], seed: &Seed) -> Vec<u8> {
    let mut packed: Vec<u8> = permutation_indices(coords.len(), seed.as_bytes())
        .into_iter()
        .flat_map(|i| coords[i].to_be_bytes())
        .collect();
    apply_mask(&mut packed, seed);
    packed
}

/// Unmasks `data` and splits it back into coordinates.
///
/// The coordinates stay in shuffled order; reconstruction does not depend on it.
/// A trailing odd byte is dropped.
pub fn decrypt(data: &[u8], seed: &Seed) -> Vec<u16> {
    let mut unmasked = data.to_vec();
    apply_mask(&mut unmasked, seed);
    unmasked
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mask_prefix_stable() {
        let seed = Seed::from_password("pw");
        let long = mask_stream(&seed, 100);
        assert_eq!(long.len(), 100);
        assert_eq!(&long[..33], mask_stream(&seed, 33).as_slice());
        assert!(mask_stream(&seed, 0).is_empty());
    }

    #[test]
    fn blob_is_masked_and_shuffled() {
        let seed = Seed::from_password("pw");
        let coords: Vec<u16> = (0..64).collect();
        let blob = encrypt(&coords, &seed);
        let plain: Vec<u8> = coords.iter().flat_map(|c| c.to_be_bytes()).collect();
        assert_ne!(blob, plain);

        let shuffled = decrypt(&blob, &seed);
        assert_ne!(shuffled, coords);
        let expected: Vec<u16> = permutation_indices(64, seed.as_bytes())
            .into_iter()
            .map(|i| coords[i])
            .collect();
        assert_eq!(shuffled, expected);
    }

    #[test]
    fn odd_trailing_byte_dropped() {
        let seed = Seed::from_password("pw");
        let mut blob = encrypt(&[1, 2], &seed);
        blob.push(0xAB);
        let mut coords = decrypt(&blob, &seed);
        coords.sort();
        assert_eq!(coords, vec![1, 2]);
    }

    #[test]
    fn wrong_seed() {
        let blob = encrypt(&[10, 20, 30], &Seed::from_password("right"));
        let mut coords = decrypt(&blob, &Seed::from_password("wrong"));
        coords.sort();
        assert_ne!(coords, vec![10, 20, 30]);
    }

    #[test]
    fn largest_payload_roundtrip() {
        // 8191 noisy bytes: 65528 bits, the most a 16-bit coordinate can address
        let mut state = 0x2545_F491u32;
        let data: Vec<u8> = (0..8191)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        let (coords, total) = crate::bits::extract(&data);
        assert_eq!(total, 65528);
        assert!(coords.len() > 30_000);

        let seed = Seed::from_password("limit");
        let narrow: Vec<u16> = coords.iter().map(|&c| c as u16).collect();
        let blob = encrypt(&narrow, &seed);
        assert_eq!(blob.len(), 2 * coords.len());

        let restored: Vec<usize> = decrypt(&blob, &seed).into_iter().map(usize::from).collect();
        assert_eq!(crate::bits::reconstruct(&restored, total).unwrap(), data);
    }

    #[test]
    fn empty() {
        let seed = Seed::from_password("pw");
        assert!(encrypt(&[], &seed).is_empty());
        assert!(decrypt(&[], &seed).is_empty());
    }
}
