use crate::Error;

/// Expands `data` into its bits, most significant bit of each byte first
pub fn bytes_to_bits(data: &[u8]) -> Vec<bool> {
    let mut out = Vec::with_capacity(data.len() * u8::BITS as usize);
    for byte in data {
        for shift in (0..u8::BITS).rev() {
            out.push((byte >> shift) & 1 == 1);
        }
    }
    out
}

/// Packs `bits` into bytes, most significant bit first
///
/// A trailing partial byte is padded with zero bits on the right.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(u8::BITS as usize)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit as u8) << (7 - i)))
        })
        .collect()
}

/// Lists the positions of every set bit in `data`
///
/// # Arguments
///
/// * `data` - The bytes to scan, read most significant bit first
/// # Returns
/// The ascending set bit positions and the total number of bits scanned
/// # Examples
/// ```rust
/// # use ntrs::bits::extract;
/// let (coords, total) = extract(&[0b1000_0001, 0b0100_0000]);
/// assert_eq!(coords, vec![0, 7, 9]);
/// assert_eq!(total, 16);
/// ```
pub fn extract(data: &[u8]) -> (Vec<usize>, usize) {
    let coords = bytes_to_bits(data)
        .into_iter()
        .enumerate()
        .filter_map(|(i, bit)| bit.then_some(i))
        .collect();
    (coords, data.len() * u8::BITS as usize)
}

/// Rebuilds the bytes whose set bits are `coords` within a `total_bits` long bitstring
///
/// # Arguments
/// * `coords` - The set bit positions, in any order
/// * `total_bits` - The length of the bitstring
/// # Returns
/// `ceil(total_bits / 8)` bytes, or an error if a coordinate lies past the end
/// # Examples
/// ```rust
/// # use std::error::Error;
/// # use ntrs::bits::{extract, reconstruct};
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let data = b"Hello World";
/// let (coords, total) = extract(data);
/// assert_eq!(reconstruct(&coords, total)?, data.to_vec());
/// # Ok(())
/// # }
/// ```
pub fn reconstruct(coords: &[usize], total_bits: usize) -> Result<Vec<u8>, Error> {
    let mut bits = vec![false; total_bits];
    for &coord in coords {
        match bits.get_mut(coord) {
            Some(bit) => *bit = true,
            None => {
                return Err(Error::CoordinateOutOfRange {
                    coord,
                    total: total_bits,
                })
            }
        }
    }
    Ok(bits_to_bytes(&bits))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn msb_first() {
        let msg = "Hi"; // 0b01001000 0b01101001
        let bits: String = bytes_to_bits(msg.as_bytes())
            .into_iter()
            .map(|b| if b { '1' } else { '0' })
            .collect();
        assert_eq!(bits, "0100100001101001");
    }

    #[test]
    fn pack_pads_right() {
        assert_eq!(bits_to_bytes(&[true, false, true]), vec![0b1010_0000]);
        assert_eq!(bits_to_bytes(&[]), Vec::<u8>::new());
    }

    #[test]
    fn extract_hi() {
        let (coords, total) = extract(b"Hi");
        assert_eq!(coords, vec![1, 4, 9, 10, 12, 15]);
        assert_eq!(total, 16);
    }

    #[test]
    fn all_zero_payload() {
        let (coords, total) = extract(&[0, 0, 0]);
        assert!(coords.is_empty());
        assert_eq!(reconstruct(&coords, total).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn order_independent() {
        let (mut coords, total) = extract(b"shuffled");
        coords.reverse();
        assert_eq!(reconstruct(&coords, total).unwrap(), b"shuffled".to_vec());
    }

    #[test]
    fn partial_byte_length() {
        assert_eq!(reconstruct(&[0, 9], 10).unwrap(), vec![0b1000_0000, 0b0100_0000]);
    }

    #[test]
    fn out_of_range() {
        assert!(matches!(
            reconstruct(&[3, 16], 16),
            Err(Error::CoordinateOutOfRange { coord: 16, total: 16 })
        ));
    }
}
