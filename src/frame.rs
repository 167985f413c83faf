use crate::{
    bits::{bits_to_bytes, bytes_to_bits},
    ecc::ReedSolomon,
    Error,
};

/// Bits in the outer stream length header
pub const OUTER_HEADER_BITS: usize = u32::BITS as usize;

/// Bytes in the inner payload bit length header
const INNER_HEADER_LEN: usize = 2;

/// Contents of a decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bit length of the compressed message
    pub total_bits: u16,
    /// Masked coordinate blob
    pub blob: Vec<u8>,
}

/// Builds the bitstream `[u32 stream length][FEC(u16 total_bits || blob)]`
///
/// # Examples
/// ```rust
/// # use std::error::Error;
/// # use ntrs::{ecc::ReedSolomon, frame::{self, Frame}};
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let rs = ReedSolomon::new(10);
/// let bits = frame::encode(40, &[1, 2, 3, 4], &rs);
/// assert_eq!(bits.len(), 32 + (2 + 4 + 10) * 8);
/// let decoded = frame::decode(&bits, &rs)?;
/// assert_eq!(decoded, Frame { total_bits: 40, blob: vec![1, 2, 3, 4] });
/// # Ok(())
/// # }
/// ```
pub fn encode(total_bits: u16, blob: &[u8], fec: &ReedSolomon) -> Vec<bool> {
    let mut payload = Vec::with_capacity(INNER_HEADER_LEN + blob.len());
    payload.extend_from_slice(&total_bits.to_be_bytes());
    payload.extend_from_slice(blob);

    let protected = bytes_to_bits(&fec.encode(&payload));
    let mut stream = bytes_to_bits(&(protected.len() as u32).to_be_bytes());
    stream.extend(protected);
    stream
}

/// Parses a bitstream produced by [`encode`], correcting it through `fec`
///
/// Bits past the end of the declared stream are ignored.
pub fn decode(bits: &[bool], fec: &ReedSolomon) -> Result<Frame, Error> {
    if bits.len() < OUTER_HEADER_BITS {
        return Err(Error::ImageTooSmall);
    }
    let (header, rest) = bits.split_at(OUTER_HEADER_BITS);
    let stream_len = header
        .iter()
        .fold(0usize, |acc, &bit| (acc << 1) | bit as usize);
    if rest.len() < stream_len {
        log::debug!(
            "stream declares {stream_len} bits but only {} are present",
            rest.len()
        );
        return Err(Error::DataTruncated);
    }

    let payload = fec.decode(&bits_to_bytes(&rest[..stream_len]))?;
    if payload.len() < INNER_HEADER_LEN {
        return Err(Error::DataDamaged);
    }
    let (header, blob) = payload.split_at(INNER_HEADER_LEN);
    Ok(Frame {
        total_bits: u16::from_be_bytes([header[0], header[1]]),
        blob: blob.to_vec(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn header_value(bits: &[bool]) -> u32 {
        bits[..32].iter().fold(0, |acc, &b| (acc << 1) | b as u32)
    }

    #[test]
    fn layout() {
        let rs = ReedSolomon::new(10);
        let bits = encode(0x0102, &[0xAA], &rs);
        assert_eq!(header_value(&bits) as usize, bits.len() - 32);
        let bytes = bits_to_bytes(&bits[32..]);
        assert_eq!(&bytes[..3], &[0x01, 0x02, 0xAA]);
        assert_eq!(bytes.len(), 3 + 10);
    }

    #[test]
    fn trailing_bits_ignored() {
        let rs = ReedSolomon::new(10);
        let mut bits = encode(8, &[7, 7], &rs);
        bits.extend(std::iter::repeat(false).take(500));
        assert_eq!(decode(&bits, &rs).unwrap().blob, vec![7, 7]);
    }

    #[test]
    fn too_small() {
        let rs = ReedSolomon::new(10);
        assert!(matches!(decode(&[true; 31], &rs), Err(Error::ImageTooSmall)));
    }

    #[test]
    fn truncated() {
        let rs = ReedSolomon::new(10);
        let bits = encode(16, &[1, 2, 3, 4], &rs);
        assert!(matches!(
            decode(&bits[..bits.len() - 1], &rs),
            Err(Error::DataTruncated)
        ));
    }

    #[test]
    fn payload_shorter_than_header() {
        let rs = ReedSolomon::new(10);
        let protected = bytes_to_bits(&rs.encode(&[0x05]));
        let mut bits = bytes_to_bits(&(protected.len() as u32).to_be_bytes());
        bits.extend(protected);
        assert!(matches!(decode(&bits, &rs), Err(Error::DataDamaged)));

        // A zero length stream carries no header at all
        assert!(matches!(decode(&[false; 32], &rs), Err(Error::DataDamaged)));
    }

    #[test]
    fn correctable_bit_flips() {
        let rs = ReedSolomon::new(10);
        let blob: Vec<u8> = (0..40).collect();
        let mut bits = encode(320, &blob, &rs);
        // One flipped bit in each of five different bytes
        for byte in [0, 7, 19, 33, 51] {
            let i = 32 + byte * 8 + 3;
            bits[i] = !bits[i];
        }
        let frame = decode(&bits, &rs).unwrap();
        assert_eq!(frame.total_bits, 320);
        assert_eq!(frame.blob, blob);
    }

    #[test]
    fn damaged() {
        let rs = ReedSolomon::new(10);
        let blob: Vec<u8> = (0..40).collect();
        let mut bits = encode(320, &blob, &rs);
        for byte in 0..12 {
            let i = 32 + byte * 8;
            bits[i] = !bits[i];
        }
        assert!(matches!(decode(&bits, &rs), Err(Error::DataDamaged)));
    }
}
