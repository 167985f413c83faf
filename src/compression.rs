//! zlib compression of the message before it is scattered into coordinates.

use crate::Error;
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use std::io::{Read, Write};

/// Compresses `data` into a zlib stream at `level` (0-9)
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>, Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflates a zlib stream produced by [`compress`]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(Error::Decompression)?;
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(20);
        let packed = compress(text.as_bytes(), 6).unwrap();
        assert!(packed.len() < text.len());
        assert_eq!(decompress(&packed).unwrap(), text.as_bytes());
    }

    #[test]
    fn zlib_header() {
        let packed = compress(b"hello", 6).unwrap();
        assert_eq!(packed[0], 0x78);
    }

    #[test]
    fn garbage_fails() {
        assert!(matches!(
            decompress(&[0x12, 0x34, 0x56, 0x78]),
            Err(Error::Decompression(_))
        ));
    }
}
