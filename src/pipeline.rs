use crate::{
    bits, cipher, compression, disk,
    ecc::{ReedSolomon, BLOCK_LEN},
    frame::{self, OUTER_HEADER_BITS},
    hash::Seed,
    image::{self, AlphaMap},
    Error,
};
use std::path::Path;

/// Largest compressed payload, in bits, that the 16-bit headers can describe
pub const MAX_PAYLOAD_BITS: usize = u16::MAX as usize;

/// Tunable parameters of a [`Codec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Reed-Solomon parity bytes per block
    pub ecc_len: usize,
    /// zlib level, 0-9
    pub compression_level: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ecc_len: 10,
            compression_level: 6,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.ecc_len == 0 || self.ecc_len >= BLOCK_LEN {
            return Err(Error::Config(format!(
                "ecc length must be in 1..{BLOCK_LEN}, got {}",
                self.ecc_len
            )));
        }
        if self.compression_level > 9 {
            return Err(Error::Config(format!(
                "compression level must be in 0..=9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}

/// Set bit positions of `compressed` and its bit length, both as 16-bit values
fn payload_coordinates(compressed: &[u8]) -> Result<(Vec<u16>, u16), Error> {
    let (coords, total_bits) = bits::extract(compressed);
    let Ok(total) = u16::try_from(total_bits) else {
        return Err(Error::MessageTooLarge {
            bits: total_bits,
            max: MAX_PAYLOAD_BITS,
        });
    };
    // Every coordinate is below total_bits, which fits in 16 bits
    Ok((coords.into_iter().map(|c| c as u16).collect(), total))
}

/// Hides text in, and recovers it from, circular alpha images under one password
///
/// # Examples
/// ```rust
/// # use std::error::Error;
/// # use ntrs::Codec;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let codec = Codec::new("pw1");
/// let map = codec.encode_map("hello")?;
/// assert_eq!(codec.decode_map(&map)?, "hello");
/// assert!(Codec::new("pw2").decode_map(&map).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Codec {
    seed: Seed,
    config: Config,
    fec: ReedSolomon,
}

impl Codec {
    /// Creates a codec with the default [`Config`]
    pub fn new(password: &str) -> Self {
        let config = Config::default();
        Self {
            seed: Seed::from_password(password),
            fec: ReedSolomon::new(config.ecc_len),
            config,
        }
    }

    pub fn with_config(password: &str, config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            seed: Seed::from_password(password),
            fec: ReedSolomon::new(config.ecc_len),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the bitstream carrying `text`
    pub fn encode_bits(&self, text: &str) -> Result<Vec<bool>, Error> {
        let compressed = compression::compress(text.as_bytes(), self.config.compression_level)?;
        let (coords, total_bits) = payload_coordinates(&compressed)?;
        log::debug!(
            "{} bytes compressed to {} bytes, {} set bits",
            text.len(),
            compressed.len(),
            coords.len()
        );
        let blob = cipher::encrypt(&coords, &self.seed);
        Ok(frame::encode(total_bits, &blob, &self.fec))
    }

    /// Recovers the text from a bitstream produced by [`Codec::encode_bits`]
    pub fn decode_bits(&self, bits: &[bool]) -> Result<String, Error> {
        let frame = frame::decode(bits, &self.fec)?;
        let coords: Vec<usize> = cipher::decrypt(&frame.blob, &self.seed)
            .into_iter()
            .map(usize::from)
            .collect();
        log::debug!(
            "frame holds {} coordinates over {} bits",
            coords.len(),
            frame.total_bits
        );
        let compressed = bits::reconstruct(&coords, frame.total_bits as usize)?;
        let text = compression::decompress(&compressed)?;
        Ok(String::from_utf8(text)?)
    }

    /// Renders `text` onto a new alpha map
    pub fn encode_map(&self, text: &str) -> Result<AlphaMap, Error> {
        Ok(disk::render(&self.encode_bits(text)?))
    }

    pub fn decode_map(&self, map: &AlphaMap) -> Result<String, Error> {
        let bits = disk::scan(map)?;
        if !map.is_complete() {
            return Err(if bits.len() < OUTER_HEADER_BITS {
                Error::ImageTooSmall
            } else {
                Error::DataTruncated
            });
        }
        self.decode_bits(&bits)
    }

    /// Hides `text` in a new PNG at `path`
    pub fn encode(&self, text: &str, path: impl AsRef<Path>) -> Result<(), Error> {
        let map = self.encode_map(text)?;
        log::debug!("writing {}x{} image", map.width(), map.height());
        image::write(&map, path)
    }

    /// Recovers the text hidden in the PNG at `path`
    pub fn decode(&self, path: impl AsRef<Path>) -> Result<String, Error> {
        self.decode_map(&image::read(path)?)
    }

    /// Like [`Codec::decode`] but reports failures as an `Error: ...` string
    pub fn decode_message(&self, path: impl AsRef<Path>) -> String {
        self.decode(path).unwrap_or_else(|err| format!("Error: {err}"))
    }
}
