//! Hides text in the alpha channel of a circular dot image.
//!
//! The text is compressed, its set bit positions are shuffled and masked with a
//! password-derived keystream, the result is framed with Reed-Solomon parity, and
//! every bit of the frame becomes one pixel of a disk.

pub mod bits;
pub mod chaos;
pub mod cipher;
pub mod compression;
pub mod disk;
pub mod ecc;
pub mod frame;
pub mod hash;
pub mod image;
pub mod pipeline;

pub use image::AlphaMap;
pub use pipeline::{Codec, Config};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Image too small.")]
    ImageTooSmall,
    #[error("Data truncated.")]
    DataTruncated,
    #[error("Data damaged.")]
    DataDamaged,
    #[error("Decompression failed: {0}")]
    Decompression(#[source] std::io::Error),
    #[error("Message too large: payload is {bits} bits, but at most {max} bits fit.")]
    MessageTooLarge { bits: usize, max: usize },
    #[error("Coordinate {coord} is outside the {total} bit payload.")]
    CoordinateOutOfRange { coord: usize, total: usize },
    #[error("Decoded text is not valid UTF-8: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),
    #[error("Image is not square: {width}x{height}.")]
    NotSquare { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Image decoding failed: {0}")]
    Decode(#[from] png::DecodingError),
    #[error("Image encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of decode failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    ImageTooSmall,
    DataTruncated,
    DataDamaged,
    Decompression,
    Generic,
}

impl Error {
    pub fn class(&self) -> FailureClass {
        match self {
            Error::ImageTooSmall => FailureClass::ImageTooSmall,
            Error::DataTruncated => FailureClass::DataTruncated,
            Error::DataDamaged => FailureClass::DataDamaged,
            Error::Decompression(_) => FailureClass::Decompression,
            _ => FailureClass::Generic,
        }
    }
}
