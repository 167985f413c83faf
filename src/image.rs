//! PNG persistence of the alpha plane.

use crate::Error;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

/// Alpha channel of an image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMap {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
    complete: bool,
}

impl AlphaMap {
    pub fn new(width: u32, height: u32, alpha: Vec<u8>) -> Self {
        debug_assert_eq!(alpha.len(), width as usize * height as usize);
        Self {
            width,
            height,
            alpha,
            complete: true,
        }
    }

    /// A fully transparent square of the given side
    pub fn transparent(side: u32) -> Self {
        Self::new(side, side, vec![0; side as usize * side as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether every row was present in the source image
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of leading rows that hold pixel data
    pub fn rows(&self) -> u32 {
        match self.width {
            0 => self.height,
            width => (self.alpha.len() / width as usize) as u32,
        }
    }

    fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.width as usize + col as usize
    }

    /// Alpha at `(row, col)`, 0 for rows missing from the source image
    pub fn get(&self, row: u32, col: u32) -> u8 {
        self.alpha.get(self.index(row, col)).copied().unwrap_or(0)
    }

    pub fn set(&mut self, row: u32, col: u32, alpha: u8) {
        let index = self.index(row, col);
        if let Some(slot) = self.alpha.get_mut(index) {
            *slot = alpha;
        }
    }
}

/// Writes `map` as an 8-bit RGBA PNG with black colour channels
pub fn encode_png<W: Write>(map: &AlphaMap, w: W) -> Result<(), Error> {
    let mut encoder = png::Encoder::new(w, map.width, map.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Best);
    let mut writer = encoder.write_header()?;
    let data: Vec<u8> = map.alpha.iter().flat_map(|&a| [0, 0, 0, a]).collect();
    writer.write_image_data(&data)?;
    writer.finish()?;
    Ok(())
}

/// Reads the alpha plane of a PNG
///
/// Images without an alpha channel read as fully opaque. If the pixel data ends
/// early only the rows read so far are kept and the map is marked incomplete.
/// Storage grows with the decoded rows, never with the dimensions in the header.
pub fn decode_png<R: Read>(r: R) -> Result<AlphaMap, Error> {
    let mut decoder = png::Decoder::new(r);
    decoder
        .set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let (width, height, interlaced) = {
        let info = reader.info();
        (info.width, info.height, info.interlaced)
    };
    let (color, _) = reader.output_color_type();
    let samples = color.samples();
    let alpha_of = |pixel: &[u8]| match color {
        png::ColorType::Rgba | png::ColorType::GrayscaleAlpha => pixel[samples - 1],
        _ => u8::MAX,
    };

    let mut alpha = Vec::new();
    let mut complete = true;

    if interlaced {
        let mut buf = vec![0; reader.output_buffer_size()];
        match reader.next_frame(&mut buf) {
            Ok(frame) => alpha.extend(
                buf[..frame.buffer_size()]
                    .chunks_exact(samples)
                    .map(&alpha_of),
            ),
            Err(err) => {
                log::warn!("image data unreadable: {err}");
                complete = false;
            }
        }
    } else {
        loop {
            match reader.next_row() {
                Ok(Some(row)) => {
                    alpha.extend(row.data().chunks_exact(samples).map(&alpha_of))
                }
                Ok(None) => break,
                Err(err) => {
                    log::warn!(
                        "image data ends after {} rows: {err}",
                        alpha.len() / width.max(1) as usize
                    );
                    complete = false;
                    break;
                }
            }
        }
    }

    let total = width as usize * height as usize;
    if alpha.len() < total {
        complete = false;
    }
    // Whole rows only, so get() stays aligned
    alpha.truncate(alpha.len().min(total) / width.max(1) as usize * width as usize);
    Ok(AlphaMap {
        width,
        height,
        alpha,
        complete,
    })
}

pub fn write(map: &AlphaMap, path: impl AsRef<Path>) -> Result<(), Error> {
    let mut file = BufWriter::new(File::create(path)?);
    encode_png(map, &mut file)?;
    file.flush()?;
    Ok(())
}

pub fn read(path: impl AsRef<Path>) -> Result<AlphaMap, Error> {
    let file = File::open(path)?;
    decode_png(BufReader::new(file))
}
