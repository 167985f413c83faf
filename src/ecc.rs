//! Reed-Solomon error correction over GF(2^8).
//!
//! Primitive polynomial 0x11D, generator 2, first consecutive root 0, codewords of
//! at most 255 symbols. Payloads are split into chunks of `255 - ecc_len` bytes and
//! each chunk gets `ecc_len` parity bytes appended. On decode every 255 byte chunk
//! (the last may be shorter) is corrected independently.

use crate::Error;
use std::sync::OnceLock;

const PRIM_POLY: u16 = 0x11D;

/// Maximum codeword length
pub const BLOCK_LEN: usize = 255;

struct GfTables {
    exp: [u8; 512],
    log: [u8; 256],
}

fn build_gf_tables() -> GfTables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];

    let mut x: u16 = 1;
    for i in 0..255u16 {
        exp[i as usize] = x as u8;
        exp[(i + 255) as usize] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIM_POLY;
        }
    }
    exp[510] = exp[0];
    exp[511] = exp[1];

    GfTables { exp, log }
}

fn gf_tables() -> &'static GfTables {
    static TABLES: OnceLock<GfTables> = OnceLock::new();
    TABLES.get_or_init(build_gf_tables)
}

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = gf_tables();
    t.exp[t.log[a as usize] as usize + t.log[b as usize] as usize]
}

/// Multiplicative inverse, `a` must be non-zero
fn gf_inv(a: u8) -> u8 {
    debug_assert_ne!(a, 0);
    let t = gf_tables();
    t.exp[255 - t.log[a as usize] as usize]
}

/// alpha^-p
fn alpha_inv(p: usize) -> u8 {
    gf_tables().exp[(255 - p % 255) % 255]
}

/// Evaluate a polynomial stored highest degree first
fn poly_eval(poly: &[u8], x: u8) -> u8 {
    poly.iter().fold(0, |acc, &coeff| gf_mul(acc, x) ^ coeff)
}

/// Evaluate a polynomial stored lowest degree first
fn eval_asc(poly: &[u8], x: u8) -> u8 {
    let mut result = 0u8;
    let mut x_pow = 1u8;
    for &coeff in poly {
        result ^= gf_mul(coeff, x_pow);
        x_pow = gf_mul(x_pow, x);
    }
    result
}

fn poly_mul(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; a.len() + b.len() - 1];
    for (i, &ac) in a.iter().enumerate() {
        for (j, &bc) in b.iter().enumerate() {
            result[i + j] ^= gf_mul(ac, bc);
        }
    }
    result
}

/// g(x) = prod_{i=0}^{n-1} (x - alpha^i), highest degree first
fn generator_poly(ecc_len: usize) -> Vec<u8> {
    let t = gf_tables();
    (0..ecc_len).fold(vec![1u8], |g, i| poly_mul(&g, &[1, t.exp[i]]))
}

/// Berlekamp-Massey, returns the error locator lowest degree first
fn berlekamp_massey(syndromes: &[u8]) -> Vec<u8> {
    let n = syndromes.len();

    let mut c = vec![0u8; n + 1];
    c[0] = 1;
    let mut c_len = 1usize;

    let mut b = vec![0u8; n + 1];
    b[0] = 1;
    let mut b_len = 1usize;

    let mut ell = 0usize;
    let mut bval = 1u8;
    let mut m = 1usize;

    for r in 0..n {
        let mut delta = syndromes[r];
        for i in 1..c_len {
            delta ^= gf_mul(c[i], syndromes[r - i]);
        }

        if delta == 0 {
            m += 1;
            continue;
        }

        let factor = gf_mul(delta, gf_inv(bval));
        let old_c = (2 * ell <= r).then(|| (c.clone(), c_len));

        c_len = (b_len + m).max(c_len).min(n + 1);
        for j in 0..b_len.min(n + 1 - m) {
            c[j + m] ^= gf_mul(factor, b[j]);
        }

        match old_c {
            Some((prev, prev_len)) => {
                b = prev;
                b_len = prev_len;
                ell = r + 1 - ell;
                bval = delta;
                m = 1;
            }
            None => m += 1,
        }
    }

    // Trailing zero coefficients do not count towards the degree
    while c_len > 1 && c[c_len - 1] == 0 {
        c_len -= 1;
    }
    c.truncate(c_len);
    c
}

/// Chien search over a full 255 symbol block
///
/// Returns the array positions of the errors, or `None` if the locator does not
/// split into distinct roots.
fn chien_search(sigma: &[u8]) -> Option<Vec<usize>> {
    let found: Vec<usize> = (0..BLOCK_LEN)
        .filter(|&p| eval_asc(sigma, alpha_inv(p)) == 0)
        .map(|p| BLOCK_LEN - 1 - p)
        .collect();
    (found.len() == sigma.len() - 1).then_some(found)
}

/// Forney algorithm for first consecutive root 0: e = X * Omega(X^-1) / Sigma'(X^-1)
fn forney(sigma: &[u8], syndromes: &[u8], positions: &[usize]) -> Option<Vec<u8>> {
    let two_t = syndromes.len();

    let mut omega = vec![0u8; two_t];
    for (i, &s) in sigma.iter().enumerate().take(two_t) {
        for (j, &syn) in syndromes.iter().enumerate().take(two_t - i) {
            omega[i + j] ^= gf_mul(s, syn);
        }
    }

    // Formal derivative: only odd powers survive in characteristic 2
    let mut sigma_prime = vec![0u8; sigma.len().saturating_sub(1)];
    for i in (1..sigma.len()).step_by(2) {
        sigma_prime[i - 1] = sigma[i];
    }

    positions
        .iter()
        .map(|&pos| {
            let p = BLOCK_LEN - 1 - pos;
            let x = gf_tables().exp[p % 255];
            let x_inv = alpha_inv(p);
            let denom = eval_asc(&sigma_prime, x_inv);
            (denom != 0).then(|| gf_mul(x, gf_mul(eval_asc(&omega, x_inv), gf_inv(denom))))
        })
        .collect()
}

/// Systematic Reed-Solomon codec with a fixed number of parity bytes per block
#[derive(Debug, Clone)]
pub struct ReedSolomon {
    ecc_len: usize,
    generator: Vec<u8>,
}

impl ReedSolomon {
    /// Creates a codec appending `ecc_len` parity bytes per block
    ///
    /// `ecc_len` must lie in `1..255`.
    pub fn new(ecc_len: usize) -> Self {
        debug_assert!(0 < ecc_len && ecc_len < BLOCK_LEN);
        Self {
            ecc_len,
            generator: generator_poly(ecc_len),
        }
    }

    pub fn ecc_len(&self) -> usize {
        self.ecc_len
    }

    /// Number of symbol errors correctable in each block
    pub fn correctable(&self) -> usize {
        self.ecc_len / 2
    }

    /// Data bytes carried by one full block
    pub fn data_len(&self) -> usize {
        BLOCK_LEN - self.ecc_len
    }

    /// Length of `encode` output for `len` input bytes
    pub fn encoded_len(&self, len: usize) -> usize {
        len + len.div_ceil(self.data_len()) * self.ecc_len
    }

    fn encode_block(&self, data: &[u8], out: &mut Vec<u8>) {
        let mut shift_reg = vec![0u8; self.ecc_len];
        for &byte in data {
            let feedback = byte ^ shift_reg[0];
            for j in 0..self.ecc_len - 1 {
                shift_reg[j] = shift_reg[j + 1] ^ gf_mul(feedback, self.generator[j + 1]);
            }
            shift_reg[self.ecc_len - 1] = gf_mul(feedback, self.generator[self.ecc_len]);
        }
        out.extend_from_slice(data);
        out.extend_from_slice(&shift_reg);
    }

    /// Appends parity to every `255 - ecc_len` byte chunk of `data`
    ///
    /// # Examples
    /// ```rust
    /// # use ntrs::ecc::ReedSolomon;
    /// let rs = ReedSolomon::new(10);
    /// let mut encoded = rs.encode(b"hello world");
    /// assert_eq!(encoded.len(), 21);
    /// encoded[3] ^= 0xFF;
    /// assert_eq!(rs.decode(&encoded).unwrap(), b"hello world".to_vec());
    /// ```
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len(data.len()));
        for chunk in data.chunks(self.data_len()) {
            self.encode_block(chunk, &mut out);
        }
        out
    }

    fn syndromes(&self, block: &[u8]) -> Vec<u8> {
        let t = gf_tables();
        (0..self.ecc_len).map(|i| poly_eval(block, t.exp[i])).collect()
    }

    /// Corrects one block of at most 255 bytes, returning the data part
    fn decode_block(&self, received: &[u8]) -> Result<Vec<u8>, Error> {
        if received.len() <= self.ecc_len || received.len() > BLOCK_LEN {
            return Err(Error::DataDamaged);
        }
        let data_len = received.len() - self.ecc_len;

        // Shortened blocks are virtually zero padded at the front
        let padding = BLOCK_LEN - received.len();
        let mut full = vec![0u8; BLOCK_LEN];
        full[padding..].copy_from_slice(received);

        let syndromes = self.syndromes(&full);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(received[..data_len].to_vec());
        }

        let sigma = berlekamp_massey(&syndromes);
        if sigma.len() - 1 > self.correctable() {
            return Err(Error::DataDamaged);
        }
        let positions = chien_search(&sigma).ok_or(Error::DataDamaged)?;
        let magnitudes = forney(&sigma, &syndromes, &positions).ok_or(Error::DataDamaged)?;

        for (&pos, magnitude) in positions.iter().zip(magnitudes) {
            if pos < padding {
                return Err(Error::DataDamaged);
            }
            full[pos] ^= magnitude;
        }

        if self.syndromes(&full).iter().any(|&s| s != 0) {
            return Err(Error::DataDamaged);
        }
        log::debug!("corrected {} symbol errors", positions.len());
        Ok(full[padding..padding + data_len].to_vec())
    }

    /// Corrects and strips the parity from data produced by [`ReedSolomon::encode`]
    ///
    /// Fails with [`Error::DataDamaged`] if any block has more errors than
    /// [`ReedSolomon::correctable`] allows.
    pub fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(encoded.len());
        for block in encoded.chunks(BLOCK_LEN) {
            out.extend(self.decode_block(block)?);
        }
        Ok(out)
    }
}
