//! Streaming 128-bit message digest (MD5-compatible).
//!
//! # Overview
//!
//! [`Md5`] is an incremental digest engine with no I/O of its own. Input is
//! absorbed through [`Md5::update`] in arbitrary chunks and consumed in
//! 64-byte blocks; at most one partial block is buffered between calls, so
//! hashing a multi-gigabyte file needs only the caller's read buffer plus 64
//! bytes of state.
//!
//! The engine is a two-state machine, `Open → Finalized`. Once
//! [`Md5::finalize`] has run, further updates are rejected with
//! [`DigestError::Finalized`].
//!
//! The digest is used for equality testing only. No collision resistance is
//! claimed.
//!
//! # Example
//!
//! ```
//! use seekfs::digest::Md5;
//!
//! let mut md5 = Md5::new();
//! md5.update(b"hello ").unwrap();
//! md5.update(b"world").unwrap();
//! let digest = md5.finalize().unwrap();
//!
//! assert_eq!(digest.to_hex(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
//! assert_eq!(digest, Md5::digest(b"hello world"));
//! ```

use std::fmt;

/// Size of one transform block in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Size of the finished digest in bytes.
pub const DIGEST_SIZE: usize = 16;

const INITIAL_STATE: [u32; 4] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476];

/// Per-round left-rotation amounts.
const S: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, //
    5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, //
    4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, //
    6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

/// Per-round additive constants, `floor(abs(sin(i + 1)) * 2^32)`.
const K: [u32; 64] = [
    0xd76a_a478, 0xe8c7_b756, 0x2420_70db, 0xc1bd_ceee, 0xf57c_0faf, 0x4787_c62a, 0xa830_4613,
    0xfd46_9501, 0x6980_98d8, 0x8b44_f7af, 0xffff_5bb1, 0x895c_d7be, 0x6b90_1122, 0xfd98_7193,
    0xa679_438e, 0x49b4_0821, 0xf61e_2562, 0xc040_b340, 0x265e_5a51, 0xe9b6_c7aa, 0xd62f_105d,
    0x0244_1453, 0xd8a1_e681, 0xe7d3_fbc8, 0x21e1_cde6, 0xc337_07d6, 0xf4d5_0d87, 0x455a_14ed,
    0xa9e3_e905, 0xfcef_a3f8, 0x676f_02d9, 0x8d2a_4c8a, 0xfffa_3942, 0x8771_f681, 0x6d9d_6122,
    0xfde5_380c, 0xa4be_ea44, 0x4bde_cfa9, 0xf6bb_4b60, 0xbebf_bc70, 0x289b_7ec6, 0xeaa1_27fa,
    0xd4ef_3085, 0x0488_1d05, 0xd9d4_d039, 0xe6db_99e5, 0x1fa2_7cf8, 0xc4ac_5665, 0xf429_2244,
    0x432a_ff97, 0xab94_23a7, 0xfc93_a039, 0x655b_59c3, 0x8f0c_cc92, 0xffef_f47d, 0x8584_5dd1,
    0x6fa8_7e4f, 0xfe2c_e6e0, 0xa301_4314, 0x4e08_11a1, 0xf753_7e82, 0xbd3a_f235, 0x2ad7_d2bb,
    0xeb86_d391,
];

/// Marker byte followed by zeros; padding is at most one block long.
const PADDING: [u8; BLOCK_SIZE] = {
    let mut padding = [0u8; BLOCK_SIZE];
    padding[0] = 0x80;
    padding
};

/// Errors raised by the digest state machine.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestError {
    /// `update` was called after the digest had been finalized.
    #[error("digest already finalized; no further input accepted")]
    Finalized,
}

/// Lifecycle of a digest computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DigestStatus {
    Open,
    Finalized(Digest),
}

/// A finished 16-byte digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Digest as 32 lowercase hexadecimal characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; DIGEST_SIZE]> for Digest {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

/// Incremental MD5 engine.
///
/// Owned by exactly one hashing operation. It is `Send` so a worker thread may
/// own one, but it is never shared.
#[derive(Debug, Clone)]
pub struct Md5 {
    /// Running hash state (A, B, C, D)
    state: [u32; 4],
    /// Unprocessed tail of the input
    buffer: [u8; BLOCK_SIZE],
    /// Number of valid bytes in `buffer`
    buffered: usize,
    /// Total message length in bits, modulo 2^64
    length_bits: u64,
    status: DigestStatus,
}

impl Default for Md5 {
    fn default() -> Self {
        Self::new()
    }
}

impl Md5 {
    /// Create an engine in the `Open` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: INITIAL_STATE,
            buffer: [0; BLOCK_SIZE],
            buffered: 0,
            length_bits: 0,
            status: DigestStatus::Open,
        }
    }

    /// Digest a complete byte slice in one call.
    #[must_use]
    pub fn digest(data: &[u8]) -> Digest {
        let mut md5 = Self::new();
        md5.absorb(data);
        md5.length_bits = (data.len() as u64).wrapping_mul(8);
        md5.finish()
    }

    /// Whether [`finalize`](Self::finalize) has already run.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        matches!(self.status, DigestStatus::Finalized(_))
    }

    /// Feed more input.
    ///
    /// May be called any number of times with chunks of any length; the
    /// result depends only on the concatenation of all chunks.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Finalized`] if the engine was already finalized.
    pub fn update(&mut self, data: &[u8]) -> Result<(), DigestError> {
        if self.is_finalized() {
            return Err(DigestError::Finalized);
        }
        self.length_bits = self
            .length_bits
            .wrapping_add((data.len() as u64).wrapping_mul(8));
        self.absorb(data);
        Ok(())
    }

    /// Pad the message, run the last block(s) and return the digest.
    ///
    /// Calling this again returns the same digest.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` keeps the signature symmetric with
    /// [`update`](Self::update).
    pub fn finalize(&mut self) -> Result<Digest, DigestError> {
        if let DigestStatus::Finalized(digest) = self.status {
            return Ok(digest);
        }
        Ok(self.finish())
    }

    fn finish(&mut self) -> Digest {
        let length = self.length_bits.to_le_bytes();
        let index = self.buffered;
        let pad_len = if index < 56 { 56 - index } else { 120 - index };

        self.absorb(&PADDING[..pad_len]);
        self.absorb(&length);
        debug_assert_eq!(self.buffered, 0);

        let mut out = [0u8; DIGEST_SIZE];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        let digest = Digest(out);
        self.status = DigestStatus::Finalized(digest);
        digest
    }

    /// Push bytes through the block buffer without touching the length.
    fn absorb(&mut self, mut data: &[u8]) {
        if self.buffered > 0 {
            let take = (BLOCK_SIZE - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];

            if self.buffered < BLOCK_SIZE {
                return;
            }
            let block = self.buffer;
            self.transform(&block);
            self.buffered = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            let mut owned = [0u8; BLOCK_SIZE];
            owned.copy_from_slice(block);
            self.transform(&owned);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    fn transform(&mut self, block: &[u8; BLOCK_SIZE]) {
        let mut x = [0u32; 16];
        for (word, bytes) in x.iter_mut().zip(block.chunks_exact(4)) {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        let [mut a, mut b, mut c, mut d] = self.state;

        for i in 0..64 {
            let (f, g) = match i / 16 {
                0 => ((b & c) | (!b & d), i),
                1 => ((d & b) | (!d & c), (5 * i + 1) % 16),
                2 => (b ^ c ^ d, (3 * i + 5) % 16),
                _ => (c ^ (b | !d), (7 * i) % 16),
            };

            let f = f.wrapping_add(a).wrapping_add(K[i]).wrapping_add(x[g]);
            a = d;
            d = c;
            c = b;
            b = b.wrapping_add(f.rotate_left(S[i]));
        }

        self.state[0] = self.state[0].wrapping_add(a);
        self.state[1] = self.state[1].wrapping_add(b);
        self.state[2] = self.state[2].wrapping_add(c);
        self.state[3] = self.state[3].wrapping_add(d);
    }
}
