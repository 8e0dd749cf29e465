//! Sector payload decompression.
//!
//! A multi-compressed sector carries a one-byte tag ahead of the
//! compressed stream. The decompressors themselves are external; their
//! contract is to produce exactly the declared number of bytes or fail.

use crate::consts::*;
use crate::error::Error;

/// Decodes one sector of a multi-compressed file.
///
/// A sector whose stored length already equals its uncompressed length
/// was left raw by the producer and is copied through unchanged.
pub(crate) fn decompress_sector(input: &[u8], expected_len: usize) -> Result<Vec<u8>, Error> {
    if input.len() == expected_len {
        let mut raw = Vec::new();
        raw.try_reserve_exact(expected_len)?;
        raw.extend_from_slice(input);
        return Ok(raw);
    }

    let (tag, stream) = match input.split_first() {
        Some(split) => split,
        None => {
            return Err(Error::InvalidFormat {
                reason: "empty compressed sector",
            })
        }
    };

    match *tag {
        SECTOR_TAG_ZLIB => inflate(stream, expected_len),
        SECTOR_TAG_BZIP2 => bunzip(stream, expected_len),
        tag => Err(Error::InvalidCompressionTag { tag }),
    }
}

fn inflate(input: &[u8], expected_len: usize) -> Result<Vec<u8>, Error> {
    let mut output = Vec::new();
    output.try_reserve_exact(expected_len)?;
    output.resize(expected_len, 0);

    let mut decompressor = flate2::Decompress::new(true);
    decompressor
        .decompress(input, &mut output, flate2::FlushDecompress::Finish)
        .map_err(|_| Error::Decompression { kind: "zlib" })?;

    if decompressor.total_out() != expected_len as u64 {
        return Err(Error::Decompression { kind: "zlib" });
    }

    Ok(output)
}

fn bunzip(input: &[u8], expected_len: usize) -> Result<Vec<u8>, Error> {
    let mut output = Vec::new();
    output.try_reserve_exact(expected_len)?;
    output.resize(expected_len, 0);

    let mut decompressor = bzip2::Decompress::new(false);
    decompressor
        .decompress(input, &mut output)
        .map_err(|_| Error::Decompression { kind: "bzip2" })?;

    if decompressor.total_out() != expected_len as u64 {
        return Err(Error::Decompression { kind: "bzip2" });
    }

    Ok(output)
}
