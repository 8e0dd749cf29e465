//! In-memory archive fixtures for the integration tests.
//!
//! The builder assembles a complete v0/v1 archive the way a real
//! producer would: file streams first, then the encrypted hash and
//! block tables, then the header written back over the reserved space.
#![allow(dead_code)]

use std::io::Write;

use mpq_assets::crypto::{self, hash_bank};

pub const FLAG_EXISTS: u32 = 0x8000_0000;
pub const FLAG_SINGLE_UNIT: u32 = 0x0100_0000;
pub const FLAG_SECTOR_CRC: u32 = 0x0400_0000;
pub const FLAG_ENCRYPTED: u32 = 0x0001_0000;
pub const FLAG_IMPLODE: u32 = 0x0000_0100;
pub const FLAG_COMPRESS_MULTI: u32 = 0x0000_0200;

pub const TAG_ZLIB: u8 = 0x02;
pub const TAG_BZIP2: u8 = 0x03;

#[derive(Clone, Copy, PartialEq)]
pub enum Payload {
    Store,
    Zlib,
    Bzip2,
    SingleUnitZlib,
    SingleUnitStore,
}

pub struct FileSpec {
    pub name: &'static str,
    pub contents: Vec<u8>,
    pub payload: Payload,
    pub extra_flags: u32,
}

impl FileSpec {
    pub fn new(name: &'static str, contents: impl Into<Vec<u8>>, payload: Payload) -> FileSpec {
        FileSpec {
            name,
            contents: contents.into(),
            payload,
            extra_flags: 0,
        }
    }

    pub fn with_flags(mut self, extra_flags: u32) -> FileSpec {
        self.extra_flags = extra_flags;
        self
    }
}

struct BlockRecord {
    position: u32,
    compressed_size: u32,
    file_size: u32,
    flags: u32,
}

pub fn build_archive(
    files: &[FileSpec],
    hash_slots: u32,
    sector_shift: u16,
    version: u16,
) -> Vec<u8> {
    assert!(hash_slots.is_power_of_two());
    let sector_size = 512usize << sector_shift;
    let header_size: u32 = if version == 0 { 32 } else { 44 };

    let mut out = vec![0u8; header_size as usize];
    let mut blocks = Vec::new();

    for spec in files {
        let position = out.len() as u32;
        let (stream, flags) = encode_payload(spec, sector_size);
        blocks.push(BlockRecord {
            position,
            compressed_size: stream.len() as u32,
            file_size: spec.contents.len() as u32,
            flags: flags | spec.extra_flags | FLAG_EXISTS,
        });
        out.extend_from_slice(&stream);
    }

    // hash table: blank slots, entries placed by linear probing
    let hash_table_offset = out.len() as u32;
    let mask = (hash_slots - 1) as usize;
    let mut slots: Vec<Option<(u32, u32, u32)>> = vec![None; hash_slots as usize];
    for (block_index, spec) in files.iter().enumerate() {
        let name = spec.name.as_bytes();
        let seed = crypto::hash_string(name, hash_bank::TABLE_OFFSET) as usize;
        let pair = (
            crypto::hash_string(name, hash_bank::NAME_A),
            crypto::hash_string(name, hash_bank::NAME_B),
        );

        let mut index = seed & mask;
        while slots[index].is_some() {
            index = (index + 1) & mask;
        }
        slots[index] = Some((pair.0, pair.1, block_index as u32));
    }

    let mut hash_bytes = Vec::new();
    for slot in &slots {
        let (hash_b, hash_c, locale_platform, block_index) = match slot {
            Some((hash_b, hash_c, block_index)) => (*hash_b, *hash_c, 0u32, *block_index),
            None => (0xFFFF_FFFF, 0xFFFF_FFFF, 0x00FF_FFFF, 0xFFFF_FFFF),
        };
        hash_bytes.extend_from_slice(&hash_b.to_le_bytes());
        hash_bytes.extend_from_slice(&hash_c.to_le_bytes());
        hash_bytes.extend_from_slice(&locale_platform.to_le_bytes());
        hash_bytes.extend_from_slice(&block_index.to_le_bytes());
    }
    crypto::encrypt_block(
        &mut hash_bytes,
        crypto::hash_string(b"(hash table)", hash_bank::FILE_KEY),
    );
    out.extend_from_slice(&hash_bytes);

    // block table
    let block_table_offset = out.len() as u32;
    let mut block_bytes = Vec::new();
    for record in &blocks {
        block_bytes.extend_from_slice(&record.position.to_le_bytes());
        block_bytes.extend_from_slice(&record.compressed_size.to_le_bytes());
        block_bytes.extend_from_slice(&record.file_size.to_le_bytes());
        block_bytes.extend_from_slice(&record.flags.to_le_bytes());
    }
    crypto::encrypt_block(
        &mut block_bytes,
        crypto::hash_string(b"(block table)", hash_bank::FILE_KEY),
    );
    out.extend_from_slice(&block_bytes);

    // header last, now that the layout is known
    let archive_size = out.len() as u32;
    let mut header = Vec::new();
    header.extend_from_slice(b"MPQ\x1A");
    header.extend_from_slice(&header_size.to_le_bytes());
    header.extend_from_slice(&archive_size.to_le_bytes());
    header.extend_from_slice(&version.to_le_bytes());
    header.extend_from_slice(&sector_shift.to_le_bytes());
    header.extend_from_slice(&hash_table_offset.to_le_bytes());
    header.extend_from_slice(&block_table_offset.to_le_bytes());
    header.extend_from_slice(&hash_slots.to_le_bytes());
    header.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
    if version >= 1 {
        header.extend_from_slice(&0u64.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes());
    }
    out[..header.len()].copy_from_slice(&header);

    out
}

fn encode_payload(spec: &FileSpec, sector_size: usize) -> (Vec<u8>, u32) {
    match spec.payload {
        Payload::Store => (spec.contents.clone(), 0),
        Payload::SingleUnitStore => (spec.contents.clone(), FLAG_SINGLE_UNIT),
        Payload::SingleUnitZlib => (
            compress_sector(&spec.contents, TAG_ZLIB),
            FLAG_SINGLE_UNIT | FLAG_COMPRESS_MULTI,
        ),
        Payload::Zlib | Payload::Bzip2 => {
            let tag = if spec.payload == Payload::Zlib {
                TAG_ZLIB
            } else {
                TAG_BZIP2
            };
            let sectors: Vec<Vec<u8>> = spec
                .contents
                .chunks(sector_size)
                .map(|chunk| compress_sector(chunk, tag))
                .collect();
            let has_crc = spec.extra_flags & FLAG_SECTOR_CRC != 0;

            let boundaries = sectors.len() + 1 + has_crc as usize;
            let mut stream = Vec::new();
            let mut offset = (boundaries * 4) as u32;
            stream.extend_from_slice(&offset.to_le_bytes());
            for sector in &sectors {
                offset += sector.len() as u32;
                stream.extend_from_slice(&offset.to_le_bytes());
            }
            if has_crc {
                // one 4-byte checksum per data sector; the reader never
                // looks at the contents
                offset += 4 * sectors.len() as u32;
                stream.extend_from_slice(&offset.to_le_bytes());
            }
            for sector in &sectors {
                stream.extend_from_slice(sector);
            }
            if has_crc {
                stream.resize(stream.len() + 4 * sectors.len(), 0);
            }
            (stream, FLAG_COMPRESS_MULTI)
        }
    }
}

/// Compresses one sector, falling back to a raw copy when compression
/// does not shrink it; the reader treats equal lengths as stored.
fn compress_sector(payload: &[u8], tag: u8) -> Vec<u8> {
    let mut sector = vec![tag];
    match tag {
        TAG_ZLIB => {
            let mut encoder =
                flate2::write::ZlibEncoder::new(&mut sector, flate2::Compression::best());
            encoder.write_all(payload).unwrap();
            encoder.finish().unwrap();
        }
        _ => {
            let mut encoder = bzip2::write::BzEncoder::new(&mut sector, bzip2::Compression::Best);
            encoder.write_all(payload).unwrap();
            encoder.finish().unwrap();
        }
    }

    if sector.len() >= payload.len() {
        payload.to_vec()
    } else {
        sector
    }
}
