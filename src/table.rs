use std::io::{Read, Seek};

use byteorder::{ReadBytesExt, LE};

use crate::consts::*;
use crate::crypto::{self, hash_bank};
use crate::error::Error;
use crate::header::FileHeader;
use crate::seeker::Seeker;
use crate::util::sector_count;

/// The archive's open-addressed name directory.
#[derive(Debug)]
pub(crate) struct HashTable {
    entries: Vec<HashEntry>,
}

impl HashTable {
    pub fn load<R: Read + Seek>(
        seeker: &mut Seeker<R>,
        header: &FileHeader,
    ) -> Result<HashTable, Error> {
        let count = header.hash_table_entries as usize;
        let mut raw = seeker.read(
            header.hash_table_offset(),
            u64::from(header.hash_table_entries) * HASH_ENTRY_SIZE,
        )?;
        crypto::decrypt_block(&mut raw, HASH_TABLE_KEY);

        let mut entries = Vec::new();
        entries.try_reserve_exact(count)?;
        let mut slice = &raw[..];
        for _ in 0..count {
            entries.push(HashEntry::from_reader(&mut slice)?);
        }

        Ok(HashTable { entries })
    }

    /// Finds the entry for `name` by linear probing from the slot seeded
    /// by the table-offset hash.
    ///
    /// A deleted slot keeps the probe chain alive; an empty slot or a
    /// full wrap of the table ends it. Locale and platform are not
    /// filtered, so for archives carrying per-locale variants of a name
    /// the first probed entry wins.
    pub fn find_entry(&self, name: &str) -> Option<&HashEntry> {
        let mask = self.entries.len() - 1;
        let hash_b = crypto::hash_string(name.as_bytes(), hash_bank::NAME_A);
        let hash_c = crypto::hash_string(name.as_bytes(), hash_bank::NAME_B);
        let seed = crypto::hash_string(name.as_bytes(), hash_bank::TABLE_OFFSET) as usize;

        let mut index = seed & mask;
        for _ in 0..self.entries.len() {
            let entry = &self.entries[index];

            if entry.block_index == BLOCK_INDEX_EMPTY {
                return None;
            }
            if entry.block_index != BLOCK_INDEX_DELETED
                && entry.name_hash_b == hash_b
                && entry.name_hash_c == hash_c
            {
                return Some(entry);
            }

            index = (index + 1) & mask;
        }

        None
    }
}

/// One 16-byte slot of the hash table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HashEntry {
    pub name_hash_b: u32,
    pub name_hash_c: u32,
    pub locale: u16,
    pub platform: u16,
    pub block_index: u32,
}

impl HashEntry {
    pub fn from_reader<R: Read>(mut reader: R) -> Result<HashEntry, Error> {
        let name_hash_b = reader.read_u32::<LE>()?;
        let name_hash_c = reader.read_u32::<LE>()?;
        let locale = reader.read_u16::<LE>()?;
        let platform = reader.read_u16::<LE>()?;
        let block_index = reader.read_u32::<LE>()?;

        Ok(HashEntry {
            name_hash_b,
            name_hash_c,
            locale,
            platform,
            block_index,
        })
    }
}

/// The per-file location and flag records.
#[derive(Debug)]
pub(crate) struct BlockTable {
    entries: Vec<BlockEntry>,
}

impl BlockTable {
    pub fn load<R: Read + Seek>(
        seeker: &mut Seeker<R>,
        header: &FileHeader,
    ) -> Result<BlockTable, Error> {
        let count = header.block_table_entries as usize;
        let mut raw = seeker.read(
            header.block_table_offset(),
            u64::from(header.block_table_entries) * BLOCK_ENTRY_SIZE,
        )?;
        crypto::decrypt_block(&mut raw, BLOCK_TABLE_KEY);

        let mut entries = Vec::new();
        entries.try_reserve_exact(count)?;
        let mut slice = &raw[..];
        for _ in 0..count {
            entries.push(BlockEntry::from_reader(&mut slice)?);
        }

        Ok(BlockTable { entries })
    }

    pub fn get(&self, index: usize) -> Option<&BlockEntry> {
        self.entries.get(index)
    }

    /// Positions of live entries, in table order.
    pub fn live_indices(&self) -> Vec<u32> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.exists())
            .map(|(index, _)| index as u32)
            .collect()
    }
}

/// One 16-byte record of the block table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockEntry {
    pub file_position: u64,
    pub compressed_size: u64,
    pub file_size: u64,
    pub flags: u32,
}

impl BlockEntry {
    pub fn from_reader<R: Read>(mut reader: R) -> Result<BlockEntry, Error> {
        let file_position = u64::from(reader.read_u32::<LE>()?);
        let compressed_size = u64::from(reader.read_u32::<LE>()?);
        let file_size = u64::from(reader.read_u32::<LE>()?);
        let flags = reader.read_u32::<LE>()?;

        Ok(BlockEntry {
            file_position,
            compressed_size,
            file_size,
            flags,
        })
    }

    pub fn exists(&self) -> bool {
        self.flags & FLAG_EXISTS != 0
    }

    pub fn is_single_unit(&self) -> bool {
        self.flags & FLAG_SINGLE_UNIT != 0
    }

    pub fn has_sector_crc(&self) -> bool {
        self.flags & FLAG_SECTOR_CRC != 0
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESS_MASK != 0
    }

    pub fn is_imploded(&self) -> bool {
        self.flags & FLAG_IMPLODE != 0
    }

    pub fn is_multi_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESS_MULTI != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

/// The per-file vector of sector boundaries, relative to the file's
/// position in the archive. Entry `k` starts sector `k`; the entry past
/// the last sector closes it.
#[derive(Debug)]
pub(crate) struct SectorOffsets {
    offsets: Vec<u32>,
    /// Data sectors only; the trailing checksum sector is not counted.
    sectors: usize,
}

impl SectorOffsets {
    /// Reads the on-disk offset vector of a compressed, sectorised file.
    pub fn from_seeker<R: Read + Seek>(
        seeker: &mut Seeker<R>,
        entry: &BlockEntry,
        sector_size: u64,
    ) -> Result<SectorOffsets, Error> {
        let sectors = sector_count(entry.file_size, sector_size) as usize;
        let mut boundaries = sectors + 1;
        if entry.has_sector_crc() {
            boundaries += 1;
        }

        let raw = seeker.read(entry.file_position, boundaries as u64 * 4)?;
        let mut slice = &raw[..];
        let mut offsets = Vec::with_capacity(boundaries);
        for _ in 0..boundaries {
            offsets.push(slice.read_u32::<LE>()?);
        }

        if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(Error::InvalidFormat {
                reason: "sector offsets are not monotonic",
            });
        }

        Ok(SectorOffsets { offsets, sectors })
    }

    /// Boundaries of an uncompressed file are implicit in the sector
    /// size; nothing is stored on disk.
    pub fn synthesized(entry: &BlockEntry, sector_size: u64) -> SectorOffsets {
        let sectors = sector_count(entry.file_size, sector_size) as usize;
        let mut offsets = Vec::with_capacity(sectors + 1);
        for k in 0..sectors {
            offsets.push((k as u64 * sector_size) as u32);
        }
        offsets.push(entry.compressed_size as u32);

        SectorOffsets { offsets, sectors }
    }

    pub fn count(&self) -> usize {
        self.sectors
    }

    /// `(start, length)` pairs of the data sectors.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.offsets
            .windows(2)
            .take(self.sectors)
            .map(|pair| (pair[0], pair[1] - pair[0]))
    }
}
