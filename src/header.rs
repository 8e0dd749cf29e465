use std::io::Read;

use byteorder::{ReadBytesExt, LE};

use crate::consts::*;
use crate::error::Error;

/// The fixed-layout header at the start of every archive.
#[derive(Debug)]
pub(crate) struct FileHeader {
    pub header_size: u32,
    pub archive_size: u32,
    pub format_version: u16,
    pub sector_size_shift: u16,
    pub hash_table_offset: u32,
    pub block_table_offset: u32,
    pub hash_table_entries: u32,
    pub block_table_entries: u32,
    pub extended: Option<ExtendedHeader>,
}

/// Version 1 extension carrying table offsets beyond 32 bits.
#[derive(Debug)]
pub(crate) struct ExtendedHeader {
    pub extended_block_table_offset: u64,
    pub hash_table_offset_high: u16,
    pub block_table_offset_high: u16,
}

impl FileHeader {
    pub fn from_reader<R: Read>(mut reader: R) -> Result<FileHeader, Error> {
        let magic = reader.read_u32::<LE>()?;
        match magic {
            MAGIC_MPQ => {}
            MAGIC_MPQ_USER_DATA => {
                return Err(Error::Unsupported {
                    feature: "user data block before the archive header",
                })
            }
            _ => {
                return Err(Error::InvalidFormat {
                    reason: "bad archive magic",
                })
            }
        }

        let header_size = reader.read_u32::<LE>()?;
        let archive_size = reader.read_u32::<LE>()?;
        let format_version = reader.read_u16::<LE>()?;
        let sector_size_shift = reader.read_u16::<LE>()?;
        let hash_table_offset = reader.read_u32::<LE>()?;
        let block_table_offset = reader.read_u32::<LE>()?;
        let hash_table_entries = reader.read_u32::<LE>()?;
        let block_table_entries = reader.read_u32::<LE>()?;

        if format_version > 1 {
            return Err(Error::Unsupported {
                feature: "format version 2+",
            });
        }
        if header_size < HEADER_SIZE_V0 {
            return Err(Error::InvalidFormat {
                reason: "header shorter than 32 bytes",
            });
        }
        // the probe mask requires a power-of-two slot count
        if !hash_table_entries.is_power_of_two() {
            return Err(Error::InvalidFormat {
                reason: "hash table entry count is not a power of two",
            });
        }
        if sector_size_shift > 23 {
            return Err(Error::InvalidFormat {
                reason: "sector size shift out of range",
            });
        }

        let extended = if format_version >= 1 && header_size >= HEADER_SIZE_V1 {
            Some(ExtendedHeader {
                extended_block_table_offset: reader.read_u64::<LE>()?,
                hash_table_offset_high: reader.read_u16::<LE>()?,
                block_table_offset_high: reader.read_u16::<LE>()?,
            })
        } else {
            None
        };

        Ok(FileHeader {
            header_size,
            archive_size,
            format_version,
            sector_size_shift,
            hash_table_offset,
            block_table_offset,
            hash_table_entries,
            block_table_entries,
            extended,
        })
    }

    /// Sector payload granularity; canonical archives use shift 3 (4096).
    pub fn sector_size(&self) -> u64 {
        512u64 << self.sector_size_shift
    }

    pub fn hash_table_offset(&self) -> u64 {
        let high = self
            .extended
            .as_ref()
            .map_or(0, |ext| u64::from(ext.hash_table_offset_high));
        high << 32 | u64::from(self.hash_table_offset)
    }

    pub fn block_table_offset(&self) -> u64 {
        let high = self
            .extended
            .as_ref()
            .map_or(0, |ext| u64::from(ext.block_table_offset_high));
        high << 32 | u64::from(self.block_table_offset)
    }
}
