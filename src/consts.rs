//! On-disk constants of the supported container formats.

/// Little-endian `MPQ\x1A`, the archive header magic.
pub(crate) const MAGIC_MPQ: u32 = 0x1A51_504D;
/// Little-endian `MPQ\x1B`, a user-data block preceding the real header.
pub(crate) const MAGIC_MPQ_USER_DATA: u32 = 0x1B51_504D;

pub(crate) const HEADER_SIZE_V0: u32 = 32;
pub(crate) const HEADER_SIZE_V1: u32 = 44;

pub(crate) const HASH_ENTRY_SIZE: u64 = 16;
pub(crate) const BLOCK_ENTRY_SIZE: u64 = 16;

/// Decryption key of the hash table: `hash_string(b"(hash table)", FILE_KEY)`.
pub(crate) const HASH_TABLE_KEY: u32 = 0xC3AF_3770;
/// Decryption key of the block table: `hash_string(b"(block table)", FILE_KEY)`.
pub(crate) const BLOCK_TABLE_KEY: u32 = 0xEC83_B3A3;

/// The hash slot was never used; terminates a probe chain.
pub(crate) const BLOCK_INDEX_EMPTY: u32 = 0xFFFF_FFFF;
/// The hash slot's file was deleted; probing continues past it.
pub(crate) const BLOCK_INDEX_DELETED: u32 = 0xFFFF_FFFE;

// Block table flags.
pub(crate) const FLAG_EXISTS: u32 = 0x8000_0000;
pub(crate) const FLAG_SINGLE_UNIT: u32 = 0x0100_0000;
pub(crate) const FLAG_SECTOR_CRC: u32 = 0x0400_0000;
pub(crate) const FLAG_ENCRYPTED: u32 = 0x0001_0000;
pub(crate) const FLAG_COMPRESS_MASK: u32 = 0x0000_FF00;
pub(crate) const FLAG_IMPLODE: u32 = 0x0000_0100;
pub(crate) const FLAG_COMPRESS_MULTI: u32 = 0x0000_0200;

// First byte of a multi-compressed sector.
pub(crate) const SECTOR_TAG_ZLIB: u8 = 0x02;
pub(crate) const SECTOR_TAG_BZIP2: u8 = 0x03;

/// Little-endian `BLP2`.
pub(crate) const MAGIC_BLP2: u32 = 0x3250_4C42;
/// BLP color encoding carrying DXT-compressed blocks.
pub(crate) const BLP_ENCODING_DXT: u8 = 2;
pub(crate) const BLP_MIP_COUNT: usize = 16;

/// Little-endian `glTF`.
pub(crate) const MAGIC_GLTF: u32 = 0x4654_6C67;
/// Little-endian `JSON` chunk type.
pub(crate) const GLB_CHUNK_JSON: u32 = 0x4E4F_534A;
/// Little-endian `BIN\0` chunk type.
pub(crate) const GLB_CHUNK_BIN: u32 = 0x004E_4942;
