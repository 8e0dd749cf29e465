use std::io::{Read, Seek};

use log::{debug, trace};

use crate::compression::decompress_sector;
use crate::error::Error;
use crate::header::FileHeader;
use crate::seeker::Seeker;
use crate::table::{BlockEntry, BlockTable, HashTable, SectorOffsets};

/// A fully materialised MPQ archive directory.
///
/// [`open`](Archive::open) eagerly reads and decrypts both metadata
/// tables; afterwards the archive is immutable and every operation is
/// read-only. The backing byte source stays with the caller and is
/// borrowed per call, so the same `File` or in-memory cursor can serve
/// other readers between operations. Extraction performs several
/// seek+read pairs against the source, so sharing one source across
/// threads needs external synchronization.
#[derive(Debug)]
pub struct Archive {
    header: FileHeader,
    hash_table: HashTable,
    block_table: BlockTable,
    live_block_indices: Vec<u32>,
}

impl Archive {
    /// Opens an archive from a seekable byte source.
    ///
    /// This validates the header at the start of the source, then loads
    /// and decrypts the hash table and the block table. Nothing else is
    /// read; file payloads stay on disk until asked for.
    pub fn open<R: Read + Seek>(source: &mut R) -> Result<Archive, Error> {
        let mut seeker = Seeker::new(source);

        let header = FileHeader::from_reader(seeker.stream_from(0)?)?;
        let hash_table = HashTable::load(&mut seeker, &header)?;
        let block_table = BlockTable::load(&mut seeker, &header)?;
        let live_block_indices = block_table.live_indices();

        debug!(
            "opened archive: v{} ({}-byte header), {} declared bytes, {} hash slots, {} blocks ({} live)",
            header.format_version,
            header.header_size,
            header.archive_size,
            header.hash_table_entries,
            header.block_table_entries,
            live_block_indices.len()
        );
        if let Some(ext) = &header.extended {
            trace!(
                "extended header: ext block table at {:#x}",
                ext.extended_block_table_offset
            );
        }

        Ok(Archive {
            header,
            hash_table,
            block_table,
            live_block_indices,
        })
    }

    /// Number of live files in the block table.
    pub fn file_count(&self) -> usize {
        self.live_block_indices.len()
    }

    /// Whether `name` resolves to a directory entry.
    pub fn contains(&self, name: &str) -> bool {
        self.hash_table.find_entry(name).is_some()
    }

    /// Reads a file's entire contents.
    ///
    /// Name resolution is case-insensitive and treats `/` and `\` as
    /// the same separator. The hash entry's block index is taken as a
    /// direct index into the block table.
    pub fn read_file<R: Read + Seek>(
        &self,
        source: &mut R,
        name: &str,
    ) -> Result<Vec<u8>, Error> {
        let hash_entry = self.hash_table.find_entry(name).ok_or(Error::FileNotFound)?;
        let block_entry = self
            .block_table
            .get(hash_entry.block_index as usize)
            .ok_or(Error::FileNotFound)?;

        trace!(
            "extracting {:?}: block {}, {} -> {} bytes, locale {:#06x}, platform {:#06x}",
            name,
            hash_entry.block_index,
            block_entry.compressed_size,
            block_entry.file_size,
            hash_entry.locale,
            hash_entry.platform
        );

        if block_entry.is_encrypted() {
            return Err(Error::Unsupported {
                feature: "encrypted file payload",
            });
        }
        if block_entry.is_imploded() {
            return Err(Error::Unsupported {
                feature: "PKWARE imploded payload",
            });
        }
        if block_entry.is_compressed() && !block_entry.is_multi_compressed() {
            return Err(Error::InvalidFormat {
                reason: "unrecognized compression flags",
            });
        }

        let mut seeker = Seeker::new(source);

        if block_entry.is_single_unit() {
            return read_single_unit(&mut seeker, block_entry);
        }

        let sector_size = self.header.sector_size();
        let offsets = if block_entry.is_compressed() {
            SectorOffsets::from_seeker(&mut seeker, block_entry, sector_size)?
        } else {
            SectorOffsets::synthesized(block_entry, sector_size)
        };

        let sectors = offsets.count() as u64;
        let mut contents = Vec::new();
        contents.try_reserve_exact(block_entry.file_size as usize)?;

        for (index, (start, len)) in offsets.iter().enumerate() {
            // every sector inflates to a full sector size except the
            // last, which carries the remainder of the file
            let expected = if index as u64 + 1 == sectors {
                (block_entry.file_size - sector_size * (sectors - 1)) as usize
            } else {
                sector_size as usize
            };

            let raw = seeker.read(
                block_entry.file_position + u64::from(start),
                u64::from(len),
            )?;

            if block_entry.is_multi_compressed() {
                contents.extend_from_slice(&decompress_sector(&raw, expected)?);
            } else {
                if raw.len() != expected {
                    return Err(Error::InvalidFormat {
                        reason: "stored sector length mismatch",
                    });
                }
                contents.extend_from_slice(&raw);
            }
        }

        Ok(contents)
    }

    /// Parses the archive's `(listfile)` into file names, if present.
    ///
    /// The listfile is itself an archive member, one name per line;
    /// callers use it to drive batch extraction.
    pub fn files<R: Read + Seek>(&self, source: &mut R) -> Option<Vec<String>> {
        let listfile = self.read_file(source, "(listfile)").ok()?;

        let names = listfile
            .split(|&byte| byte == b'\r' || byte == b'\n')
            .filter(|line| !line.is_empty())
            .filter_map(|line| std::str::from_utf8(line).ok())
            .map(str::to_owned)
            .collect();

        Some(names)
    }
}

fn read_single_unit<R: Read + Seek>(
    seeker: &mut Seeker<R>,
    entry: &BlockEntry,
) -> Result<Vec<u8>, Error> {
    if entry.is_compressed() {
        let raw = seeker.read(entry.file_position, entry.compressed_size)?;
        decompress_sector(&raw, entry.file_size as usize)
    } else {
        seeker.read(entry.file_position, entry.file_size)
    }
}
