//! The BLP2 texture container.
//!
//! Only the DXT1 payload variant is decoded, and only the base mip
//! level; the remaining fifteen mip slots are parsed but left alone.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{ReadBytesExt, LE};

use crate::consts::*;
use crate::dxt1;
use crate::dxt1::Image;
use crate::error::Error;

/// The fixed 148-byte header of a BLP2 file.
#[derive(Debug)]
pub struct BlpHeader {
    pub format_version: u32,
    pub color_encoding: u8,
    pub alpha_depth: u8,
    pub preferred_format: u8,
    pub mip_level_and_flag: u8,
    pub width: u32,
    pub height: u32,
    /// Byte offsets of each mip level from the start of the file.
    pub mip_offsets: [u32; BLP_MIP_COUNT],
    pub mip_sizes: [u32; BLP_MIP_COUNT],
}

impl BlpHeader {
    pub fn from_reader<R: Read>(mut reader: R) -> Result<BlpHeader, Error> {
        let magic = reader.read_u32::<LE>()?;
        if magic != MAGIC_BLP2 {
            return Err(Error::InvalidFormat {
                reason: "bad BLP2 magic",
            });
        }

        let format_version = reader.read_u32::<LE>()?;
        let color_encoding = reader.read_u8()?;
        let alpha_depth = reader.read_u8()?;
        let preferred_format = reader.read_u8()?;
        let mip_level_and_flag = reader.read_u8()?;
        let width = reader.read_u32::<LE>()?;
        let height = reader.read_u32::<LE>()?;

        let mut mip_offsets = [0u32; BLP_MIP_COUNT];
        for slot in mip_offsets.iter_mut() {
            *slot = reader.read_u32::<LE>()?;
        }
        let mut mip_sizes = [0u32; BLP_MIP_COUNT];
        for slot in mip_sizes.iter_mut() {
            *slot = reader.read_u32::<LE>()?;
        }

        Ok(BlpHeader {
            format_version,
            color_encoding,
            alpha_depth,
            preferred_format,
            mip_level_and_flag,
            width,
            height,
            mip_offsets,
            mip_sizes,
        })
    }

    /// Whether the payload is DXT1-encoded.
    pub fn is_dxt1(&self) -> bool {
        self.color_encoding == BLP_ENCODING_DXT && self.preferred_format == 0
    }
}

/// Decodes the base mip level of a DXT1-encoded BLP2 texture.
pub fn decode<R: Read + Seek>(source: &mut R) -> Result<Image, Error> {
    let header = BlpHeader::from_reader(&mut *source)?;

    if !header.is_dxt1() {
        return Err(Error::Unsupported {
            feature: "BLP color encoding other than DXT1",
        });
    }
    // DXT1 carries at most the 1-bit punch-through alpha
    if header.alpha_depth > 1 {
        return Err(Error::Unsupported {
            feature: "DXT alpha depth above 1 bit",
        });
    }

    source
        .seek(SeekFrom::Start(u64::from(header.mip_offsets[0])))
        .map_err(|cause| Error::Seek { cause })?;
    let base_mip = source.take(u64::from(header.mip_sizes[0]));

    dxt1::decode(base_mip, header.width, header.height)
}
