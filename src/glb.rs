//! The binary container of glTF 2.0.
//!
//! The descriptor itself is JSON and goes straight to `serde_json`;
//! this module only peels the 12-byte header and the two typed chunks.

use std::io::Read;

use byteorder::{ReadBytesExt, LE};
use serde_json::Value;

use crate::consts::*;
use crate::error::Error;

/// A parsed binary-glTF asset: the JSON descriptor plus the optional
/// binary buffer chunk.
#[derive(Debug)]
pub struct Glb {
    pub json: Value,
    pub bin: Option<Vec<u8>>,
}

impl Glb {
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Glb, Error> {
        let magic = reader.read_u32::<LE>()?;
        if magic != MAGIC_GLTF {
            return Err(Error::InvalidFormat {
                reason: "bad glTF magic",
            });
        }
        let version = reader.read_u32::<LE>()?;
        if version != 2 {
            return Err(Error::Unsupported {
                feature: "glTF container version other than 2",
            });
        }
        let declared_len = reader.read_u32::<LE>()?;
        if declared_len < 12 {
            return Err(Error::InvalidFormat {
                reason: "glTF length smaller than its header",
            });
        }

        let json_chunk = match read_chunk(&mut reader)? {
            Some(chunk) if chunk.kind == GLB_CHUNK_JSON => chunk,
            Some(_) => {
                return Err(Error::InvalidFormat {
                    reason: "first glTF chunk is not JSON",
                })
            }
            None => {
                return Err(Error::InvalidFormat {
                    reason: "glTF carries no chunks",
                })
            }
        };
        // chunk data is padded to 4-byte alignment with spaces, which
        // the JSON parser tolerates as trailing whitespace
        let json = serde_json::from_slice(&json_chunk.data).map_err(|_| Error::InvalidFormat {
            reason: "glTF descriptor is not valid JSON",
        })?;

        let bin = match read_chunk(&mut reader)? {
            Some(chunk) if chunk.kind == GLB_CHUNK_BIN => Some(chunk.data),
            Some(_) => {
                return Err(Error::InvalidFormat {
                    reason: "unexpected trailing glTF chunk",
                })
            }
            None => None,
        };

        Ok(Glb { json, bin })
    }
}

struct Chunk {
    kind: u32,
    data: Vec<u8>,
}

/// Reads one `(length, type, data)` chunk, or `None` at end of input.
fn read_chunk<R: Read>(reader: &mut R) -> Result<Option<Chunk>, Error> {
    let mut header = [0u8; 8];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled == 0 {
        return Ok(None);
    }
    if filled < header.len() {
        return Err(Error::InvalidFormat {
            reason: "truncated glTF chunk header",
        });
    }

    let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let kind = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    let mut data = Vec::new();
    data.try_reserve_exact(length as usize)?;
    data.resize(length as usize, 0);
    reader.read_exact(&mut data)?;

    Ok(Some(Chunk { kind, data }))
}
