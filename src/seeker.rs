use std::io::{Read, Seek, SeekFrom};

use crate::error::Error;

/// Positioned reads against a borrowed byte source.
///
/// The archive never owns its backing source; callers hand one in per
/// operation and the seeker scopes the borrow to that call. Seek
/// failures and short reads are mapped to their own error kinds at this
/// boundary.
#[derive(Debug)]
pub(crate) struct Seeker<'a, R: Read + Seek> {
    source: &'a mut R,
}

impl<'a, R: Read + Seek> Seeker<'a, R> {
    pub fn new(source: &'a mut R) -> Seeker<'a, R> {
        Seeker { source }
    }

    /// Reads exactly `size` bytes starting at `offset`.
    pub fn read(&mut self, offset: u64, size: u64) -> Result<Vec<u8>, Error> {
        self.source
            .seek(SeekFrom::Start(offset))
            .map_err(|cause| Error::Seek { cause })?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(size as usize)?;
        buf.resize(size as usize, 0);
        self.source
            .read_exact(&mut buf)
            .map_err(|cause| Error::Read { cause })?;

        Ok(buf)
    }

    /// Positions the source and hands it out for streamed reads.
    pub fn stream_from(&mut self, offset: u64) -> Result<&mut R, Error> {
        self.source
            .seek(SeekFrom::Start(offset))
            .map_err(|cause| Error::Seek { cause })?;

        Ok(self.source)
    }
}
