// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Block I/O: reading and writing fixed-size blocks of the backing
//! image file at integer block indices.
//!
//! Every layer above this one addresses the image in blocks, never in
//! raw bytes; `block_size` is fixed for the lifetime of a mount (it is
//! read once from the superblock) and threaded through here rather
//! than kept as a global, per the "no implicit globals" design note.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::result::{Error, Result};

/// A handle to the backing image file, plus the block geometry needed
/// to translate block indices into byte offsets.
#[derive(Debug)]
pub(crate) struct BlockDevice {
    file: File,
    block_size: usize,
    total_blocks: u64,
}

impl BlockDevice {
    /// Opens an existing image and determines its block count from
    /// the file's length. `block_size` must already be known (it
    /// comes from the superblock, which is read before this device
    /// is fully trusted for higher-level block addressing).
    pub(crate) fn open(file: File, block_size: usize) -> Result<BlockDevice> {
        let len = file.metadata()?.len();
        let total_blocks = len / block_size as u64;
        Ok(BlockDevice { file, block_size, total_blocks })
    }

    pub(crate) fn block_size(&self) -> usize {
        self.block_size
    }

    pub(crate) fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    fn check_range(&self, start: u64, count: u64) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let end = start.checked_add(count).ok_or(Error::RangeError)?;
        if end > self.total_blocks {
            return Err(Error::RangeError);
        }
        Ok(())
    }

    /// Reads a single block.
    pub(crate) fn read_block(&mut self, index: u64) -> Result<Vec<u8>> {
        self.read_blocks(index, 1)
    }

    /// Writes a single block. `data` must be exactly `block_size` bytes.
    pub(crate) fn write_block(&mut self, index: u64, data: &[u8]) -> Result<()> {
        self.write_blocks(index, data)
    }

    /// Reads `count` contiguous blocks starting at `start`.
    pub(crate) fn read_blocks(&mut self, start: u64, count: u64) -> Result<Vec<u8>> {
        self.check_range(start, count)?;
        let len = count as usize * self.block_size;
        let mut buf = vec![0u8; len];
        self.file.seek(SeekFrom::Start(start * self.block_size as u64))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Writes `data`, which must be a multiple of `block_size` bytes,
    /// starting at block `start`.
    pub(crate) fn write_blocks(&mut self, start: u64, data: &[u8]) -> Result<()> {
        if data.len() % self.block_size != 0 {
            return Err(Error::RangeError);
        }
        let count = (data.len() / self.block_size) as u64;
        self.check_range(start, count)?;
        self.file.seek(SeekFrom::Start(start * self.block_size as u64))?;
        self.file.write_all(data)?;
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }

    /// Unwraps the device back into its underlying file, e.g. to
    /// reopen it at the real block size once the superblock has been
    /// probed at a placeholder size.
    pub(crate) fn into_file(self) -> File {
        self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn device(block_size: usize, blocks: usize) -> BlockDevice {
        let mut f = tempfile::tempfile().unwrap();
        f.write_all(&vec![0u8; block_size * blocks]).unwrap();
        BlockDevice::open(f, block_size).unwrap()
    }

    #[test]
    fn round_trips_a_block() {
        let mut dev = device(8, 4);
        dev.write_block(2, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let got = dev.read_block(2).unwrap();
        assert_eq!(got, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn out_of_range_fails() {
        let mut dev = device(8, 4);
        assert!(matches!(dev.read_block(4), Err(Error::RangeError)));
        assert!(matches!(dev.read_blocks(3, 2), Err(Error::RangeError)));
    }

    #[test]
    fn read_blocks_spans_multiple() {
        let mut dev = device(4, 4);
        dev.write_blocks(0, &[1; 8]).unwrap();
        let got = dev.read_blocks(0, 2).unwrap();
        assert_eq!(got, vec![1u8; 8]);
    }
}
