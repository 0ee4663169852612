// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The superblock and the region geometry derived from it.
//!
//! `B`, `M`, and `F` are read from the superblock once, at mount, and
//! every other region offset is derived from them (§3, §6). Rather
//! than keep those as process-wide globals the way the original
//! source does, they live as fields of [`Geometry`], which is threaded
//! through every later operation — see the "Global mutable region
//! offsets" design note.

use crate::block::BlockDevice;
use crate::descriptor::Descriptor;
use crate::result::{Error, Result};

/// Default format-time parameters (§6 "Fresh image defaults").
pub const DEFAULT_BLOCK_SIZE: u16 = 8;
pub const DEFAULT_MAX_FILES: u16 = 12;
pub const DEFAULT_FAN_OUT: u16 = 10;
/// Default number of data-area blocks for a freshly formatted image;
/// not part of the spec's defaults (which fix only B, M, F) but a
/// crate-level choice, overridable via [`Engine::format_with`].
pub const DEFAULT_DATA_BLOCKS: u64 = 128;

pub(crate) const HEADER_BYTES: usize = 8;

/// Region layout and derived offsets, all in units of blocks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Geometry {
    pub(crate) block_size: u16,
    pub(crate) max_files: u16,
    pub(crate) fan_out: u16,
    pub(crate) record_span: u64,
    pub(crate) header_blocks: u64,
    pub(crate) map_start: u64,
    pub(crate) map_blocks: u64,
    pub(crate) fds_start: u64,
    pub(crate) fd_blocks: u64,
    pub(crate) data_start: u64,
    pub(crate) data_blocks: u64,
}

impl Geometry {
    /// `⌈(4 + 2F) / B⌉`, the number of blocks one descriptor record
    /// occupies (§3).
    fn record_span_for(block_size: u16, fan_out: u16) -> u64 {
        let bytes = 4u64 + 2 * fan_out as u64;
        bytes.div_ceil(block_size as u64)
    }

    /// `⌈8 / B⌉`, the number of blocks the superblock occupies (§6).
    fn header_blocks_for(block_size: u16) -> u64 {
        (HEADER_BYTES as u64).div_ceil(block_size as u64)
    }

    /// Derives region boundaries purely from `total_blocks`, `B`, `M`,
    /// `F`, following §6's formula exactly: `map_blocks` is the
    /// smallest `k` with `k*(8B+1) >= total_blocks - header - fds`.
    /// This is recomputed on every mount rather than trusting a stored
    /// `data-area-start` (see SPEC_FULL.md §F.2).
    pub(crate) fn derive(
        block_size: u16,
        max_files: u16,
        fan_out: u16,
        total_blocks: u64,
    ) -> Result<Geometry> {
        if block_size == 0 {
            return Err(Error::BadImage);
        }
        let record_span = Self::record_span_for(block_size, fan_out);
        let header_blocks = Self::header_blocks_for(block_size);
        let fd_blocks = max_files as u64 * record_span;
        let reserved = header_blocks.checked_add(fd_blocks).ok_or(Error::BadImage)?;
        let remaining = total_blocks.checked_sub(reserved).ok_or(Error::BadImage)?;

        let block_covers = 8 * block_size as u64;
        let mut map_blocks = 0u64;
        while map_blocks * (block_covers + 1) < remaining {
            map_blocks += 1;
        }
        let data_blocks = remaining - map_blocks;

        let map_start = header_blocks;
        let fds_start = map_start + map_blocks;
        let data_start = fds_start + fd_blocks;

        Ok(Geometry {
            block_size,
            max_files,
            fan_out,
            record_span,
            header_blocks,
            map_start,
            map_blocks,
            fds_start,
            fd_blocks,
            data_start,
            data_blocks,
        })
    }

    /// Builds the geometry for a brand-new image with exactly
    /// `data_blocks` data-area blocks, choosing `map_blocks` to be the
    /// minimum that covers them.
    pub(crate) fn for_fresh_image(
        block_size: u16,
        max_files: u16,
        fan_out: u16,
        data_blocks: u64,
    ) -> Geometry {
        let record_span = Self::record_span_for(block_size, fan_out);
        let header_blocks = Self::header_blocks_for(block_size);
        let fd_blocks = max_files as u64 * record_span;
        let block_covers = 8 * block_size as u64;
        let map_blocks = data_blocks.div_ceil(block_covers);
        let map_start = header_blocks;
        let fds_start = map_start + map_blocks;
        let data_start = fds_start + fd_blocks;

        Geometry {
            block_size,
            max_files,
            fan_out,
            record_span,
            header_blocks,
            map_start,
            map_blocks,
            fds_start,
            fd_blocks,
            data_start,
            data_blocks,
        }
    }

    pub(crate) fn total_blocks(&self) -> u64 {
        self.data_start + self.data_blocks
    }

    /// Reads just the block size out of the header, addressing the
    /// device one byte at a time. Used by [`crate::volume::Volume`]
    /// to learn the real block size before reopening the device at
    /// it; callers must follow up with [`Geometry::read`] against a
    /// device opened at the real block size to get a validated
    /// geometry.
    pub(crate) fn peek_block_size(dev: &mut BlockDevice) -> Result<u16> {
        let raw = dev.read_blocks(0, Self::header_blocks_for(1))?;
        if raw.len() < 2 {
            return Err(Error::BadImage);
        }
        let block_size = u16::from_le_bytes([raw[0], raw[1]]);
        if block_size == 0 {
            return Err(Error::BadImage);
        }
        Ok(block_size)
    }

    /// Reads the 8-byte header and derives the rest of the geometry
    /// from the device's actual size, per §6. `dev` must already be
    /// opened at the header's own block size (see
    /// [`Geometry::peek_block_size`]).
    pub(crate) fn read(dev: &mut BlockDevice, block_size: u16) -> Result<Geometry> {
        let header_blocks = Self::header_blocks_for(block_size);
        let raw = dev.read_blocks(0, header_blocks)?;
        if raw.len() < HEADER_BYTES {
            return Err(Error::BadImage);
        }
        let header_block_size = u16::from_le_bytes([raw[0], raw[1]]);
        let max_files = u16::from_le_bytes([raw[2], raw[3]]);
        let fan_out = u16::from_le_bytes([raw[4], raw[5]]);
        let stored_data_start = u16::from_le_bytes([raw[6], raw[7]]);

        if header_block_size != block_size || max_files == 0 || fan_out == 0 {
            return Err(Error::BadImage);
        }

        let total_blocks = dev.total_blocks();
        let geometry = Self::derive(block_size, max_files, fan_out, total_blocks)?;
        if geometry.data_start != stored_data_start as u64 {
            return Err(Error::BadImage);
        }
        Ok(geometry)
    }

    /// Serializes the 8-byte header, zero-padded to `header_blocks`
    /// blocks.
    pub(crate) fn header_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.header_blocks as usize * self.block_size as usize];
        buf[0..2].copy_from_slice(&self.block_size.to_le_bytes());
        buf[2..4].copy_from_slice(&self.max_files.to_le_bytes());
        buf[4..6].copy_from_slice(&self.fan_out.to_le_bytes());
        buf[6..8].copy_from_slice(&(self.data_start as u16).to_le_bytes());
        buf
    }

    pub(crate) fn descriptor_offset(&self, index: u16) -> u64 {
        self.fds_start + index as u64 * self.record_span
    }
}

/// Writes a fresh image at `path`: superblock, an all-free bitmap
/// (save for the two blocks root's `.`/`..` names occupy), an
/// all-Empty descriptor table except index 0 (root), and a zeroed
/// data area.
pub(crate) fn format(
    file: std::fs::File,
    block_size: u16,
    max_files: u16,
    fan_out: u16,
    data_blocks: u64,
) -> Result<()> {
    let geometry = Geometry::for_fresh_image(block_size, max_files, fan_out, data_blocks);
    if fan_out < 2 {
        // A directory needs at least one pair's worth of slots for
        // its own `.`/`..` entries.
        return Err(Error::BadImage);
    }
    file.set_len(geometry.total_blocks() * block_size as u64)?;
    let mut dev = BlockDevice::open(file, block_size as usize)?;

    dev.write_blocks(0, &geometry.header_bytes())?;

    let mut bitmap = crate::bitmap::Bitmap::new_all_free(
        geometry.data_blocks as usize,
        geometry.map_start,
        geometry.map_blocks,
    );

    let dotdot_block = bitmap.find_free().ok_or(Error::NoFreeBlock)?;
    bitmap.set_taken(dotdot_block)?;
    let dot_block = bitmap.find_free().ok_or(Error::NoFreeBlock)?;
    bitmap.set_taken(dot_block)?;

    let name_block = |name: &str| -> Vec<u8> {
        let mut buf = vec![0u8; block_size as usize];
        let n = name.len().min(block_size as usize - 1);
        buf[..n].copy_from_slice(&name.as_bytes()[..n]);
        buf
    };
    dev.write_block(geometry.data_start + dotdot_block, &name_block(".."))?;
    dev.write_block(geometry.data_start + dot_block, &name_block("."))?;

    let mut root = Descriptor::empty_directory(fan_out);
    root.blocks[0] = dotdot_block as u16;
    root.blocks[1] = 0; // root's ".." points to itself
    root.blocks[2] = dot_block as u16;
    root.blocks[3] = 0; // root's "." points to itself
    root.size = 2;
    root.links = 2;

    dev.write_blocks(
        geometry.descriptor_offset(0),
        &root.to_bytes(geometry.record_span as usize * block_size as usize),
    )?;
    let empty = Descriptor::empty(fan_out);
    let empty_bytes = empty.to_bytes(geometry.record_span as usize * block_size as usize);
    for index in 1..max_files {
        dev.write_blocks(geometry.descriptor_offset(index), &empty_bytes)?;
    }

    bitmap.flush(&mut dev)?;
    dev.flush()?;
    Ok(())
}
