// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The mounted-image value: device, geometry, bitmap, current working
//! directory, and the open-file table. Everything above the
//! descriptor-table layer is threaded through a `&mut Volume` instead
//! of reaching for process-wide state (§5, and the "Global mutable
//! region offsets" design note).

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::bitmap::Bitmap;
use crate::block::BlockDevice;
use crate::descriptor::{self, Descriptor, FileType, UNUSED};
use crate::result::{Error, Result};
use crate::superblock::Geometry;

/// Capacity of the open-file table (§3 "Open-file table").
pub(crate) const OPEN_FILE_TABLE_CAPACITY: usize = 4;

/// Descriptor index of the root directory (§3).
pub(crate) const ROOT: u16 = 0;

pub(crate) struct Volume {
    dev: BlockDevice,
    geometry: Geometry,
    bitmap: Bitmap,
    cwd: u16,
    /// Slot `i` holds the descriptor index open in that slot, if any.
    open_files: [Option<u16>; OPEN_FILE_TABLE_CAPACITY],
}

impl Volume {
    /// Opens `path` and mounts it: reads the superblock, derives
    /// geometry, loads the bitmap. Starting cwd is root.
    pub(crate) fn mount(path: &Path) -> Result<Volume> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::mount_file(file)
    }

    pub(crate) fn mount_file(file: File) -> Result<Volume> {
        let len = file.metadata()?.len();
        if len < crate::superblock::HEADER_BYTES as u64 {
            return Err(Error::BadImage);
        }
        // Block size isn't known yet; peek it one byte at a time,
        // then reopen the device at its real block size.
        let mut probe = BlockDevice::open(file, 1)?;
        let block_size = Geometry::peek_block_size(&mut probe)?;
        let file = probe.into_file();
        let mut dev = BlockDevice::open(file, block_size as usize)?;
        let geometry = Geometry::read(&mut dev, block_size)?;
        let bitmap = Bitmap::load(
            &mut dev,
            geometry.map_start,
            geometry.map_blocks,
            geometry.data_blocks as usize,
        )?;
        Ok(Volume { dev, geometry, bitmap, cwd: ROOT, open_files: [None; OPEN_FILE_TABLE_CAPACITY] })
    }

    pub(crate) fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub(crate) fn cwd(&self) -> u16 {
        self.cwd
    }

    pub(crate) fn set_cwd(&mut self, index: u16) {
        self.cwd = index;
    }

    pub(crate) fn resolve(&mut self, path: &str) -> Result<crate::path::Resolved> {
        crate::path::resolve(&mut self.dev, &self.geometry, ROOT, self.cwd, path)
    }

    pub(crate) fn resolve_to_descriptor(&mut self, path: &str) -> Result<u16> {
        crate::path::resolve_to_descriptor(&mut self.dev, &self.geometry, ROOT, self.cwd, path)
    }

    pub(crate) fn read_descriptor(&mut self, index: u16) -> Result<Descriptor> {
        descriptor::read(&mut self.dev, &self.geometry, index)
    }

    pub(crate) fn write_descriptor(&mut self, index: u16, record: &Descriptor) -> Result<()> {
        descriptor::write(&mut self.dev, &self.geometry, index, record)
    }

    pub(crate) fn find_free_descriptor(&mut self) -> Result<u16> {
        descriptor::find_free(&mut self.dev, &self.geometry)
    }

    pub(crate) fn read_data_block(&mut self, addr: u16) -> Result<Vec<u8>> {
        self.dev.read_block(self.geometry.data_start + addr as u64)
    }

    pub(crate) fn write_data_block(&mut self, addr: u16, bytes: &[u8]) -> Result<()> {
        self.dev.write_block(self.geometry.data_start + addr as u64, bytes)
    }

    /// Allocates one free data block, marking it taken and flushing
    /// the bitmap immediately (§4.3 — no batching).
    pub(crate) fn alloc_block(&mut self) -> Result<u16> {
        let addr = self.bitmap.find_free().ok_or(Error::NoFreeBlock)?;
        self.bitmap.set_taken(addr)?;
        self.bitmap.flush(&mut self.dev)?;
        Ok(addr as u16)
    }

    pub(crate) fn free_block(&mut self, addr: u16) -> Result<()> {
        self.bitmap.set_free(addr as u64)?;
        self.bitmap.flush(&mut self.dev)
    }

    pub(crate) fn link_into_directory(
        &mut self,
        dir_index: u16,
        dir: &mut Descriptor,
        name: &str,
        child: u16,
    ) -> Result<()> {
        crate::dir::link_into_directory(
            &mut self.dev,
            &self.geometry,
            &mut self.bitmap,
            dir_index,
            dir,
            name,
            child,
        )
    }

    pub(crate) fn unlink_from_directory(
        &mut self,
        dir_index: u16,
        dir: &mut Descriptor,
        name: &str,
    ) -> Result<u16> {
        crate::dir::unlink_from_directory(&mut self.dev, &self.geometry, &mut self.bitmap, dir_index, dir, name)
    }

    pub(crate) fn lookup(&mut self, dir: &Descriptor, name: &str) -> Result<Option<crate::dir::Entry>> {
        crate::dir::lookup(&mut self.dev, &self.geometry, dir, name)
    }

    pub(crate) fn entries(&mut self, dir: &Descriptor) -> Result<Vec<(String, crate::dir::Entry)>> {
        crate::dir::entries(&mut self.dev, &self.geometry, dir)
    }

    /// Releases every live block address in `descriptor`'s list and
    /// marks it Empty (§4.7). For directories, only the even-indexed
    /// name-block slots are bitmap-tracked blocks; the odd-indexed
    /// child-index slots are not block addresses and must be left
    /// alone (resolves the ambiguity in §4.7's generic phrasing — see
    /// SPEC_FULL.md §F.1).
    pub(crate) fn destroy_descriptor(&mut self, index: u16, descriptor: &Descriptor) -> Result<()> {
        match descriptor.file_type {
            FileType::Directory => {
                for pair in descriptor.blocks.chunks_exact(2) {
                    if pair[0] != UNUSED {
                        self.bitmap.set_free(pair[0] as u64)?;
                    }
                }
            }
            FileType::Regular | FileType::Symlink => {
                for &addr in &descriptor.blocks {
                    if addr != UNUSED {
                        self.bitmap.set_free(addr as u64)?;
                    }
                }
            }
            FileType::Empty => {}
        }
        self.bitmap.flush(&mut self.dev)?;
        let empty = Descriptor::empty(self.geometry.fan_out);
        self.write_descriptor(index, &empty)
    }

    /// Picks the lowest-index empty open-file slot and stores
    /// `descriptor_index` in it, rejecting a double-open of the same
    /// descriptor (§4.8 open).
    pub(crate) fn open_slot(&mut self, descriptor_index: u16) -> Result<usize> {
        if self.open_files.iter().flatten().any(|&d| d == descriptor_index) {
            return Err(Error::AlreadyOpen);
        }
        let slot = self.open_files.iter().position(|s| s.is_none()).ok_or(Error::TooManyOpen)?;
        self.open_files[slot] = Some(descriptor_index);
        Ok(slot)
    }

    pub(crate) fn close_slot(&mut self, handle: usize) -> Result<()> {
        let slot = self.open_files.get_mut(handle).ok_or(Error::BadHandle)?;
        if slot.is_none() {
            return Err(Error::BadHandle);
        }
        *slot = None;
        Ok(())
    }

    pub(crate) fn handle_descriptor(&self, handle: usize) -> Result<u16> {
        self.open_files.get(handle).copied().flatten().ok_or(Error::BadHandle)
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.dev.flush()
    }
}
