// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The descriptor table: fixed-size file-descriptor records, and the
//! tagged variant ([`FileType`]) that governs how their block list is
//! interpreted (§3, §4.4, and the "Variant descriptors" design note).

use static_assertions::const_assert_eq;

use crate::block::BlockDevice;
use crate::result::{Error, Result};
use crate::superblock::Geometry;

/// Marks an unused block-address slot.
pub(crate) const UNUSED: u16 = 0xFFFF;
const_assert_eq!(UNUSED, u16::MAX);

/// The file-type tag stored in byte 0 of a descriptor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Empty = 0,
    Regular = 1,
    Directory = 2,
    Symlink = 3,
}

impl FileType {
    fn from_u8(b: u8) -> Result<FileType> {
        match b {
            0 => Ok(FileType::Empty),
            1 => Ok(FileType::Regular),
            2 => Ok(FileType::Directory),
            3 => Ok(FileType::Symlink),
            _ => Err(Error::BadImage),
        }
    }
}

/// An in-memory descriptor record: file-type, size, link count, and
/// `F` block addresses. For `Directory`, the block list is a sequence
/// of `(name-block, child-descriptor-index)` pairs rather than bare
/// data-block addresses (§3).
#[derive(Debug, Clone)]
pub(crate) struct Descriptor {
    pub(crate) file_type: FileType,
    pub(crate) size: u16,
    pub(crate) links: u8,
    pub(crate) blocks: Vec<u16>,
}

impl Descriptor {
    pub(crate) fn empty(fan_out: u16) -> Descriptor {
        Descriptor {
            file_type: FileType::Empty,
            size: 0,
            links: 0,
            blocks: vec![UNUSED; fan_out as usize],
        }
    }

    pub(crate) fn empty_directory(fan_out: u16) -> Descriptor {
        Descriptor { file_type: FileType::Directory, ..Descriptor::empty(fan_out) }
    }

    pub(crate) fn empty_regular(fan_out: u16) -> Descriptor {
        Descriptor { file_type: FileType::Regular, ..Descriptor::empty(fan_out) }
    }

    pub(crate) fn empty_symlink(fan_out: u16) -> Descriptor {
        Descriptor { file_type: FileType::Symlink, ..Descriptor::empty(fan_out) }
    }

    /// Number of live directory entry pairs (`Directory` only).
    pub(crate) fn dir_pair_count(&self) -> usize {
        self.blocks.len() / 2
    }

    /// Serializes the record, then zero-pads to `padded_len` bytes
    /// (the record's span may round up past its natural size).
    pub(crate) fn to_bytes(&self, padded_len: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(padded_len);
        buf.push(self.file_type as u8);
        buf.extend_from_slice(&self.size.to_le_bytes());
        buf.push(self.links);
        for addr in &self.blocks {
            buf.extend_from_slice(&addr.to_le_bytes());
        }
        buf.resize(padded_len, 0);
        buf
    }

    pub(crate) fn from_bytes(buf: &[u8], fan_out: u16) -> Result<Descriptor> {
        let fan_out = fan_out as usize;
        if buf.len() < 4 + 2 * fan_out {
            return Err(Error::BadImage);
        }
        let file_type = FileType::from_u8(buf[0])?;
        let size = u16::from_le_bytes([buf[1], buf[2]]);
        let links = buf[3];
        let mut blocks = Vec::with_capacity(fan_out);
        for i in 0..fan_out {
            let off = 4 + i * 2;
            blocks.push(u16::from_le_bytes([buf[off], buf[off + 1]]));
        }
        Ok(Descriptor { file_type, size, links, blocks })
    }
}

/// Reads descriptor `index` from the table.
pub(crate) fn read(dev: &mut BlockDevice, geometry: &Geometry, index: u16) -> Result<Descriptor> {
    if index >= geometry.max_files {
        return Err(Error::BadHandle);
    }
    let raw = dev.read_blocks(geometry.descriptor_offset(index), geometry.record_span)?;
    Descriptor::from_bytes(&raw, geometry.fan_out)
}

/// Writes descriptor `index` back to the table.
pub(crate) fn write(
    dev: &mut BlockDevice,
    geometry: &Geometry,
    index: u16,
    descriptor: &Descriptor,
) -> Result<()> {
    if index >= geometry.max_files {
        return Err(Error::BadHandle);
    }
    let padded_len = geometry.record_span as usize * geometry.block_size as usize;
    dev.write_blocks(geometry.descriptor_offset(index), &descriptor.to_bytes(padded_len))
}

/// Linearly scans for the first index whose file-type is `Empty`.
pub(crate) fn find_free(dev: &mut BlockDevice, geometry: &Geometry) -> Result<u16> {
    for index in 0..geometry.max_files {
        if read(dev, geometry, index)?.file_type == FileType::Empty {
            return Ok(index);
        }
    }
    Err(Error::NoFreeDescriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let mut d = Descriptor::empty_regular(10);
        d.size = 5;
        d.links = 1;
        d.blocks[0] = 7;
        let bytes = d.to_bytes(24);
        let back = Descriptor::from_bytes(&bytes, 10).unwrap();
        assert_eq!(back.file_type, FileType::Regular);
        assert_eq!(back.size, 5);
        assert_eq!(back.links, 1);
        assert_eq!(back.blocks[0], 7);
        assert_eq!(back.blocks[1], UNUSED);
    }

    #[test]
    fn rejects_bad_file_type() {
        let mut bytes = vec![0u8; 24];
        bytes[0] = 9;
        assert!(matches!(Descriptor::from_bytes(&bytes, 10), Err(Error::BadImage)));
    }
}
