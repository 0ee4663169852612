// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::{FileType, UNUSED};
use crate::result::{Error, Result};
use crate::volume::Volume;

/// Overwrites or extends a regular file starting at `offset` (§4.8
/// write). `offset` must not exceed the current size; blocks the write
/// touches that aren't yet allocated are allocated on demand.
pub(crate) fn write(volume: &mut Volume, handle: usize, offset: u32, bytes: &[u8]) -> Result<()> {
    let descriptor_index = volume.handle_descriptor(handle)?;
    let mut descriptor = volume.read_descriptor(descriptor_index)?;
    if descriptor.file_type != FileType::Regular {
        return Err(Error::TypeMismatch);
    }
    if offset > descriptor.size as u32 {
        return Err(Error::RangeError);
    }

    let block_size = volume.geometry().block_size as u32;
    let fan_out = descriptor.blocks.len() as u32;
    let end = offset.checked_add(bytes.len() as u32).ok_or(Error::RangeError)?;
    let max_size = fan_out * block_size;
    if end > max_size {
        return Err(Error::RangeError);
    }

    let mut pos = offset;
    let mut written = 0usize;
    while pos < end {
        let block_number = (pos / block_size) as usize;
        let within = (pos % block_size) as usize;
        let take = ((end - pos) as usize).min(block_size as usize - within);

        if descriptor.blocks[block_number] == UNUSED {
            let addr = volume.alloc_block()?;
            descriptor.blocks[block_number] = addr;
        }
        let addr = descriptor.blocks[block_number];

        let mut block = volume.read_data_block(addr)?;
        block[within..within + take].copy_from_slice(&bytes[written..written + take]);
        volume.write_data_block(addr, &block)?;

        pos += take as u32;
        written += take;
    }

    descriptor.size = descriptor.size.max(end as u16);
    volume.write_descriptor(descriptor_index, &descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted() -> (tempfile::NamedTempFile, Volume) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        crate::superblock::format(tmp.reopen().unwrap(), 8, 12, 10, 32).unwrap();
        let volume = Volume::mount(tmp.path()).unwrap();
        (tmp, volume)
    }

    #[test]
    fn write_extends_across_a_block_boundary() {
        let (_tmp, mut volume) = mounted();
        let index = crate::ops::create(&mut volume, "/a").unwrap();
        let h = volume.open_slot(index).unwrap();
        write(&mut volume, h, 0, b"0123456789ABCDE").unwrap();
        let d = volume.read_descriptor(index).unwrap();
        assert_eq!(d.size, 15);
        assert_eq!(d.blocks.iter().filter(|&&b| b != UNUSED).count(), 2);
    }

    #[test]
    fn offset_past_size_is_rejected() {
        let (_tmp, mut volume) = mounted();
        let index = crate::ops::create(&mut volume, "/a").unwrap();
        let h = volume.open_slot(index).unwrap();
        assert!(matches!(write(&mut volume, h, 5, b"x"), Err(Error::RangeError)));
    }
}
