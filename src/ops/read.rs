// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::{FileType, UNUSED};
use crate::result::{Error, Result};
use crate::volume::Volume;

/// Reads exactly `size` bytes starting at `offset` (§4.8 read). Uses
/// inclusive-start `[offset, offset+size)` semantics throughout — the
/// source's `shift <= readSize` comparison drops the first byte when
/// `shift == 0` on some paths (§9); this does not reproduce that bug.
pub(crate) fn read(volume: &mut Volume, handle: usize, offset: u32, size: u32) -> Result<Vec<u8>> {
    let descriptor_index = volume.handle_descriptor(handle)?;
    let descriptor = volume.read_descriptor(descriptor_index)?;
    if descriptor.file_type != FileType::Regular {
        return Err(Error::TypeMismatch);
    }
    let size_u32 = descriptor.size as u32;
    let end = offset.checked_add(size).ok_or(Error::RangeError)?;
    if end > size_u32 {
        return Err(Error::RangeError);
    }

    let block_size = volume.geometry().block_size as u32;
    let mut out = Vec::with_capacity(size as usize);
    let mut pos = offset;
    while pos < end {
        let block_number = pos / block_size;
        let within = (pos % block_size) as usize;
        let addr = descriptor.blocks[block_number as usize];
        if addr == UNUSED {
            return Err(Error::BadImage);
        }
        let block = volume.read_data_block(addr)?;
        let take = ((end - pos) as usize).min(block_size as usize - within);
        out.extend_from_slice(&block[within..within + take]);
        pos += take as u32;
    }
    Ok(out)
}
