// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::Descriptor;
use crate::result::{Error, Result};
use crate::volume::Volume;

/// Creates a symlink named `link_name` in the current working directory
/// whose target text is `target_text` (§4.8 symlink).
///
/// Target blocks are allocated and filled, and `link_into_directory`
/// is attempted, before the descriptor is committed as non-`Empty` —
/// mirroring `create`'s fix, a descriptor written before it is
/// reachable from root would orphan it (I4) if the insert then failed.
/// Since filling the target can itself allocate several blocks before
/// a later one fails (`NoFreeBlock`), or the directory insert can fail
/// after all of them succeeded (`DirFull`/`NoFreeBlock`), every block
/// acquired so far is freed on any such failure (§4.10).
pub(crate) fn symlink(volume: &mut Volume, target_text: &str, link_name: &str) -> Result<()> {
    let target_bytes = target_text.as_bytes();
    let block_size = volume.geometry().block_size as usize;
    let fan_out = volume.geometry().fan_out as usize;
    let chunk_count = target_bytes.len().div_ceil(block_size);
    if chunk_count > fan_out {
        return Err(Error::RangeError);
    }

    let mut descriptor = Descriptor::empty_symlink(volume.geometry().fan_out);
    descriptor.size = target_bytes.len() as u16;
    descriptor.links = 1;

    let mut acquired = Vec::with_capacity(chunk_count);
    for (i, chunk) in target_bytes.chunks(block_size).enumerate() {
        let addr = match volume.alloc_block() {
            Ok(addr) => addr,
            Err(e) => return Err(release(volume, acquired, e)),
        };
        acquired.push(addr);
        let mut buf = vec![0u8; block_size];
        buf[..chunk.len()].copy_from_slice(chunk);
        if let Err(e) = volume.write_data_block(addr, &buf) {
            return Err(release(volume, acquired, e));
        }
        descriptor.blocks[i] = addr;
    }

    let new_index = match volume.find_free_descriptor() {
        Ok(index) => index,
        Err(e) => return Err(release(volume, acquired, e)),
    };
    let cwd_index = volume.cwd();
    let mut cwd = match volume.read_descriptor(cwd_index) {
        Ok(cwd) => cwd,
        Err(e) => return Err(release(volume, acquired, e)),
    };
    if let Err(e) = volume.link_into_directory(cwd_index, &mut cwd, link_name, new_index) {
        return Err(release(volume, acquired, e));
    }

    volume.write_descriptor(new_index, &descriptor)
}

/// Frees every block in `acquired` (best effort) and returns `err` —
/// the rollback half of the all-or-nothing contract in §4.10.
fn release(volume: &mut Volume, acquired: Vec<u16>, err: Error) -> Error {
    for addr in acquired {
        let _ = volume.free_block(addr);
    }
    err
}
