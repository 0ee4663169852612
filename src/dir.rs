// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directory entry scanning and mutation (§4.6).
//!
//! A directory's block list is a sequence of `(name-block,
//! child-descriptor-index)` pairs; a pair is free iff its name-block
//! is [`UNUSED`]. This module never touches the bitmap directly except
//! through [`crate::volume::Volume`], which owns it — these functions
//! take the pieces they need (device, geometry, bitmap) as arguments,
//! following the teacher's preference for free functions over a god
//! object.

use crate::bitmap::Bitmap;
use crate::block::BlockDevice;
use crate::descriptor::{Descriptor, FileType, UNUSED};
use crate::result::{Error, Result};
use crate::superblock::Geometry;

/// One resolved directory entry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub(crate) name_block: u16,
    pub(crate) child: u16,
}

/// Reads the NUL-terminated name stored in `block`.
fn read_name(dev: &mut BlockDevice, geometry: &Geometry, block: u16) -> Result<String> {
    let raw = dev.read_block(geometry.data_start + block as u64)?;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
}

/// Iterates the live `(name, entry)` pairs of `dir`, in block-list order.
pub(crate) fn entries(
    dev: &mut BlockDevice,
    geometry: &Geometry,
    dir: &Descriptor,
) -> Result<Vec<(String, Entry)>> {
    debug_assert_eq!(dir.file_type, FileType::Directory);
    let mut out = Vec::with_capacity(dir.size as usize);
    for pair in dir.blocks.chunks_exact(2) {
        let (name_block, child) = (pair[0], pair[1]);
        if name_block == UNUSED {
            continue;
        }
        let name = read_name(dev, geometry, name_block)?;
        out.push((name, Entry { name_block, child }));
    }
    Ok(out)
}

/// Looks `component` up among `dir`'s live entries by exact,
/// case-sensitive byte comparison (§4.5 step 4).
pub(crate) fn lookup(
    dev: &mut BlockDevice,
    geometry: &Geometry,
    dir: &Descriptor,
    component: &str,
) -> Result<Option<Entry>> {
    for (name, entry) in entries(dev, geometry, dir)? {
        if name == component {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// Inserts `(name, child)` into `dir` (§4.6). Truncates `name` to `B`
/// bytes minus the NUL terminator if it is too long, same as the
/// source; callers surface [`Error::NameTooLong`] as a warning, not a
/// hard failure.
pub(crate) fn link_into_directory(
    dev: &mut BlockDevice,
    geometry: &Geometry,
    bitmap: &mut Bitmap,
    dir_index: u16,
    dir: &mut Descriptor,
    name: &str,
    child: u16,
) -> Result<()> {
    debug_assert_eq!(dir.file_type, FileType::Directory);
    if dir.size as usize >= dir.dir_pair_count() {
        return Err(Error::DirFull);
    }
    let slot = dir
        .blocks
        .chunks_exact(2)
        .position(|pair| pair[0] == UNUSED)
        .ok_or(Error::DirFull)?;

    let block_size = geometry.block_size as usize;
    let max_name_len = block_size - 1;
    if name.len() > max_name_len {
        log::warn!("name {name:?} exceeds {max_name_len} bytes and was truncated");
    }
    let truncated = &name.as_bytes()[..name.len().min(max_name_len)];
    let mut buf = vec![0u8; block_size];
    buf[..truncated.len()].copy_from_slice(truncated);

    let name_block = bitmap.find_free().ok_or(Error::NoFreeBlock)?;
    bitmap.set_taken(name_block)?;
    dev.write_block(geometry.data_start + name_block, &buf)?;
    bitmap.flush(dev)?;

    dir.blocks[slot * 2] = name_block as u16;
    dir.blocks[slot * 2 + 1] = child;
    dir.size += 1;
    crate::descriptor::write(dev, geometry, dir_index, dir)
}

/// Detaches the entry named `name` from `dir`, freeing its name-block.
/// Returns the detached entry's child index. Does not touch the
/// child's own descriptor or link count — callers do that (§4.8
/// unlink/rmdir).
pub(crate) fn unlink_from_directory(
    dev: &mut BlockDevice,
    geometry: &Geometry,
    bitmap: &mut Bitmap,
    dir_index: u16,
    dir: &mut Descriptor,
    name: &str,
) -> Result<u16> {
    debug_assert_eq!(dir.file_type, FileType::Directory);
    let slot = dir
        .blocks
        .chunks_exact(2)
        .position(|pair| {
            pair[0] != UNUSED
                && read_name(dev, geometry, pair[0]).map(|n| n == name).unwrap_or(false)
        })
        .ok_or(Error::PathNotFound)?;

    let name_block = dir.blocks[slot * 2];
    let child = dir.blocks[slot * 2 + 1];
    bitmap.set_free(name_block as u64)?;
    bitmap.flush(dev)?;
    dir.blocks[slot * 2] = UNUSED;
    dir.blocks[slot * 2 + 1] = UNUSED;
    dir.size -= 1;
    crate::descriptor::write(dev, geometry, dir_index, dir)?;
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;

    fn fresh_dev_geometry() -> (BlockDevice, Geometry) {
        let f = tempfile::tempfile().unwrap();
        crate::superblock::format(f.try_clone().unwrap(), 8, 12, 10, 32).unwrap();
        let mut dev = BlockDevice::open(f, 8).unwrap();
        let geometry = Geometry::read(&mut dev, 8).unwrap();
        (dev, geometry)
    }

    #[test]
    fn link_then_lookup_round_trips() {
        let (mut dev, geometry) = fresh_dev_geometry();
        let mut bitmap =
            Bitmap::load(&mut dev, geometry.map_start, geometry.map_blocks, geometry.data_blocks as usize)
                .unwrap();
        let mut root = crate::descriptor::read(&mut dev, &geometry, 0).unwrap();
        link_into_directory(&mut dev, &geometry, &mut bitmap, 0, &mut root, "a", 1).unwrap();

        let found = lookup(&mut dev, &geometry, &root, "a").unwrap().unwrap();
        assert_eq!(found.child, 1);
        assert!(lookup(&mut dev, &geometry, &root, "missing").unwrap().is_none());
    }

    #[test]
    fn unlink_frees_the_name_block() {
        let (mut dev, geometry) = fresh_dev_geometry();
        let mut bitmap =
            Bitmap::load(&mut dev, geometry.map_start, geometry.map_blocks, geometry.data_blocks as usize)
                .unwrap();
        let mut root = crate::descriptor::read(&mut dev, &geometry, 0).unwrap();
        let name_block = link_into_directory(&mut dev, &geometry, &mut bitmap, 0, &mut root, "a", 1)
            .map(|_| root.blocks[4])
            .unwrap();

        let child = unlink_from_directory(&mut dev, &geometry, &mut bitmap, 0, &mut root, "a").unwrap();
        assert_eq!(child, 1);
        assert!(lookup(&mut dev, &geometry, &root, "a").unwrap().is_none());
        assert!(bitmap.is_free(name_block as u64).unwrap());
    }

    #[test]
    fn dir_full_when_pairs_exhausted() {
        let (mut dev, geometry) = fresh_dev_geometry();
        let mut bitmap =
            Bitmap::load(&mut dev, geometry.map_start, geometry.map_blocks, geometry.data_blocks as usize)
                .unwrap();
        let mut root = crate::descriptor::read(&mut dev, &geometry, 0).unwrap();
        // root already has `.` and `..`; fan_out=10 gives 5 pairs total, 3 free.
        for i in 0..3u16 {
            link_into_directory(&mut dev, &geometry, &mut bitmap, 0, &mut root, &format!("f{i}"), i + 2)
                .unwrap();
        }
        let err = link_into_directory(&mut dev, &geometry, &mut bitmap, 0, &mut root, "overflow", 9);
        assert!(matches!(err, Err(Error::DirFull)));
    }
}
