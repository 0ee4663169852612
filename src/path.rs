// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Path resolution: walk a path string through directory descriptors,
//! following symlinks with a bounded hop count (§4.5).

use crate::block::BlockDevice;
use crate::descriptor::{self, Descriptor, FileType};
use crate::result::{Error, Result};
use crate::superblock::Geometry;

/// Maximum number of symlink hops a single resolution may take before
/// failing with [`Error::SymlinkLoop`].
const MAX_SYMLINK_HOPS: u32 = 4;

/// The result of resolving a path: the index of the containing
/// directory, and the final path component's name.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub(crate) dir_index: u16,
    pub(crate) name: String,
}

/// Reads the target text stored in a symlink descriptor.
fn read_symlink_target(dev: &mut BlockDevice, geometry: &Geometry, link: &Descriptor) -> Result<String> {
    let mut bytes = Vec::with_capacity(link.size as usize);
    let block_size = geometry.block_size as usize;
    let mut remaining = link.size as usize;
    for &addr in &link.blocks {
        if remaining == 0 {
            break;
        }
        if addr == descriptor::UNUSED {
            return Err(Error::BadImage);
        }
        let chunk = dev.read_block(geometry.data_start + addr as u64)?;
        let take = remaining.min(block_size);
        bytes.extend_from_slice(&chunk[..take]);
        remaining -= take;
    }
    String::from_utf8(bytes).map_err(|_| Error::BadImage)
}

/// Resolves `path` to `(parent directory index, leaf name)`, starting
/// from `root` if `path` is absolute, else from `cwd`.
///
/// This never fails when the final component is simply absent from its
/// parent directory — the caller decides whether that is acceptable
/// (§4.5 step 5). It does fail if an intermediate component is missing,
/// is not a directory, or if symlink resolution loops.
pub(crate) fn resolve(
    dev: &mut BlockDevice,
    geometry: &Geometry,
    root: u16,
    cwd: u16,
    path: &str,
) -> Result<Resolved> {
    let mut current = if path.starts_with('/') { root } else { cwd };
    let mut remainder: Vec<String> = path.split('/').filter(|s| !s.is_empty()).map(String::from).collect();
    if remainder.is_empty() {
        // "" or "/" — the root directory itself; callers that need a
        // leaf name for mutation reject this case themselves.
        return Ok(Resolved { dir_index: current, name: String::new() });
    }
    let mut symlink_hops = 0u32;

    loop {
        let component = remainder.remove(0);
        let dir = descriptor::read(dev, geometry, current)?;
        if dir.file_type != FileType::Directory {
            return Err(Error::NotADirectory);
        }

        let found = crate::dir::lookup(dev, geometry, &dir, &component)?;
        let is_last = remainder.is_empty();

        match found {
            None => {
                if is_last {
                    return Ok(Resolved { dir_index: current, name: component });
                }
                return Err(Error::PathNotFound);
            }
            Some(entry) => {
                let child = descriptor::read(dev, geometry, entry.child)?;
                match child.file_type {
                    FileType::Directory => {
                        if is_last {
                            return Ok(Resolved { dir_index: current, name: component });
                        }
                        current = entry.child;
                    }
                    FileType::Regular => {
                        if is_last {
                            return Ok(Resolved { dir_index: current, name: component });
                        }
                        return Err(Error::NotADirectory);
                    }
                    FileType::Symlink => {
                        symlink_hops += 1;
                        if symlink_hops > MAX_SYMLINK_HOPS {
                            return Err(Error::SymlinkLoop);
                        }
                        let target = read_symlink_target(dev, geometry, &child)?;
                        let mut spliced: Vec<String> =
                            target.split('/').filter(|s| !s.is_empty()).map(String::from).collect();
                        if target.starts_with('/') {
                            current = root;
                        }
                        spliced.extend(remainder);
                        remainder = spliced;
                        if remainder.is_empty() {
                            return Ok(Resolved { dir_index: current, name: String::new() });
                        }
                    }
                    FileType::Empty => return Err(Error::BadImage),
                }
            }
        }
    }
}

/// Resolves `path` all the way to its terminal descriptor index,
/// following a trailing symlink too (unlike [`resolve`], which stops
/// one level short). Used by `open`, `cd`, and `filestat`.
pub(crate) fn resolve_to_descriptor(
    dev: &mut BlockDevice,
    geometry: &Geometry,
    root: u16,
    cwd: u16,
    path: &str,
) -> Result<u16> {
    let resolved = resolve(dev, geometry, root, cwd, path)?;
    if resolved.name.is_empty() {
        return Ok(resolved.dir_index);
    }
    let dir = descriptor::read(dev, geometry, resolved.dir_index)?;
    let entry = crate::dir::lookup(dev, geometry, &dir, &resolved.name)?.ok_or(Error::PathNotFound)?;
    Ok(entry.child)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_dev_geometry() -> (BlockDevice, Geometry) {
        let f = tempfile::tempfile().unwrap();
        crate::superblock::format(f.try_clone().unwrap(), 8, 12, 10, 32).unwrap();
        let mut dev = BlockDevice::open(f, 8).unwrap();
        let geometry = Geometry::read(&mut dev, 8).unwrap();
        (dev, geometry)
    }

    #[test]
    fn resolves_missing_leaf_in_root() {
        let (mut dev, geometry) = fresh_dev_geometry();
        let resolved = resolve(&mut dev, &geometry, 0, 0, "/a").unwrap();
        assert_eq!(resolved.dir_index, 0);
        assert_eq!(resolved.name, "a");
    }

    #[test]
    fn missing_intermediate_component_fails() {
        let (mut dev, geometry) = fresh_dev_geometry();
        let err = resolve(&mut dev, &geometry, 0, 0, "/nope/a");
        assert!(matches!(err, Err(Error::PathNotFound)));
    }

    #[test]
    fn root_path_has_empty_leaf() {
        let (mut dev, geometry) = fresh_dev_geometry();
        let resolved = resolve(&mut dev, &geometry, 0, 0, "/").unwrap();
        assert_eq!(resolved.dir_index, 0);
        assert!(resolved.name.is_empty());
    }
}
