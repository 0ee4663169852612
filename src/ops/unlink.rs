// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::FileType;
use crate::result::{Error, Result};
use crate::volume::Volume;

/// Removes one directory entry, releasing the file if it was the last
/// link (§4.8 unlink). Refuses to unlink a directory — use `rmdir`.
///
/// Decrements the link count first and only destroys the descriptor
/// once it reaches zero, skipping the otherwise-redundant write the
/// source performs after an already-destroyed record (§9 design note).
pub(crate) fn unlink(volume: &mut Volume, path: &str) -> Result<()> {
    let resolved = volume.resolve(path)?;
    if resolved.name.is_empty() {
        return Err(Error::PathNotFound);
    }
    let mut dir = volume.read_descriptor(resolved.dir_index)?;
    let child_index = volume.lookup(&dir, &resolved.name)?.ok_or(Error::PathNotFound)?.child;

    let mut child = volume.read_descriptor(child_index)?;
    if child.file_type == FileType::Directory {
        return Err(Error::TypeMismatch);
    }

    volume.unlink_from_directory(resolved.dir_index, &mut dir, &resolved.name)?;

    child.links -= 1;
    if child.links == 0 {
        volume.destroy_descriptor(child_index, &child)?;
    } else {
        volume.write_descriptor(child_index, &child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted() -> (tempfile::NamedTempFile, Volume) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        crate::superblock::format(tmp.reopen().unwrap(), 8, 12, 10, 32).unwrap();
        (tmp, Volume::mount(tmp.path()).unwrap())
    }

    #[test]
    fn unlinking_last_link_empties_the_descriptor() {
        let (_tmp, mut volume) = mounted();
        let index = crate::ops::create(&mut volume, "/a").unwrap();
        unlink(&mut volume, "/a").unwrap();
        let d = volume.read_descriptor(index).unwrap();
        assert_eq!(d.file_type, FileType::Empty);
    }

    #[test]
    fn refuses_to_unlink_a_directory() {
        let (_tmp, mut volume) = mounted();
        crate::ops::mkdir(&mut volume, "/d").unwrap();
        assert!(matches!(unlink(&mut volume, "/d"), Err(Error::TypeMismatch)));
    }
}
