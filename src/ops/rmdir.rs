// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::FileType;
use crate::result::{Error, Result};
use crate::volume::Volume;

/// Removes an empty directory (§4.8 rmdir). Refuses non-empty
/// directories — `size > 2` means entries beyond the mandatory `.`/`..`
/// pair are still present.
pub(crate) fn rmdir(volume: &mut Volume, path: &str) -> Result<()> {
    let resolved = volume.resolve(path)?;
    if resolved.name.is_empty() {
        return Err(Error::PathNotFound);
    }
    let mut parent = volume.read_descriptor(resolved.dir_index)?;
    let target_index = volume.lookup(&parent, &resolved.name)?.ok_or(Error::PathNotFound)?.child;
    let target = volume.read_descriptor(target_index)?;
    if target.file_type != FileType::Directory {
        return Err(Error::TypeMismatch);
    }
    if target.size > 2 {
        return Err(Error::NotEmpty);
    }

    volume.unlink_from_directory(resolved.dir_index, &mut parent, &resolved.name)?;
    parent.links -= 1;
    volume.write_descriptor(resolved.dir_index, &parent)?;

    volume.destroy_descriptor(target_index, &target)
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
    fn refuses_non_empty_directory() {
        let (_tmp, mut volume) = mounted();
        crate::ops::mkdir(&mut volume, "/d").unwrap();
        volume.set_cwd(volume.resolve_to_descriptor("/d").unwrap());
        crate::ops::create(&mut volume, "f").unwrap();
        assert!(matches!(rmdir(&mut volume, "/d"), Err(Error::NotEmpty)));
    }

    #[test]
    fn removes_an_empty_directory() {
        let (_tmp, mut volume) = mounted();
        mkdir_and_rmdir(&mut volume);
    }

    fn mkdir_and_rmdir(volume: &mut Volume) {
        let index = crate::ops::mkdir(volume, "/d").unwrap();
        rmdir(volume, "/d").unwrap();
        let d = volume.read_descriptor(index).unwrap();
        assert_eq!(d.file_type, FileType::Empty);
        let root = volume.read_descriptor(0).unwrap();
        assert_eq!(root.links, 2);
    }
}
