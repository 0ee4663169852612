// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::Descriptor;
use crate::result::{Error, Result};
use crate::volume::Volume;

/// Creates a directory at `path`, pre-populated with the mandatory `.`
/// and `..` entries (§3, §4.8 mkdir). Fails with [`Error::AlreadyExists`]
/// if `path`'s leaf already names an entry in its parent — `mkdir` is
/// the one operation §7 calls that out for.
pub(crate) fn mkdir(volume: &mut Volume, path: &str) -> Result<u16> {
    let resolved = volume.resolve(path)?;
    let mut parent = volume.read_descriptor(resolved.dir_index)?;
    if volume.lookup(&parent, &resolved.name)?.is_some() {
        return Err(Error::AlreadyExists);
    }

    let new_index = volume.find_free_descriptor()?;
    let fan_out = volume.geometry().fan_out;
    let mut dir = Descriptor::empty_directory(fan_out);
    dir.links = 2;
    volume.write_descriptor(new_index, &dir)?;

    // ".." first, then "." — mirrors the source's pair ordering (§4.8).
    volume.link_into_directory(new_index, &mut dir, "..", resolved.dir_index)?;
    volume.link_into_directory(new_index, &mut dir, ".", new_index)?;

    volume.link_into_directory(resolved.dir_index, &mut parent, &resolved.name, new_index)?;
    parent.links += 1;
    volume.write_descriptor(resolved.dir_index, &parent)?;
    Ok(new_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FileType;

    fn mounted() -> (tempfile::NamedTempFile, Volume) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        crate::superblock::format(tmp.reopen().unwrap(), 8, 12, 10, 32).unwrap();
        (tmp, Volume::mount(tmp.path()).unwrap())
    }

    #[test]
    fn mkdir_populates_dot_and_dotdot() {
        let (_tmp, mut volume) = mounted();
        let index = mkdir(&mut volume, "/d").unwrap();
        let dir = volume.read_descriptor(index).unwrap();
        assert_eq!(dir.file_type, FileType::Directory);
        assert_eq!(dir.size, 2);
        assert_eq!(dir.links, 2);
        assert_eq!(volume.lookup(&dir, ".").unwrap().unwrap().child, index);
        assert_eq!(volume.lookup(&dir, "..").unwrap().unwrap().child, 0);
    }

    #[test]
    fn mkdir_over_existing_name_fails() {
        let (_tmp, mut volume) = mounted();
        mkdir(&mut volume, "/d").unwrap();
        assert!(matches!(mkdir(&mut volume, "/d"), Err(Error::AlreadyExists)));
    }
}
