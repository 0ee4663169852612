// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::FileType;
use crate::result::{Error, Result};
use crate::volume::Volume;

/// One entry as reported by `ls` (§4.1).
#[derive(Debug, Clone)]
pub struct LsEntry {
    pub name: String,
    pub descriptor_index: u16,
    pub file_type: FileType,
}

/// Enumerates the entries of the current working directory.
pub(crate) fn ls(volume: &mut Volume) -> Result<Vec<LsEntry>> {
    let dir = volume.read_descriptor(volume.cwd())?;
    if dir.file_type != FileType::Directory {
        return Err(Error::NotADirectory);
    }
    let mut out = Vec::with_capacity(dir.size as usize);
    for (name, entry) in volume.entries(&dir)? {
        let child = volume.read_descriptor(entry.child)?;
        out.push(LsEntry { name, descriptor_index: entry.child, file_type: child.file_type });
    }
    Ok(out)
}
