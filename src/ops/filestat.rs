// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::FileType;
use crate::result::Result;
use crate::volume::Volume;

/// A snapshot of a descriptor's metadata, for `filestat` (§4.1).
#[derive(Debug, Clone, Copy)]
pub struct FileStat {
    pub file_type: FileType,
    pub size: u16,
    pub links: u8,
}

pub(crate) fn filestat(volume: &mut Volume, desc_index: u16) -> Result<FileStat> {
    let descriptor = volume.read_descriptor(desc_index)?;
    Ok(FileStat { file_type: descriptor.file_type, size: descriptor.size, links: descriptor.links })
}
