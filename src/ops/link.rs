// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::FileType;
use crate::result::{Error, Result};
use crate::volume::Volume;

/// Adds a hard link at `new_path` to the regular file at `existing_path`
/// (§4.8 link). Directories may not be hard-linked (§7 TypeMismatch).
///
/// The directory insert happens before the link count is bumped and
/// written back: `link_into_directory` fails cleanly (`DirFull` or
/// `NoFreeBlock`) without touching `src`, so bumping `links` only after
/// it succeeds keeps a failed link from leaving the source's on-disk
/// link count inflated with no matching directory entry (I3).
pub(crate) fn link(volume: &mut Volume, existing_path: &str, new_path: &str) -> Result<()> {
    let src_index = volume.resolve_to_descriptor(existing_path)?;
    let mut src = volume.read_descriptor(src_index)?;
    if src.file_type != FileType::Regular {
        return Err(Error::TypeMismatch);
    }

    let resolved = volume.resolve(new_path)?;
    let mut dir = volume.read_descriptor(resolved.dir_index)?;
    volume.link_into_directory(resolved.dir_index, &mut dir, &resolved.name, src_index)?;

    src.links += 1;
    volume.write_descriptor(src_index, &src)
}
