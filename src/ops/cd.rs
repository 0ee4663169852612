// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::FileType;
use crate::result::{Error, Result};
use crate::volume::Volume;

/// Sets the current working directory to `path`'s leaf, which must
/// itself be a directory (§4.8 cd).
pub(crate) fn cd(volume: &mut Volume, path: &str) -> Result<()> {
    let index = volume.resolve_to_descriptor(path)?;
    let descriptor = volume.read_descriptor(index)?;
    if descriptor.file_type != FileType::Directory {
        return Err(Error::NotADirectory);
    }
    volume.set_cwd(index);
    Ok(())
}
