// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::descriptor::Descriptor;
use crate::result::Result;
use crate::volume::Volume;

/// Creates an empty regular file at `path` (§4.8 create). The source
/// allows creating over an existing name (§7 AlreadyExists applies
/// only to `mkdir`), so this does not check for a pre-existing entry —
/// it simply adds another directory pair, shadowing nothing since
/// directory entries aren't keyed for uniqueness at this layer.
///
/// The directory insert happens before the descriptor is written as
/// `Regular`: `link_into_directory` fails cleanly (`DirFull` or
/// `NoFreeBlock`) without touching the descriptor table, so inserting
/// first keeps a failed create from leaving an orphaned non-`Empty`
/// descriptor that `find_free_descriptor` would then skip forever (I4).
pub(crate) fn create(volume: &mut Volume, path: &str) -> Result<u16> {
    let resolved = volume.resolve(path)?;
    let new_index = volume.find_free_descriptor()?;

    let mut dir = volume.read_descriptor(resolved.dir_index)?;
    volume.link_into_directory(resolved.dir_index, &mut dir, &resolved.name, new_index)?;

    let fan_out = volume.geometry().fan_out;
    let mut descriptor = Descriptor::empty_regular(fan_out);
    descriptor.links = 1;
    volume.write_descriptor(new_index, &descriptor)?;
    Ok(new_index)
}
