// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::result::Result;
use crate::volume::Volume;

/// Resolves `path` to a descriptor and reserves the lowest-index free
/// open-file slot for it (§4.8 open).
pub(crate) fn open(volume: &mut Volume, path: &str) -> Result<usize> {
    let descriptor_index = volume.resolve_to_descriptor(path)?;
    volume.open_slot(descriptor_index)
}
