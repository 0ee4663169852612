// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::result::Result;
use crate::volume::Volume;

/// Reports the current working directory's descriptor index (§4.1:
/// "set/report the current working directory descriptor index" — the
/// engine has no notion of a reconstructed path name, only the index).
pub(crate) fn pwd(volume: &mut Volume) -> Result<u16> {
    Ok(volume.cwd())
}
