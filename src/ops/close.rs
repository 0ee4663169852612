// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::result::Result;
use crate::volume::Volume;

/// Releases an open-file slot (§4.8 close, §4.9 state machine).
pub(crate) fn close(volume: &mut Volume, handle: usize) -> Result<()> {
    volume.close_slot(handle)
}
