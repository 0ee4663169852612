// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `blockfs` — a small UNIX-style filesystem that lives entirely
//! inside a single backing file treated as a block device.
//!
//! [`Engine`] is the public contract (§4.1 of the specification): it
//! owns the mount state and exposes one method per file operation. The
//! layers below it — [`block`], [`bitmap`], [`descriptor`], [`path`],
//! [`dir`], [`superblock`] — never touch mount state themselves; they
//! take the pieces they need (a device, a geometry, a bitmap) as plain
//! arguments, and [`volume::Volume`] stitches them together into the
//! one mounted-image value the engine holds.

mod bitmap;
mod block;
mod descriptor;
mod dir;
mod engine;
mod ops;
mod path;
mod result;
mod superblock;
mod volume;

pub use descriptor::FileType;
pub use engine::{Engine, FileStat, LsEntry};
pub use result::{Error, Result};
pub use superblock::{DEFAULT_BLOCK_SIZE, DEFAULT_DATA_BLOCKS, DEFAULT_FAN_OUT, DEFAULT_MAX_FILES};
