// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File operations, one module per command (§4.8), mirroring the
//! one-file-per-command layout the teacher uses for its REPL verbs.
//! Every function here takes an already-mounted [`crate::volume::Volume`]
//! — [`crate::engine::Engine`] is the only place that checks whether a
//! volume is mounted at all.

mod cd;
mod close;
mod create;
mod filestat;
mod link;
mod ls;
mod mkdir;
mod open;
mod pwd;
mod read;
mod rmdir;
mod symlink;
mod truncate;
mod unlink;
mod write;

pub(crate) use cd::cd;
pub(crate) use close::close;
pub(crate) use create::create;
pub(crate) use filestat::{filestat, FileStat};
pub(crate) use link::link;
pub(crate) use ls::{ls, LsEntry};
pub(crate) use mkdir::mkdir;
pub(crate) use open::open;
pub(crate) use pwd::pwd;
pub(crate) use read::read;
pub(crate) use rmdir::rmdir;
pub(crate) use symlink::symlink;
pub(crate) use truncate::truncate;
pub(crate) use unlink::unlink;
pub(crate) use write::write;
