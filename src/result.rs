// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Crate-wide error type.
//!
//! One variant per failure kind in the engine's error taxonomy; see
//! the module docs on [`crate::Engine`] for the operations that can
//! return each of them.

use thiserror::Error;

/// Everything that can go wrong while driving the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no image is mounted")]
    NotMounted,
    #[error("an image is already mounted; umount first")]
    AlreadyMounted,
    #[error("image file is too small or has an invalid superblock")]
    BadImage,
    #[error("no such file or directory")]
    PathNotFound,
    #[error("not a directory")]
    NotADirectory,
    #[error("already exists")]
    AlreadyExists,
    #[error("descriptor table is full")]
    NoFreeDescriptor,
    #[error("no free data blocks remain")]
    NoFreeBlock,
    #[error("directory has no free entry slots")]
    DirFull,
    #[error("name exceeds the block size and was truncated")]
    NameTooLong,
    #[error("offset or size is out of range")]
    RangeError,
    #[error("open-file table is full")]
    TooManyOpen,
    #[error("file is already open")]
    AlreadyOpen,
    #[error("handle does not refer to an open file")]
    BadHandle,
    #[error("directory is not empty")]
    NotEmpty,
    #[error("operation does not apply to this file type")]
    TypeMismatch,
    #[error("symlink resolution exceeded the hop limit")]
    SymlinkLoop,
    #[error("I/O error on the backing image: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
