// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The engine's public contract (§4.1): one mounted-image slot, and one
//! entry point per file operation. This is the only place that checks
//! whether a volume is mounted at all — everything below takes an
//! already-mounted [`crate::volume::Volume`] and assumes it exists.

use std::fs::OpenOptions;
use std::path::Path;

use crate::ops;
use crate::result::{Error, Result};
use crate::superblock::{self, DEFAULT_BLOCK_SIZE, DEFAULT_DATA_BLOCKS, DEFAULT_FAN_OUT, DEFAULT_MAX_FILES};
use crate::volume::Volume;

pub use crate::ops::{FileStat, LsEntry};

/// Process-wide mount state (§5: "exactly one mount at a time").
#[derive(Default)]
pub struct Engine {
    volume: Option<Volume>,
}

impl Engine {
    pub fn new() -> Engine {
        Engine { volume: None }
    }

    fn volume_mut(&mut self) -> Result<&mut Volume> {
        self.volume.as_mut().ok_or(Error::NotMounted)
    }

    /// Creates a fresh image at `path` with the §6 defaults (B=8, M=12,
    /// F=10, 128 data blocks).
    pub fn format(path: &Path) -> Result<()> {
        Self::format_with(path, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_FILES, DEFAULT_FAN_OUT, DEFAULT_DATA_BLOCKS)
    }

    /// Creates a fresh image with a caller-chosen geometry (SPEC_FULL.md §D).
    pub fn format_with(
        path: &Path,
        block_size: u16,
        max_files: u16,
        fan_out: u16,
        data_blocks: u64,
    ) -> Result<()> {
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
        superblock::format(file, block_size, max_files, fan_out, data_blocks)
    }

    /// Mounts the image at `path`. Fails with [`Error::AlreadyMounted`]
    /// if a volume is already mounted (§5).
    pub fn mount(&mut self, path: &Path) -> Result<()> {
        if self.volume.is_some() {
            return Err(Error::AlreadyMounted);
        }
        let volume = Volume::mount(path)?;
        log::debug!("mounted {}", path.display());
        self.volume = Some(volume);
        Ok(())
    }

    /// Releases the mounted image. Fails with [`Error::NotMounted`] if
    /// nothing is mounted.
    pub fn umount(&mut self) -> Result<()> {
        let mut volume = self.volume.take().ok_or(Error::NotMounted)?;
        volume.flush()
    }

    pub fn is_mounted(&self) -> bool {
        self.volume.is_some()
    }

    pub fn filestat(&mut self, desc_index: u16) -> Result<FileStat> {
        ops::filestat(self.volume_mut()?, desc_index)
    }

    pub fn ls(&mut self) -> Result<Vec<LsEntry>> {
        ops::ls(self.volume_mut()?)
    }

    pub fn create(&mut self, path: &str) -> Result<u16> {
        ops::create(self.volume_mut()?, path)
    }

    pub fn open(&mut self, path: &str) -> Result<usize> {
        ops::open(self.volume_mut()?, path)
    }

    pub fn close(&mut self, handle: usize) -> Result<()> {
        ops::close(self.volume_mut()?, handle)
    }

    pub fn read(&mut self, handle: usize, offset: u32, size: u32) -> Result<Vec<u8>> {
        ops::read(self.volume_mut()?, handle, offset, size)
    }

    pub fn write(&mut self, handle: usize, offset: u32, bytes: &[u8]) -> Result<()> {
        ops::write(self.volume_mut()?, handle, offset, bytes)
    }

    pub fn link(&mut self, existing_path: &str, new_path: &str) -> Result<()> {
        ops::link(self.volume_mut()?, existing_path, new_path)
    }

    pub fn unlink(&mut self, path: &str) -> Result<()> {
        ops::unlink(self.volume_mut()?, path)
    }

    pub fn mkdir(&mut self, path: &str) -> Result<u16> {
        ops::mkdir(self.volume_mut()?, path)
    }

    pub fn rmdir(&mut self, path: &str) -> Result<()> {
        ops::rmdir(self.volume_mut()?, path)
    }

    pub fn cd(&mut self, path: &str) -> Result<()> {
        ops::cd(self.volume_mut()?, path)
    }

    pub fn pwd(&mut self) -> Result<u16> {
        ops::pwd(self.volume_mut()?)
    }

    pub fn symlink(&mut self, target_text: &str, link_name: &str) -> Result<()> {
        ops::symlink(self.volume_mut()?, target_text, link_name)
    }

    pub fn truncate(&mut self, path: &str, size: u32) -> Result<()> {
        ops::truncate(self.volume_mut()?, path, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn fresh_image() -> NamedTempFile {
        let tmp = NamedTempFile::new().unwrap();
        Engine::format(tmp.path()).unwrap();
        tmp
    }

    #[test]
    fn mount_twice_fails() {
        let tmp = fresh_image();
        let mut engine = Engine::new();
        engine.mount(tmp.path()).unwrap();
        assert!(matches!(engine.mount(tmp.path()), Err(Error::AlreadyMounted)));
    }

    #[test]
    fn unmounted_ops_fail() {
        let mut engine = Engine::new();
        assert!(matches!(engine.ls(), Err(Error::NotMounted)));
        assert!(matches!(engine.umount(), Err(Error::NotMounted)));
    }

    #[test]
    fn create_write_read_round_trip() {
        let tmp = fresh_image();
        let mut engine = Engine::new();
        engine.mount(tmp.path()).unwrap();
        engine.create("/a").unwrap();
        let h = engine.open("/a").unwrap();
        engine.write(h, 0, b"hello").unwrap();
        engine.close(h).unwrap();
        let h = engine.open("/a").unwrap();
        let data = engine.read(h, 0, 5).unwrap();
        assert_eq!(data, b"hello");
    }
}
