// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios from §8 of the specification, driven entirely
//! through the public [`blockfs::Engine`] API the way `blockfs-shell`
//! would, default geometry B=8, M=12, F=10.

use blockfs::{Engine, Error, FileType};
use tempfile::NamedTempFile;

fn fresh_engine() -> (NamedTempFile, Engine) {
    let tmp = NamedTempFile::new().unwrap();
    Engine::format(tmp.path()).unwrap();
    let mut engine = Engine::new();
    engine.mount(tmp.path()).unwrap();
    (tmp, engine)
}

#[test]
fn scenario_1_create_write_read() {
    let (_tmp, mut engine) = fresh_engine();
    engine.create("/a").unwrap();
    let h = engine.open("/a").unwrap();
    engine.write(h, 0, b"hello").unwrap();
    engine.close(h).unwrap();

    let h = engine.open("/a").unwrap();
    let data = engine.read(h, 0, 5).unwrap();
    assert_eq!(data, b"hello");

    let a_index = engine
        .ls()
        .unwrap()
        .into_iter()
        .find(|e| e.name == "a")
        .map(|e| e.descriptor_index)
        .unwrap();
    let stat = engine.filestat(a_index).unwrap();
    assert_eq!(stat.size, 5);
    assert_eq!(stat.links, 1);
    assert_eq!(stat.file_type, FileType::Regular);
}

#[test]
fn scenario_2_hard_link_semantics() {
    let (_tmp, mut engine) = fresh_engine();
    engine.create("/a").unwrap();
    engine.link("/a", "/b").unwrap();

    let a_index = engine.ls().unwrap().into_iter().find(|e| e.name == "a").unwrap().descriptor_index;
    assert_eq!(engine.filestat(a_index).unwrap().links, 2);

    engine.unlink("/a").unwrap();
    assert_eq!(engine.filestat(a_index).unwrap().links, 1);
    assert_eq!(engine.filestat(a_index).unwrap().file_type, FileType::Regular);

    engine.unlink("/b").unwrap();
    assert_eq!(engine.filestat(a_index).unwrap().file_type, FileType::Empty);
}

#[test]
fn scenario_3_symlink_hop_limit() {
    let (_tmp, mut engine) = fresh_engine();
    engine.symlink("/x", "/s1").unwrap();
    engine.symlink("/s1", "/s2").unwrap();
    engine.symlink("/s2", "/s3").unwrap();
    engine.symlink("/s3", "/s4").unwrap();
    engine.symlink("/s4", "/s5").unwrap();

    assert!(matches!(engine.open("/s5"), Err(Error::SymlinkLoop)));
}

#[test]
fn scenario_4_rmdir_on_non_empty() {
    let (_tmp, mut engine) = fresh_engine();
    engine.mkdir("/d").unwrap();
    engine.cd("/d").unwrap();
    engine.create("f").unwrap();
    engine.cd("/").unwrap();

    assert!(matches!(engine.rmdir("/d"), Err(Error::NotEmpty)));

    engine.unlink("/d/f").unwrap();
    engine.rmdir("/d").unwrap();
    assert!(engine.ls().unwrap().iter().all(|e| e.name != "d"));
}

#[test]
fn scenario_5_write_extends_across_block_boundary() {
    let (_tmp, mut engine) = fresh_engine();
    engine.create("/a").unwrap();
    let h = engine.open("/a").unwrap();
    engine.write(h, 0, b"0123456789ABCDE").unwrap();

    let a_index = engine.ls().unwrap().into_iter().find(|e| e.name == "a").unwrap().descriptor_index;
    assert_eq!(engine.filestat(a_index).unwrap().size, 15);

    let data = engine.read(h, 7, 5).unwrap();
    assert_eq!(data, b"789AB");
}

#[test]
fn scenario_6_bitmap_saturation_then_recovery() {
    // A tiny data area (4 blocks: 2 for root's `.`/`..`, 2 left over)
    // saturates on name-blocks alone, well before the root directory's
    // own F/2 = 5 entry pairs or the descriptor table run out.
    let tmp = NamedTempFile::new().unwrap();
    Engine::format_with(tmp.path(), 8, 12, 10, 4).unwrap();
    let mut engine = Engine::new();
    engine.mount(tmp.path()).unwrap();

    engine.create("/f0").unwrap();
    engine.create("/f1").unwrap();
    assert!(matches!(engine.create("/f2"), Err(Error::NoFreeBlock)));

    engine.unlink("/f0").unwrap();
    engine.create("/f2").unwrap();
}

#[test]
fn round_trip_format_mount_umount_mount() {
    let tmp = NamedTempFile::new().unwrap();
    Engine::format(tmp.path()).unwrap();

    let mut engine = Engine::new();
    engine.mount(tmp.path()).unwrap();
    assert!(engine.ls().unwrap().iter().any(|e| e.name == "."));
    engine.umount().unwrap();

    engine.mount(tmp.path()).unwrap();
    let entries = engine.ls().unwrap();
    assert!(entries.iter().any(|e| e.name == "."));
    assert!(entries.iter().any(|e| e.name == ".."));
    engine.umount().unwrap();
}

#[test]
fn double_mount_is_rejected() {
    let (tmp, mut engine) = fresh_engine();
    assert!(matches!(engine.mount(tmp.path()), Err(Error::AlreadyMounted)));
}

#[test]
fn ops_before_mount_fail() {
    let mut engine = Engine::new();
    assert!(matches!(engine.ls(), Err(Error::NotMounted)));
    assert!(matches!(engine.create("/a"), Err(Error::NotMounted)));
}
