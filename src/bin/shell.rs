// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The interactive line-oriented shell (§1 "out of scope" for the
//! core, §6 "Shell commands"). This binary is the only consumer of
//! [`blockfs::Engine`]'s public contract; it owns tokenization, result
//! printing, and process exit, none of which the engine itself knows
//! about.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use blockfs::{Engine, Error, FileType};
use clap::Parser;

/// A small UNIX-style filesystem shell backed by a single image file.
#[derive(Parser)]
#[command(name = "blockfs-shell", version, about)]
struct Args {
    /// Block size for `format`'s default geometry.
    #[arg(long, default_value_t = blockfs::DEFAULT_BLOCK_SIZE)]
    block_size: u16,
    /// Descriptor table capacity for `format`'s default geometry.
    #[arg(long, default_value_t = blockfs::DEFAULT_MAX_FILES)]
    max_files: u16,
    /// Per-file block fan-out for `format`'s default geometry.
    #[arg(long, default_value_t = blockfs::DEFAULT_FAN_OUT)]
    fan_out: u16,
    /// Data-area size (in blocks) for `format`'s default geometry.
    #[arg(long, default_value_t = blockfs::DEFAULT_DATA_BLOCKS)]
    data_blocks: u64,
    /// Mount this image before reading commands.
    image: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut engine = Engine::new();
    if let Some(path) = &args.image {
        match engine.mount(path) {
            Ok(()) => println!("mounted {}", path.display()),
            Err(e) => eprintln!("mount failed: {e}"),
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else { continue };
        let rest: Vec<&str> = words.collect();

        if matches!(command, "exit" | "q") {
            break;
        }
        if let Err(e) = dispatch(&mut engine, command, &rest, &args) {
            println!("error: {e}");
        }
    }
}

fn dispatch(engine: &mut Engine, command: &str, rest: &[&str], args: &Args) -> blockfs::Result<()> {
    match (command, rest) {
        ("format", [path]) => {
            Engine::format_with(path.as_ref(), args.block_size, args.max_files, args.fan_out, args.data_blocks)?;
            println!("formatted {path}");
        }
        ("mount", [path]) => {
            engine.mount(path.as_ref())?;
            println!("mounted {path}");
        }
        ("umount", []) => {
            engine.umount()?;
            println!("unmounted");
        }
        ("filestat", [desc]) => {
            let desc = parse_u16(desc)?;
            let stat = engine.filestat(desc)?;
            println!("type={} size={} links={}", type_name(stat.file_type), stat.size, stat.links);
        }
        ("ls", []) => {
            for entry in engine.ls()? {
                println!("{}\t{}\t{}", entry.descriptor_index, type_name(entry.file_type), entry.name);
            }
        }
        ("create", [path]) => {
            let index = engine.create(path)?;
            println!("created {path} as descriptor {index}");
        }
        ("open", [path]) => {
            let handle = engine.open(path)?;
            println!("open: handle {handle}");
        }
        ("close", [handle]) => {
            engine.close(parse_handle(handle)?)?;
            println!("closed {handle}");
        }
        ("read", [handle, offset, size]) => {
            let bytes = engine.read(parse_handle(handle)?, parse_u32(offset)?, parse_u32(size)?)?;
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        ("write", [handle, offset, text_words @ ..]) if !text_words.is_empty() => {
            let text = text_words.join(" ");
            engine.write(parse_handle(handle)?, parse_u32(offset)?, text.as_bytes())?;
            println!("wrote {} bytes", text.len());
        }
        ("link", [existing, new]) => {
            engine.link(existing, new)?;
            println!("linked {existing} -> {new}");
        }
        ("unlink", [path]) => {
            engine.unlink(path)?;
            println!("unlinked {path}");
        }
        ("truncate", [path, size]) => {
            engine.truncate(path, parse_u32(size)?)?;
            println!("truncated {path} to {size}");
        }
        ("mkdir", [path]) => {
            engine.mkdir(path)?;
            println!("created directory {path}");
        }
        ("rmdir", [path]) => {
            engine.rmdir(path)?;
            println!("removed directory {path}");
        }
        ("cd", [path]) => {
            engine.cd(path)?;
            println!("cwd is now descriptor {}", engine.pwd()?);
        }
        ("pwd", []) => {
            println!("{}", engine.pwd()?);
        }
        ("symlink", [target, link]) => {
            engine.symlink(target, link)?;
            println!("symlinked {link} -> {target}");
        }
        _ => println!("error: unrecognized command or wrong argument count: {command}"),
    }
    Ok(())
}

fn type_name(ft: FileType) -> &'static str {
    match ft {
        FileType::Empty => "empty",
        FileType::Regular => "regular",
        FileType::Directory => "directory",
        FileType::Symlink => "symlink",
    }
}

fn parse_u16(s: &str) -> blockfs::Result<u16> {
    s.parse().map_err(|_| Error::RangeError)
}

fn parse_u32(s: &str) -> blockfs::Result<u32> {
    s.parse().map_err(|_| Error::RangeError)
}

fn parse_handle(s: &str) -> blockfs::Result<usize> {
    s.parse().map_err(|_| Error::BadHandle)
}
