//! A small CLI for poking at a FAT volume image: list a directory or dump a
//! file's contents to stdout.
//!
//! Modeled on the teacher's `examples/fat32-fs-std/src/main.rs` demo binary:
//! `clap` for argument parsing, `log`/`env_logger` for diagnostics, one
//! subcommand per operation.
use clap::{Parser, Subcommand};
use fatview::FatError;

#[derive(Parser)]
#[command(name = "fatview-inspect", about = "Inspect a FAT12/16/32 volume image")]
struct Cli {
    /// Path to the volume image.
    image: std::path::PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the contents of a directory.
    Ls {
        /// Absolute path of the directory to list.
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print a file's contents to stdout.
    Cat {
        /// Absolute path of the file to read.
        path: String,
    },
    /// Print the volume's BPB geometry and FAT type.
    Stat,
}

fn main() -> std::process::ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fatview-inspect: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Host(#[from] fatview::host::HostError),
    #[error(transparent)]
    Fat(#[from] FatError),
    #[error("{path} is larger ({size} bytes) than this demo's in-memory buffer")]
    FileTooLarge { path: String, size: u32 },
}

fn run(cli: &Cli) -> Result<(), DemoError> {
    let owned = fatview::host::OwnedVolume::load(&cli.image)?;
    let volume = owned.volume()?;
    log::info!("opened {:?} as {:?}", cli.image, volume.fat_type());

    match &cli.command {
        Command::Stat => {
            println!("fat_type: {:?}", volume.fat_type());
            println!("bytes_per_sector: {}", volume.bpb().bytes_per_sector());
            println!("sectors_per_cluster: {}", volume.bpb().sectors_per_cluster());
            println!("cluster_size: {}", volume.bpb().cluster_size());
            println!("used_bytes: {}", volume.used_bytes()?);
        }
        Command::Ls { path } => {
            volume.list_dir(path, |entry| {
                let kind = if entry.attr & fatview::ATTR_DIRECTORY != 0 { "dir " } else { "file" };
                println!("{kind}  {:>10}  {}", entry.file_size, entry.name);
                fatview::WalkControl::Continue
            })?;
        }
        Command::Cat { path } => {
            let entry = volume.search_entry(path)?;
            if entry.is_directory() {
                return Err(DemoError::Fat(FatError::NotADirectory));
            }
            const MAX_DEMO_FILE: usize = 16 * 1024 * 1024;
            if entry.file_size as usize > MAX_DEMO_FILE {
                return Err(DemoError::FileTooLarge {
                    path: path.clone(),
                    size: entry.file_size,
                });
            }
            let mut buf = vec![0u8; entry.file_size as usize];
            let n = volume.read_whole_file(&entry, &mut buf)?;
            use std::io::Write;
            std::io::stdout().write_all(&buf[..n]).ok();
        }
    }
    Ok(())
}
