//! netfs client CLI: inspect a remote tree without mounting it.
//!
//! ```bash
//! netfs --server 10.0.0.1:5050 attr /a.txt
//! netfs --server 10.0.0.1:5050 ls /
//! netfs --server 10.0.0.1:5050 cat /a.txt --offset 5 --count 100
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netfs::client::DEFAULT_POOL_SIZE;
use netfs::RemoteFs;
use std::io::Write;
use std::net::ToSocketAddrs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "netfs", about = "Query a netfs server")]
struct Cli {
    /// Server address, host:port
    #[arg(long)]
    server: String,

    /// Maximum pooled connections
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE)]
    pool_size: usize,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print file attributes
    Attr { path: PathBuf },

    /// List directory entries
    Ls { path: PathBuf },

    /// Print file contents to stdout
    Cat {
        path: PathBuf,

        /// Byte offset to start reading at
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Bytes to read (defaults to the file's size)
        #[arg(long)]
        count: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let addr = cli
        .server
        .to_socket_addrs()
        .with_context(|| format!("cannot resolve {}", cli.server))?
        .next()
        .with_context(|| format!("no address for {}", cli.server))?;

    let fs = RemoteFs::new(addr, cli.pool_size);

    match cli.cmd {
        Command::Attr { path } => {
            let attrs = fs
                .get_attributes(&path)
                .with_context(|| format!("getattr {} failed", path.display()))?;
            println!("mode:  {:o}", attrs.mode);
            println!("nlink: {}", attrs.nlink);
            println!("uid:   {}", attrs.uid);
            println!("gid:   {}", attrs.gid);
            println!("size:  {}", attrs.size);
            println!("atime: {}", attrs.atime);
            println!("mtime: {}", attrs.mtime);
            println!("ctime: {}", attrs.ctime);
        }
        Command::Ls { path } => {
            let names = fs
                .list_directory(&path)
                .with_context(|| format!("readdir {} failed", path.display()))?;
            for name in names {
                println!("{}", name.to_string_lossy());
            }
        }
        Command::Cat {
            path,
            offset,
            count,
        } => {
            let count = match count {
                Some(count) => count,
                None => {
                    let attrs = fs
                        .get_attributes(&path)
                        .with_context(|| format!("getattr {} failed", path.display()))?;
                    u64::from(attrs.size).saturating_sub(offset)
                }
            };
            let data = fs
                .read_bytes(&path, offset, count)
                .with_context(|| format!("read {} failed", path.display()))?;
            std::io::stdout().write_all(&data)?;
        }
    }
    Ok(())
}
