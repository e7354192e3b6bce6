//! netfs server process: serve a local directory over TCP.
//!
//! ```bash
//! netfs-server --bind 0.0.0.0 --port 5050 --root /srv/data
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use netfs::{Server, ServerConfig};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "netfs-server", about = "Serve a directory over the netfs protocol")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long)]
    port: u16,

    /// Directory to serve as the storage root
    #[arg(long)]
    root: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(true)
        .init();

    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("storage root {} not accessible", args.root.display()))?;
    if !root.is_dir() {
        bail!("storage root {} is not a directory", root.display());
    }

    let config = ServerConfig::new(SocketAddr::new(args.bind, args.port), root);
    let server = Server::bind(config.clone())
        .with_context(|| format!("failed to bind {}", config.bind))?;

    info!(bind = %config.bind, root = %config.root.display(), "netfs server listening");
    server.serve()?;
    Ok(())
}
