//! Tandem collaboration server binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tandem_server::{RegistryService, ServerConfig, SessionRegistry};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Server command line arguments.
#[derive(Parser, Debug)]
#[command(name = "tandem-server")]
#[command(about = "Real-time collaborative plain-text editing server")]
struct Args {
	/// Configuration file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Address to listen on, overriding the configuration file
	#[arg(short, long, value_name = "ADDR")]
	listen: Option<SocketAddr>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let mut config = match &args.config {
		Some(path) => ServerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => ServerConfig::default(),
	};
	if let Some(listen) = args.listen {
		config.listen = listen;
	}

	info!(listen = %config.listen, max_history = ?config.max_history, "starting tandem-server");

	let shutdown = CancellationToken::new();
	let registry = RegistryService::start(SessionRegistry::new(config.max_history), config.mailbox_capacity, shutdown.clone());
	let listener = TcpListener::bind(config.listen)
		.await
		.with_context(|| format!("binding {}", config.listen))?;

	let ctrl_c = shutdown.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			info!("interrupt received");
		}
		ctrl_c.cancel();
	});

	tandem_server::serve(listener, registry, shutdown).await?;
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("TANDEM_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("tandem=debug,tandem_server=debug,info")
			} else {
				EnvFilter::new("tandem=info,tandem_server=info,warn")
			}
		});

	tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
