/* 📖 # Why a standalone binary?

Most users embed MockImpervaServer directly in their tests. The binary serves the same
simulation on a fixed address so that clients written in other languages, or a
provider run by hand, can be pointed at it. It runs until the process is killed.

Settings come from an optional TOML file; `--host` and `--port` override it.

Exit codes:
- 0: never, the server runs until killed
- 1: config could not be loaded or the server could not bind
*/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use imperva_mock_base::tracing::init_tracing;
use imperva_mock_engine::{MockImpervaServer, ServerConfig, load_config};
use tracing::info;

#[derive(Parser)]
#[command(name = "imperva-mock")]
#[command(about = "Serve an in-memory simulation of the Imperva REST API", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (OS-assigned when omitted)
    #[arg(long)]
    port: Option<u16>,
}

impl Cli {
    fn server_config(&self) -> imperva_mock_base::MockResult<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if self.port.is_some() {
            config.port = self.port;
        }
        Ok(config)
    }
}

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {}", e);
    }

    let cli = Cli::parse();

    let config = match cli.server_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let server = match MockImpervaServer::start_with_config(&config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!("Mock Imperva API listening on {}", server.url());
    info!(port = server.port(), "serving until terminated");

    loop {
        std::thread::park();
    }
}
