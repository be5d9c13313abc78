use clap::Parser;

use crate::config::Settings;
use crate::error::Result;
use crate::pipeline;
use crate::server::{self, ServerConfig};

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
  #[clap(subcommand)]
  subcmd: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
  /// Run once and exit: status 0 on success, 1 on failure
  Run(RunArgs),
  /// Serve the run over HTTP for schedulers that invoke a URL
  Serve(ServerConfig),
}

#[derive(Parser)]
struct RunArgs {
  #[clap(flatten)]
  settings: Settings,
}

impl Cli {
  pub async fn run(self) -> Result<()> {
    match self.subcmd {
      SubCommand::Run(run_args) => {
        let (status, body) = pipeline::invoke(&run_args.settings).await;
        println!("{body}");
        if !status.is_success() {
          std::process::exit(1);
        }
        Ok(())
      }
      SubCommand::Serve(server_config) => server::serve(server_config).await,
    }
  }
}
