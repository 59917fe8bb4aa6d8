use crate::demo::{run_demo, DemoArgs};
use crate::import::{run_import, ImportArgs};
use crate::server;
use bto_housing::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "BTO Housing",
    about = "Serve and demonstrate the Build-To-Order housing application core",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Manage projects held in the configured snapshot
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },
    /// Run the application, booking and registration scenarios in-process
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ProjectsCommand {
    /// Load projects from a CSV sheet
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Projects {
            command: ProjectsCommand::Import(args),
        } => run_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
