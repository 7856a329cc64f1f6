use clap::{Parser, Subcommand};
use relm4::prelude::*;
use skipwheel::config::{self, CarouselVariant, Overrides};
use skipwheel::events::ControlCommand;
use skipwheel::gui::app::{AppInit, AppModel};
use skipwheel::sys::runtime;
use skipwheel::sys::server::SOCKET_PATH;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "skipwheel", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Postcode to list skips for (overrides the config file)
    #[arg(short = 'p', long)]
    postcode: Option<String>,

    /// Area name sent alongside the postcode
    #[arg(short = 'a', long)]
    area: Option<String>,

    /// Carousel style: wheel, spin or classic
    #[arg(short = 'v', long)]
    variant: Option<CarouselVariant>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Send a command to the running window.
    Ctl {
        #[command(subcommand)]
        command: CtlCommand,
    },
    /// Write the default config file if none exists and print its path.
    InitConfig,
}

#[derive(Subcommand, Debug, Clone)]
enum CtlCommand {
    /// Select the next skip
    Next,
    /// Select the previous skip
    Prev,
    /// Move the selection by a number of steps
    Rotate {
        #[arg(allow_hyphen_values = true)]
        steps: isize,
    },
    /// Select the skip at an index
    Goto { index: isize },
    /// Fetch the skip list again
    Reload,
}

impl From<CtlCommand> for ControlCommand {
    fn from(cmd: CtlCommand) -> Self {
        match cmd {
            CtlCommand::Next => ControlCommand::Next,
            CtlCommand::Prev => ControlCommand::Prev,
            CtlCommand::Rotate { steps } => ControlCommand::Rotate(steps),
            CtlCommand::Goto { index } => ControlCommand::GoTo(index),
            CtlCommand::Reload => ControlCommand::Reload,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Ctl { command }) => send_command(command.into()),
        Some(Commands::InitConfig) => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        None => {
            let overrides = Overrides {
                postcode: cli.postcode,
                area: cli.area,
                variant: cli.variant,
            };
            run_window(overrides);
            Ok(())
        }
    }
}

fn run_window(overrides: Overrides) {
    let config = overrides.apply(config::load_or_default());
    log::info!(
        "Starting with {} carousel for {}",
        config.carousel.variant,
        config.location.location()
    );

    let (tx, rx) = async_channel::bounded(32);
    let (request_tx, request_rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx, request_rx, config.api.clone());

    // GTK must not see our own command-line flags
    let app = RelmApp::new("org.skipwheel.skipwheel").with_args(Vec::new());

    app.run::<AppModel>(AppInit {
        config,
        overrides,
        requests: request_tx,
        events: rx,
    });
}

fn send_command(cmd: ControlCommand) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to skipwheel at {}: {}. Is the window open?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", cmd.as_line())?;

    let mut reply = String::new();
    BufReader::new(&stream).read_line(&mut reply)?;
    match reply.trim() {
        "ok" => Ok(()),
        "" => anyhow::bail!("skipwheel closed the connection without replying"),
        other => anyhow::bail!("{}", other.trim_start_matches("error: ")),
    }
}
