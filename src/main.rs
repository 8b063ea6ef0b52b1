use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use game_stock::csv::{read_commands, write_accounts, write_listings};
use game_stock::{Store, StoreConfig};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: game-stock <commands.csv> [store.toml]");
        return ExitCode::from(2);
    };

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let config = match args.next() {
        Some(config_path) => match StoreConfig::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => StoreConfig::default(),
    };

    let commands = match read_commands(Path::new(&path)) {
        Ok(commands) => commands,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut store = Store::new(config);
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if cmd_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    store.run(ReceiverStream::new(cmd_receiver)).await;
    store.expire_discounts();

    let listings = store.listings();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = write_listings(&mut out, &listings)
        .and_then(|()| writeln!(out).map_err(Into::into))
        .and_then(|()| write_accounts(&mut out, store.accounts()));

    if let Err(e) = written {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
