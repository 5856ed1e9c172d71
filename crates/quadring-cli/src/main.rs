//! Quadring terminal front end.
//!
//! ```text
//! quadring relay --bind 0.0.0.0:9000
//! quadring play --server ws://relay.example:9000 --name "Lobo Veloz"
//! ```

mod command;
mod render;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use quadring::prelude::*;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, HELP};

#[derive(Parser, Debug)]
#[command(name = "quadring", version, about = "Two-player ring strategy game")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run a matchmaking relay
    Relay(RelayArgs),
    /// Connect to a relay and play matches until you quit
    Play(PlayArgs),
}

#[derive(Args, Debug)]
struct RelayArgs {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:9000")]
    bind: String,

    /// Seconds a new connection has to say hello
    #[arg(long, default_value_t = 5)]
    handshake_timeout: u64,

    /// Seconds of silence before a player is dropped
    #[arg(long, default_value_t = 600)]
    idle_timeout: u64,
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Relay URL
    #[arg(short, long, default_value = "ws://127.0.0.1:9000")]
    server: String,

    /// Display name (random if omitted)
    #[arg(short, long)]
    name: Option<String>,

    /// Seconds to wait for the relay connection
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), QuadringError> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Mode::Relay(args) => run_relay(args).await,
        Mode::Play(args) => play(args).await,
    }
}

async fn run_relay(args: RelayArgs) -> Result<(), QuadringError> {
    let config = RelayConfig::default()
        .with_bind_addr(args.bind)
        .with_handshake_timeout(Duration::from_secs(args.handshake_timeout))
        .with_idle_timeout(Duration::from_secs(args.idle_timeout));

    let server = RelayServer::builder().config(config).build().await?;
    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted, relay stopping"),
    }
    Ok(())
}

/// How a single match loop ended.
#[derive(Debug, PartialEq, Eq)]
enum MatchExit {
    /// The match is over; the player may start another.
    Over,
    /// The player quit, hit ctrl-c, or closed stdin.
    Quit,
}

async fn play(args: PlayArgs) -> Result<(), QuadringError> {
    let mut config = ClientConfig::default()
        .with_server_url(args.server)
        .with_connect_timeout(Duration::from_secs(args.connect_timeout));
    if let Some(name) = args.name {
        config = config.with_name(name);
    }

    let mut client = PeerClient::connect(&config).await?;
    println!("You are {} ({}).", client.name(), client.player_id());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("Looking for an opponent...");
        let mut session = tokio::select! {
            session = client.find_match() => session?,
            _ = tokio::signal::ctrl_c() => return Ok(()),
        };
        let exit = play_match(&mut session, &mut lines).await;

        client = match session.leave().await {
            Ok(client) => client,
            Err(e) => {
                println!("lost the relay: {e}");
                return Ok(());
            }
        };
        if matches!(exit, MatchExit::Quit) || !play_again(&mut lines).await {
            break;
        }
    }

    if let Err(e) = client.disconnect("bye").await {
        tracing::debug!(error = %e, "disconnect failed");
    }
    Ok(())
}

/// Drives one match until it ends or the player walks away. Connection
/// failures are printed; the caller still leaves and disconnects.
async fn play_match<Conn, R>(session: &mut MatchSession<Conn>, lines: &mut Lines<R>) -> MatchExit
where
    Conn: quadring::transport::Connection,
    R: AsyncBufRead + Unpin,
{
    println!("{}", render::match_header(session.start_status()));
    println!("{}", render::render_match(session.game()));
    println!("type `help` for commands");

    while !session.game().is_finished() {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return MatchExit::Quit,

            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => return MatchExit::Quit,
                    Err(e) => {
                        tracing::error!(error = %e, "cannot read input");
                        return MatchExit::Quit;
                    }
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => return MatchExit::Quit,
                    Ok(command) => {
                        if let Err(e) = run_command(session, command).await {
                            println!("match aborted: {e}");
                            return MatchExit::Over;
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }

            event = session.next_event() => {
                match event {
                    Ok(SessionEvent::RemoteMoved(movement)) => {
                        println!("opponent {}", render::describe(&movement));
                        println!("{}", render::render_match(session.game()));
                    }
                    Ok(SessionEvent::OpponentEscaped) => {
                        println!("{}", render::render_match(session.game()));
                    }
                    Err(e) => {
                        println!("match aborted: {e}");
                        return MatchExit::Over;
                    }
                }
            }
        }
    }
    MatchExit::Over
}

async fn play_again<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> bool {
    println!("play again? [y/n]");
    match lines.next_line().await {
        Ok(Some(answer)) => answer.trim().to_ascii_lowercase().starts_with('y'),
        _ => false,
    }
}

/// Runs one in-match command. Refused actions are printed and the match
/// goes on; only connection failures propagate.
async fn run_command<Conn>(
    session: &mut MatchSession<Conn>,
    command: Command,
) -> Result<(), QuadringError>
where
    Conn: quadring::transport::Connection,
{
    let result = match command {
        Command::Place { ring, at } => session.place_ring(ring, at).await,
        Command::Move { from, to } => session.move_cell_content(from, to).await,
        Command::Moves { from } => {
            let targets = session.game().board().legal_destinations(from);
            println!("{}", render::destinations(from, &targets));
            return Ok(());
        }
        Command::Board => {
            println!("{}", render::render_match(session.game()));
            return Ok(());
        }
        Command::Help => {
            println!("{HELP}");
            return Ok(());
        }
        Command::Quit => return Ok(()),
    };

    match result {
        Ok(_) => println!("{}", render::render_match(session.game())),
        Err(QuadringError::Session(e)) => println!("{e}"),
        Err(e) => return Err(e),
    }
    Ok(())
}
