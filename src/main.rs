use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use mvi_core::config::MviConfig;
use mvi_core::logging::init_tracing;
use mvi_core::sample::{counter_processor, CounterEffect, CounterEvent, CounterState};
use mvi_core::{consume_state_effect, Scope};

/// Interactive counter driven through an MVI processor.
#[derive(Debug, Parser)]
#[command(name = "mvi-counter", version)]
struct Args {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Event(CounterEvent),
    Quit,
    Unknown,
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "+" | "inc" => Command::Event(CounterEvent::Increase),
        "-" | "dec" => Command::Event(CounterEvent::Decrease),
        "next" => Command::Event(CounterEvent::NavigateToSecondScreen),
        "q" | "quit" => Command::Quit,
        _ => Command::Unknown,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => MviConfig::load_or_default(path)?,
        None => MviConfig::default(),
    };
    init_tracing(&config.logging);

    let scope = Scope::new();
    let processor = counter_processor(&scope.handle(), config.processor.clone());
    let consumption = consume_state_effect(
        &scope.handle(),
        processor,
        |state: CounterState| println!("value = {}", state.value),
        |effect: CounterEffect| match effect {
            CounterEffect::NavigateToSecondScreen => println!("-> second screen"),
        },
        Vec::new(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Command::Event(event) => consumption.send_event(event),
                    Command::Quit => break,
                    Command::Unknown => {
                        tracing::warn!(input = %line.trim(), "Unknown command (use +, -, next, quit)");
                    }
                }
            }
        }
    }

    scope.cancel();
    tracing::info!("Counter stopped");
    Ok(())
}
