//! Chat example — minimal completion REPL.
//!
//! One session against an OpenAI-compatible completions endpoint: each
//! line becomes a user turn, the reply is printed with its timestamp,
//! and `reset` wipes the conversation. Repeated failures trigger a
//! short cooldown instead of hammering the backend.
//!
//! Run with:
//! ```sh
//! COMPLETIONS_URL=http://localhost:8000/v1/completions \
//!     cargo run -p confab-session --example chat
//! ```

use confab_session::{Session, SessionError};
use llm::{Client, HttpCompletion, Options};
use std::io::{BufRead, Write};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let endpoint = std::env::var("COMPLETIONS_URL")
        .unwrap_or_else(|_| "http://localhost:8000/v1/completions".into());
    let model = std::env::var("COMPLETIONS_MODEL").unwrap_or_else(|_| "model".into());

    let provider = HttpCompletion::no_auth(Client::new(), &endpoint, &model);
    let session = Session::new(provider);
    let options = Options::default();

    println!("Chat REPL (type 'exit' to quit, 'reset' to clear)");
    println!("---");
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        if std::io::stdin().lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }
        if input == "reset" {
            session.clear().ok();
            println!("(conversation cleared)");
            continue;
        }

        match session.submit(input, &options).await {
            Ok(reply) => {
                println!("{}", reply.content);
                println!("  [{} | {} messages]", reply.timestamp.format("%H:%M:%S"), session.len());
            }
            Err(SessionError::InvalidInput(reason)) => println!("(rejected: {reason})"),
            Err(err) => {
                eprintln!("Error: {err}");
                if err.escalated() {
                    eprintln!("Backend looks unhealthy, cooling down...");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }
    Ok(())
}

/// Initialize tracing with env-filter support.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
