use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use ollama_relay_client::api::{self, StreamOutcome};
use ollama_relay_client::transcript::Transcript;

/// Minimal terminal chat loop. All protocol logic lives in the library;
/// this binary only reads lines and prints deltas as they arrive.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url =
        std::env::var("RELAY_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    let http = reqwest::Client::new();
    let mut transcript = Transcript::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        transcript.push_user(text);

        let cancel = CancellationToken::new();
        let outcome = tokio::select! {
            outcome = api::stream_chat(&http, &base_url, &mut transcript, cancel.clone(), |delta| {
                print!("{delta}");
                let _ = std::io::stdout().flush();
            }) => outcome,
            // Ctrl-C stops the current reply, not the program.
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                StreamOutcome::Cancelled
            }
        };

        match outcome {
            StreamOutcome::Done => println!(),
            StreamOutcome::Cancelled => {
                transcript.finish();
                println!("\n[stopped]");
            }
            StreamOutcome::Failed(description) => println!("\n{description}"),
        }
    }

    Ok(())
}
