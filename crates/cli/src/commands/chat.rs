//! `emberchat chat` — interactive terminal chat session.
//!
//! Reads from stdin, writes to stdout. Each submitted line runs one full
//! turn through the conversation controller.

use emberchat_chat::Speaker;
use emberchat_config::AppConfig;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = super::build_controller(&config).await;

    println!("Welcome! How can I assist you today?");
    println!("(type 'exit' or 'quit' to leave)");

    let stdin = io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }

                // Check for exit commands
                if matches!(line.as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q") {
                    break;
                }

                controller.take_turn(&line).await;

                if let Some(entry) = controller.transcript().last() {
                    match entry.speaker {
                        Speaker::Bot => println!("Bot: {}", entry.text),
                        Speaker::Error => println!("Error"),
                        Speaker::User => {}
                    }
                }
            }
            Ok(None) => break, // EOF (Ctrl+D)
            Err(e) => {
                eprintln!("stdin error: {e}");
                break;
            }
        }
    }

    Ok(())
}
