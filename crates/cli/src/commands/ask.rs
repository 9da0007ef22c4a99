//! `emberchat ask` — single-message mode.

use emberchat_chat::{Speaker, TurnOutcome};
use emberchat_config::AppConfig;

pub async fn run(config: AppConfig, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = super::build_controller(&config).await;

    match controller.take_turn(message).await {
        TurnOutcome::Answered => {
            if let Some(entry) = controller.transcript().last() {
                if entry.speaker == Speaker::Bot {
                    println!("{}", entry.text);
                }
            }
            Ok(())
        }
        TurnOutcome::Ignored => Err("message is empty".into()),
        TurnOutcome::Failed => Err("all inference endpoints failed".into()),
    }
}
