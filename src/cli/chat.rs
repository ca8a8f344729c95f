use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::api::chat_service;
use crate::core::AppConfig;

const LOCAL_SESSION_ID: &str = "terminal";

pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    let chat = chat_service(&config);
    let mut rl = DefaultEditor::new()?;

    println!(
        "Chatting with deployment {}. Type /clear to start over.",
        config.deployment
    );

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                if line.trim() == "/clear" {
                    chat.clear(LOCAL_SESSION_ID).await?;
                    println!("Cleared.");
                    continue;
                }

                let transcript = chat.send(LOCAL_SESSION_ID, &line).await?;
                if let Some(msg) = transcript.messages().last() {
                    println!("{}", msg.content());
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
