//! `emberchat seal-key` — produce an encrypted-key JSON file.
//!
//! Generates a fresh key and IV, encrypts the given token, and writes the
//! `{iv, content, tag, key}` payload the key provider consumes.

use std::path::Path;

use emberchat_security::seal_token;
use tracing::info;

pub fn run(token: &str, out: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let sealed = seal_token(token)?;
    let json = serde_json::to_string_pretty(&sealed)?;

    match out {
        Some(path) => {
            std::fs::write(path, &json)?;
            info!(path = %path.display(), "Encrypted key written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
