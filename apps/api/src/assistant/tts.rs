//! Thin wrapper over the system text-to-speech engine.
//!
//! The engine is an external collaborator invoked as a configured command
//! (default `espeak-ng`). Speech failure is logged and never fails the
//! request that triggered it.

use tracing::error;

/// Speaking rate in words per minute.
const RATE_WPM: u32 = 120;

pub async fn speak(command: &str, text: &str) {
    let result = tokio::process::Command::new(command)
        .arg("-s")
        .arg(RATE_WPM.to_string())
        .arg(text)
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {}
        Ok(output) => error!("TTS command '{command}' exited with {}", output.status),
        Err(e) => error!("error in text-to-speech: {e}"),
    }
}
