//! Interactive card selection on stdin

use combo4_core::domain::{ComboError, DeviceRecord, DeviceSelector, Result};
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Asks the operator for two card numbers
pub struct StdinSelector;

/// Prompt until a line of digits arrives
async fn ask<R: AsyncBufRead + Unpin>(reader: &mut R, prompt: &str) -> Result<u32> {
    loop {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Err(ComboError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a card number was entered",
            )));
        }

        let answer = line.trim();
        if !answer.is_empty() && answer.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(number) = answer.parse() {
                return Ok(number);
            }
        }
        println!("Please enter a numeric card number.");
    }
}

async fn ask_pair<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<(u32, u32)> {
    let first = ask(reader, "\nEnter the FIRST card number to combine (e.g., 3): ").await?;
    let second = ask(reader, "Enter the SECOND card number to combine (e.g., 4): ").await?;
    Ok((first, second))
}

#[async_trait::async_trait]
impl DeviceSelector for StdinSelector {
    async fn select(&self, devices: &[DeviceRecord]) -> Result<(u32, u32)> {
        println!("\nDetected ALSA playback cards from `aplay -l`:");
        for device in devices {
            println!("  {device}");
        }

        let mut reader = BufReader::new(tokio::io::stdin());
        ask_pair(&mut reader).await
    }
}
