//! Interactive prompts: confirmation for destructive actions, lines, and passwords.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::future::Future;
use std::io::{self, BufRead as _, IsTerminal as _, Write as _};
use std::pin::Pin;

/// Boxed future resolving to the user's answer
pub type ConfirmFuture = Pin<Box<dyn Future<Output = bool> + Send>>;

/// Asks the user to confirm before anything irreversible is sent to the gateway.
pub trait Confirmer: Send + Sync {
    /// Ask `prompt`; `true` means go ahead
    fn confirm(&self, prompt: String) -> ConfirmFuture;
}

/// Prompts on stdout and reads `y`/`N` from stdin
///
/// Anything other than `y` or `yes` (case-insensitive) declines, including EOF.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: String) -> ConfirmFuture {
        Box::pin(async move {
            match prompt_line(format!("{prompt} [y/N] ")).await {
                Ok(answer) => is_affirmative(&answer),
                Err(error) => {
                    tracing::warn!(%error, "Could not read confirmation");
                    false
                },
            }
        })
    }
}

/// Print `prompt` without a newline and read one line from stdin, without its line ending
///
/// Reads on the blocking pool through the process-wide stdin buffer, so prompts issued
/// one after another never lose piped input.
///
/// # Errors
///
/// Fails when stdout cannot be flushed or stdin cannot be read.
pub async fn prompt_line(prompt: String) -> io::Result<String> {
    tokio::task::spawn_blocking(move || -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    })
    .await
    .map_err(io::Error::other)?
}

/// Like [`prompt_line`], but typed characters are not echoed when stdin is a terminal
///
/// Piped input is read as a plain line.
///
/// # Errors
///
/// Fails when the terminal cannot be switched to raw mode, stdin cannot be read, or the
/// user interrupts with Ctrl-C.
pub async fn prompt_secret(prompt: String) -> io::Result<String> {
    if !io::stdin().is_terminal() {
        return prompt_line(prompt).await;
    }

    tokio::task::spawn_blocking(move || -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let secret = {
            let _raw = RawMode::enable()?;
            read_secret()
        };
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        secret
    })
    .await
    .map_err(io::Error::other)?
}

/// Leaves raw mode on drop
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(error) = terminal::disable_raw_mode() {
            tracing::warn!(%error, "Could not restore terminal mode");
        }
    }
}

fn read_secret() -> io::Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match apply_key(&mut secret, key) {
            SecretKey::Continue => {},
            SecretKey::Done => return Ok(secret),
            SecretKey::Interrupted => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "Input cancelled"));
            },
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SecretKey {
    Continue,
    Done,
    Interrupted,
}

fn apply_key(secret: &mut String, key: KeyEvent) -> SecretKey {
    if key.kind == KeyEventKind::Release {
        return SecretKey::Continue;
    }
    match key.code {
        KeyCode::Enter => SecretKey::Done,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SecretKey::Interrupted
        },
        KeyCode::Esc => SecretKey::Interrupted,
        KeyCode::Backspace => {
            secret.pop();
            SecretKey::Continue
        },
        KeyCode::Char(c) => {
            secret.push(c);
            SecretKey::Continue
        },
        _ => SecretKey::Continue,
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
