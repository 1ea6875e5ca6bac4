//! `postgate compose`: A terminal composer with the gate in front of "post".
//!
//! Each line typed is a draft. Pressing Enter goes through the same
//! interception path a browser keydown would, against an in-memory page with
//! one composer and one post button. Whatever reaches the post button is
//! printed as posted.

use std::sync::Arc;
use std::time::Duration;

use postgate_config::{AppConfig, FileSettingsStore};
use postgate_core::ModalView;
use postgate_gate::{Disposition, Gate, HostPage, InMemoryPage, KeyPress, PageEvent, PageSession};
use postgate_providers::LlmEvaluator;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::{mpsc, watch};

const POST_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let settings = Arc::new(FileSettingsStore::new(config.settings_file()));
    let evaluator = Arc::new(LlmEvaluator::from_config(&config.provider));
    let gate = Arc::new(Gate::new(evaluator, settings));

    let page = Arc::new(InMemoryPage::new());
    let composer = page.add_element(Some("tweetTextarea_0"));
    page.add_element(Some("tweetButton"));

    let (posted_tx, mut posted_rx) = mpsc::unbounded_channel::<String>();
    let weak = Arc::downgrade(&page);
    let composer_id = composer.id;
    page.on_click(move |_| {
        if let Some(page) = weak.upgrade() {
            let text = page.text_content(composer_id).unwrap_or_default();
            let _ = posted_tx.send(text);
        }
    });

    let session = PageSession::new(page.clone(), config.selectors.clone(), gate.clone());
    session.start();
    let mut view = gate.subscribe();

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║          PostGate — Terminal Composer        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.provider.model);
    println!("  Settings:  {}", config.settings_file().display());
    println!();
    println!("  Type a post and press Enter to send it.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    while let Some(line) = prompt(&mut lines, "  Post > ").await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if is_exit(&line) {
            break;
        }

        page.set_text(composer.id, line);
        let event = PageEvent::KeyDown {
            key: KeyPress::enter(),
            focused: Some(composer.clone()),
            trusted: true,
        };
        if session.dispatch(&event) != Disposition::Suppress {
            continue;
        }

        let current = settled(&mut view).await?;
        if current.awaiting_decision() && !decide(&gate, &current, &mut lines).await? {
            println!("  Discarded.\n");
            continue;
        }

        match tokio::time::timeout(POST_TIMEOUT, posted_rx.recv()).await {
            Ok(Some(text)) => println!("  📤 Posted: {text}\n"),
            _ => println!("  Nothing was posted.\n"),
        }
    }

    session.close();
    println!();
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}

async fn prompt(
    lines: &mut Lines<BufReader<Stdin>>,
    label: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    use std::io::Write;
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

fn is_exit(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

/// Wait until the dialog leaves the loading state.
async fn settled(
    view: &mut watch::Receiver<ModalView>,
) -> Result<ModalView, Box<dyn std::error::Error>> {
    if view.borrow().loading {
        let current = view.borrow();
        eprintln!("  ⏳ {} {}", current.title(), current.description());
    }
    let current = view.wait_for(|v| !v.loading).await?;
    Ok(current.clone())
}

/// Show the blocked dialog. Returns true when the user sent anyway.
async fn decide(
    gate: &Gate,
    view: &ModalView,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool, Box<dyn std::error::Error>> {
    println!();
    println!("  🚫 {}", view.title());
    println!("     {}", view.description());
    if let Some(reason) = &view.reason {
        println!("     Reason: {reason}");
    }
    println!();

    let answer = prompt(lines, "  [s]end anyway / [c]lose > ").await?;
    match answer.as_deref().map(str::trim) {
        Some("s") | Some("send") => Ok(gate.send_anyway()),
        _ => {
            gate.dismiss();
            Ok(false)
        }
    }
}
