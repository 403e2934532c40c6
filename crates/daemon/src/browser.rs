//! Best-effort browser launch for the UI URL

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Give the server a moment to start accepting connections
const STARTUP_DELAY: Duration = Duration::from_millis(500);

/// Try each candidate browser command in turn; print the URL if none starts
pub async fn open_browser(url: String) {
    tokio::time::sleep(STARTUP_DELAY).await;

    for candidate in browsers() {
        let mut parts = candidate.split_whitespace();
        let Some(program) = parts.next() else {
            continue;
        };

        let spawned = Command::new(program)
            .args(parts)
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn();
        match spawned {
            Ok(_) => {
                debug!(browser = %candidate, "Opened browser");
                return;
            }
            Err(e) => debug!(browser = %candidate, error = %e, "Browser not available"),
        }
    }

    println!("Open {} in your browser.", url);
}

/// Candidate commands, most specific first
fn browsers() -> Vec<String> {
    let mut cmds = Vec::new();
    if let Ok(user_browser) = std::env::var("BROWSER") {
        if !user_browser.is_empty() {
            cmds.push(user_browser);
        }
    }

    if cfg!(target_os = "macos") {
        cmds.push("/usr/bin/open".to_string());
    } else if cfg!(windows) {
        cmds.push("cmd /c start".to_string());
    } else {
        // Real browsers first; xdg-open only makes sense on a desktop session
        cmds.extend(
            ["chrome", "google-chrome", "chromium", "firefox", "sensible-browser"]
                .map(String::from),
        );
        if std::env::var_os("DISPLAY").is_some_and(|d| !d.is_empty()) {
            cmds.push("xdg-open".to_string());
        }
    }
    cmds
}
