//! pprofit-ctl - Command-line client for a running pprofit server

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

#[derive(Parser)]
#[command(name = "pprofit-ctl")]
#[command(about = "pprofit command-line client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the pprofit server
    ///
    /// The server picks a free port unless started with an explicit address;
    /// copy the `PPROFIT_URL=` line it logs at startup.
    #[arg(long, env = "PPROFIT_URL", default_value = DEFAULT_SERVER_URL)]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved profiles, newest first
    List,

    /// Fetch a profile from a URL and save it
    Save {
        /// Profile type (heap, goroutine, profile, trace, ...)
        #[arg(short = 't', long = "type")]
        profile_type: String,

        /// Where to fetch it from, e.g. http://localhost:6060/debug/pprof/heap
        source: String,
    },

    /// Open a saved profile in its viewer
    Open {
        /// Profile name as shown by `list`
        name: String,
    },
}

#[derive(Deserialize)]
struct Profile {
    name: String,
    #[serde(rename = "type")]
    profile_type: String,
    #[serde(rename = "createdAt")]
    created_at: i64,
}

#[derive(Deserialize)]
struct ProfileList {
    profiles: Vec<Profile>,
}

#[derive(Tabled)]
struct ProfileRow {
    name: String,
    #[tabled(rename = "type")]
    profile_type: String,
    created: String,
}

impl From<Profile> for ProfileRow {
    fn from(p: Profile) -> Self {
        let created = chrono::DateTime::from_timestamp(p.created_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| p.created_at.to_string());
        Self {
            name: p.name,
            profile_type: p.profile_type,
            created,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

struct Client {
    base: String,
    http: reqwest::Client,
}

impl Client {
    fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .context("Failed to connect to pprofit server")?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let response = self
            .http
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .context("Failed to connect to pprofit server")?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            anyhow::bail!("server error ({}): {}", status.as_u16(), message);
        }
        response.json().await.context("Failed to parse response")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new(&cli.url);

    match cli.command {
        Commands::List => {
            let mut list: ProfileList = client.get("/profiles").await?;
            if list.profiles.is_empty() {
                println!("{}", "No profiles saved yet".yellow());
                return Ok(());
            }

            list.profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let rows: Vec<ProfileRow> = list.profiles.into_iter().map(Into::into).collect();
            println!("{}", Table::new(rows));
        }

        Commands::Save {
            profile_type,
            source,
        } => {
            let saved: Profile = client
                .post("/save", json!({ "url": source, "type": profile_type }))
                .await?;

            println!("{}", "✓ Profile saved".green().bold());
            println!();
            println!("{}", Table::new(vec![ProfileRow::from(saved)]));
        }

        Commands::Open { name } => {
            let _: serde_json::Value = client.post("/open", json!({ "name": name })).await?;

            println!("{}", format!("✓ Viewer started for {}", name).green().bold());
        }
    }

    Ok(())
}
