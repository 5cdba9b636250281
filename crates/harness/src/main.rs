//! WardSnap CLI - capture visual snapshots of the WardView console.
//!
//! Exit codes: 0 full success, 1 run failure (first fatal step error or
//! missing artifacts), 2 setup failure before any capture (server startup,
//! readiness, browser launch, invalid scenario selection).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::error;

use wardsnap_browser::{Session, SessionConfig};
use wardsnap_harness::scenario::ScenarioGroup;
use wardsnap_harness::{flows, orchestrate};
use wardsnap_harness::{ArtifactWriter, HarnessError, HarnessResult, ServerHandle};

#[derive(Parser, Debug)]
#[command(name = "wardsnap")]
#[command(author, version, about = "Visual snapshot capture harness for the WardView console")]
struct Cli {
    /// Directory of static application files to serve
    #[arg(long, env = "WARDSNAP_APP_DIR", default_value = "webapp")]
    app_dir: PathBuf,

    /// Root directory for captured screenshots
    #[arg(long, env = "WARDSNAP_OUTPUT_DIR", default_value = "screenshots")]
    output: PathBuf,

    /// Port for the static server (0 = ephemeral loopback port)
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// Run only the named scenario groups, in declared order (repeatable)
    #[arg(long = "group")]
    groups: Vec<String>,

    /// List declared groups, steps and artifact paths, then exit
    #[arg(long)]
    list: bool,

    /// Run with a visible browser window for local debugging
    #[arg(long)]
    headed: bool,

    /// Browser executable override
    #[arg(long, env = "WARDSNAP_CHROME")]
    chrome: Option<PathBuf>,

    /// Per-action wait budget in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Server readiness budget in milliseconds
    #[arg(long, default_value_t = 10000)]
    ready_timeout_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    let groups = match select_groups(flows::declared_groups(), &cli.groups) {
        Ok(groups) => groups,
        Err(e) => {
            error!("{e}");
            return 2;
        }
    };

    let writer = ArtifactWriter::new(&cli.output);

    if cli.list {
        list_flows(&groups, &writer);
        return 0;
    }

    // Scoped acquisition: server first, then session; both released on
    // every path below.
    let server = match ServerHandle::start(&cli.app_dir, cli.port).await {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            return 2;
        }
    };

    if let Err(e) = server
        .wait_until_ready(Duration::from_millis(cli.ready_timeout_ms))
        .await
    {
        error!("{e}");
        let _ = server.stop().await;
        return 2;
    }

    let session_config = SessionConfig {
        headless: !cli.headed,
        executable: cli.chrome.clone(),
        ..SessionConfig::default()
    };
    let session = match Session::open(session_config).await {
        Ok(session) => session,
        Err(e) => {
            error!("{e}");
            let _ = server.stop().await;
            return 2;
        }
    };

    let base_url = server.base_url().to_string();
    orchestrate::execute(
        session,
        server,
        &writer,
        base_url,
        Duration::from_millis(cli.timeout_ms),
        &groups,
    )
    .await
}

/// Keep only the named groups, preserving declared order. No names means
/// the full declared run.
fn select_groups(
    all: Vec<ScenarioGroup>,
    names: &[String],
) -> HarnessResult<Vec<ScenarioGroup>> {
    if names.is_empty() {
        return Ok(all);
    }
    for name in names {
        if !all.iter().any(|g| &g.name == name) {
            return Err(HarnessError::InvalidScenario(format!(
                "unknown group '{name}'"
            )));
        }
    }
    Ok(all
        .into_iter()
        .filter(|g| names.contains(&g.name))
        .collect())
}

fn list_flows(groups: &[ScenarioGroup], writer: &ArtifactWriter) {
    for group in groups {
        println!("{} ({})", group.name, group.viewport.name);
        for step in &group.steps {
            if step.capture {
                println!(
                    "  {:02} {} -> {}",
                    step.ordinal,
                    step.name,
                    writer.path_for(&group.name, step.ordinal, &step.name).display()
                );
            } else {
                println!("  {:02} {}", step.ordinal, step.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_groups_defaults_to_full_run() {
        let selected = select_groups(flows::declared_groups(), &[]).unwrap();
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn select_groups_preserves_declared_order() {
        let names = vec!["features".to_string(), "desktop".to_string()];
        let selected = select_groups(flows::declared_groups(), &names).unwrap();
        let got: Vec<&str> = selected.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(got, ["desktop", "features"]);
    }

    #[test]
    fn select_groups_rejects_unknown_name() {
        let names = vec!["nope".to_string()];
        let err = select_groups(flows::declared_groups(), &names).err().unwrap();
        assert!(matches!(err, HarnessError::InvalidScenario(_)));
    }
}
