//! One-shot analysis from the command line; prints the response JSON to stdout.
//!
//! ```text
//! analyze <subject> [location]
//! analyze --app <app_id>
//! ```
//!
//! Logs go to stderr (RUST_LOG controls the level) so stdout stays parseable.

use anyhow::{bail, Context};
use platform_sentiment::assemble::{assemble_flat, Role};
use platform_sentiment::config::AppConfig;
use platform_sentiment::Pipeline;
use tracing_subscriber::EnvFilter;

enum Command {
    Subject { subject: String, location: Option<String> },
    App(String),
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    match args {
        [flag, app] if flag == "--app" => Ok(Command::App(app.clone())),
        [flag, ..] if flag == "--app" => bail!("--app takes exactly one app id"),
        [subject] => Ok(Command::Subject {
            subject: subject.clone(),
            location: None,
        }),
        [subject, location] => Ok(Command::Subject {
            subject: subject.clone(),
            location: Some(location.clone()),
        }),
        _ => bail!("usage: analyze <subject> [location] | analyze --app <app_id>"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = parse_args(&args)?;

    let cfg = AppConfig::load_default()?;
    let pipeline = Pipeline::from_config(&cfg)?;

    let (role, report) = match cmd {
        Command::Subject {
            subject,
            location: Some(loc),
        } => (Role::News, pipeline.analyze_with_location(&subject, &loc).await?),
        Command::Subject { subject, .. } => (Role::News, pipeline.analyze(&subject).await?),
        Command::App(app) => (Role::Reviews, pipeline.analyze_app_reviews(&app).await?),
    };

    let out = serde_json::to_string_pretty(&assemble_flat(role, &report))
        .context("serializing result")?;
    println!("{out}");
    Ok(())
}
