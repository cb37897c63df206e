mod owner;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use fragments_core::{
    ErrorResponse, Fragment, FragmentError, FragmentRecord, Fragments, FragmentsBuilder,
    FragmentsConfig, OwnerId, SuccessResponse,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::owner::{DEFAULT_HASH_SECRET, owner_from_email};

/// Store files as fragments for one owner, list them, and read them back.
///
/// Storage is in-memory, so everything happens within a single run.
#[derive(Debug, Parser)]
#[command(name = "fragments", version)]
struct Cli {
    /// Email of the (already authenticated) user.
    #[arg(long, env = "FRAGMENTS_EMAIL")]
    email: String,

    /// Secret used to derive the owner id from the email.
    #[arg(long, env = "HASH_SECRET", default_value = DEFAULT_HASH_SECRET, hide_env_values = true)]
    hash_secret: String,

    /// JSON config file (supported_types, max_payload_bytes).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Content-Type for every input. Guessed from the file extension when omitted.
    #[arg(long = "type")]
    content_type: Option<String>,

    /// Read fragments back converted to this extension (e.g. `html`, `txt`).
    #[arg(long)]
    ext: Option<String>,

    /// List full records instead of ids.
    #[arg(long)]
    expand: bool,

    /// Input files; `-` reads stdin.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_tracing() {
    // RUST_LOG first, then the LOG_LEVEL variable older deployments set.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FragmentsConfig> {
    let Some(path) = path else {
        return Ok(FragmentsConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    FragmentsConfig::from_json_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn guess_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("md" | "markdown") => "text/markdown",
        Some("html" | "htm") => "text/html",
        Some("json") => "application/json",
        _ => "text/plain",
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_error(err: &FragmentError) -> anyhow::Result<()> {
    match err.kind().status_code() {
        500 => tracing::error!(error = %err, "request failed"),
        _ => tracing::warn!(error = %err, "request rejected"),
    }
    print_json(&ErrorResponse::from(err))
}

/// The record plus the extensions it can be read back with.
fn print_fragment(fragments: &Fragments, record: &FragmentRecord) -> anyhow::Result<()> {
    let extensions = fragments.engine().extensions_for(&record.fragment_type);
    print_json(&SuccessResponse::new(json!({
        "fragment": record,
        "extensions": extensions,
    })))
}

async fn create_all(
    fragments: &Fragments,
    owner: &OwnerId,
    cli: &Cli,
) -> anyhow::Result<Vec<Fragment>> {
    let mut created = Vec::new();
    for path in &cli.files {
        let data = read_input(path)?;
        let content_type = cli.content_type.as_deref().unwrap_or_else(|| guess_type(path));
        tracing::info!(file = %path.display(), content_type, bytes = data.len(), "creating fragment");

        match fragments.create(owner, content_type, data).await {
            Ok(fragment) => {
                print_fragment(fragments, fragment.record())?;
                created.push(fragment);
            }
            Err(err) => print_error(&err)?,
        }
    }
    Ok(created)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // (A) 設定を読み込んでサービスを組み立てる
    let config = load_config(cli.config.as_deref())?;
    let fragments = FragmentsBuilder::new().config(config).build()?;
    let owner = owner_from_email(&cli.email, &cli.hash_secret)?;

    // (B) 入力ごとに fragment を作成
    let created = create_all(&fragments, &owner, &cli).await?;

    // (C) 一覧
    match fragments.list(&owner, cli.expand).await {
        Ok(list) => print_json(&SuccessResponse::new(json!({ "fragments": list })))?,
        Err(err) => print_error(&err)?,
    }

    // (D) 変換付きで読み出す
    let mut stdout = std::io::stdout().lock();
    for fragment in &created {
        match fragments.read(&owner, fragment.id(), cli.ext.as_deref()).await {
            Ok(Some(out)) => {
                writeln!(stdout, "--- {} ({})", fragment.id(), out.content_type)?;
                stdout.write_all(&out.bytes)?;
                writeln!(stdout)?;
            }
            Ok(None) => tracing::warn!(id = %fragment.id(), "fragment vanished before read"),
            Err(err) => print_error(&err)?,
        }
    }

    Ok(())
}
