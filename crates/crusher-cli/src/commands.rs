use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use crusher_engine::{ChunkDescriptor, Chunker, EngineConfig, Lookup};
use crusher_store::{BackendKind, FolderStore};
use crusher_types::{Blob, Value};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let engine = open_engine(&cli.root, cli.config.as_deref()).await?;
    match cli.command {
        Command::Put(args) => cmd_put(&engine, args, &cli.format).await,
        Command::Get(args) => cmd_get(&engine, args, &cli.format).await,
        Command::Rm(args) => cmd_rm(&engine, args, &cli.format).await,
        Command::Inspect(args) => cmd_inspect(&engine, args, &cli.format).await,
    }
}

/// Engine settings from `path`, or the folder-store preset when no file is given.
fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::for_backend(BackendKind::FolderDocuments));
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

async fn open_engine(root: &Path, config: Option<&Path>) -> anyhow::Result<Chunker> {
    let config = load_config(config)?;
    let store = FolderStore::open(root)
        .await
        .with_context(|| format!("opening store at {}", root.display()))?;
    debug!(root = %root.display(), chunk_size = config.chunk_size, "store opened");
    Ok(Chunker::new(config, BackendKind::FolderDocuments.adapter(store))?)
}

async fn read_value(args: &PutArgs) -> anyhow::Result<Value> {
    if let Some(path) = &args.file {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let mut blob = Blob::new(bytes);
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            blob = blob.with_name(name);
        }
        if let Some(content_type) = &args.content_type {
            blob = blob.with_content_type(content_type.clone());
        }
        return Ok(Value::Blob(blob));
    }
    if let Some(doc) = &args.json {
        let parsed: serde_json::Value =
            serde_json::from_str(doc).context("parsing --json value")?;
        return Ok(Value::Structured(parsed));
    }
    match &args.value {
        Some(text) => Ok(Value::Text(text.clone())),
        None => bail!("nothing to store: give a value, --file, or --json"),
    }
}

/// Text rendering of a non-blob value.
fn render_value(value: &Value) -> anyhow::Result<String> {
    Ok(match value {
        Value::Text(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Timestamp(t) => t.to_rfc3339(),
        Value::Structured(v) => serde_json::to_string_pretty(v)?,
        Value::Blob(b) => format!("<blob, {} bytes>", b.len()),
    })
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Text(s) => serde_json::json!(s),
        Value::Number(n) => serde_json::json!(n),
        Value::Bool(b) => serde_json::json!(b),
        Value::Timestamp(t) => serde_json::json!(t.to_rfc3339()),
        Value::Structured(v) => v.clone(),
        Value::Blob(b) => serde_json::json!({
            "bytes": b.len(),
            "contentType": b.content_type,
            "name": b.name,
        }),
    }
}

async fn cmd_put(engine: &Chunker, args: PutArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let value = read_value(&args).await?;
    let kind = value.kind();
    let bytes = engine.put(args.key.as_str(), value, args.expire).await?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "key": args.key, "kind": kind, "bytes": bytes })
        ),
        OutputFormat::Text if bytes == 0 => {
            println!("{} {} unchanged", "=".dimmed(), args.key.bold())
        }
        OutputFormat::Text => println!(
            "{} Stored {} ({}, {} bytes)",
            "✓".green().bold(),
            args.key.bold(),
            kind.cyan(),
            bytes
        ),
    }
    Ok(())
}

async fn cmd_get(engine: &Chunker, args: GetArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let value = match engine.lookup(args.key.as_str()).await? {
        Lookup::Found(value) => value,
        Lookup::Absent => bail!("{} not found", args.key),
        Lookup::Expired { .. } => bail!("{} has expired", args.key),
    };

    if let (Value::Blob(blob), Some(out)) = (&value, &args.out) {
        tokio::fs::write(out, &blob.bytes)
            .await
            .with_context(|| format!("writing {}", out.display()))?;
        println!(
            "{} Wrote {} bytes to {}",
            "✓".green().bold(),
            blob.len(),
            out.display().to_string().bold()
        );
        return Ok(());
    }

    match (format, &value) {
        (OutputFormat::Json, _) => println!(
            "{}",
            serde_json::json!({ "key": args.key, "kind": value.kind(), "value": value_json(&value) })
        ),
        (OutputFormat::Text, Value::Blob(blob)) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&blob.bytes)?;
            stdout.flush()?;
        }
        (OutputFormat::Text, _) => println!("{}", render_value(&value)?),
    }
    Ok(())
}

async fn cmd_rm(engine: &Chunker, args: RmArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let removed = engine.remove(args.key.as_str()).await?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "key": args.key, "records": removed })
        ),
        OutputFormat::Text if removed == 0 => {
            println!("{} {} not found", "-".dimmed(), args.key.bold())
        }
        OutputFormat::Text => println!(
            "{} Removed {} ({} records)",
            "✓".green().bold(),
            args.key.bold(),
            removed
        ),
    }
    Ok(())
}

async fn cmd_inspect(engine: &Chunker, args: InspectArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let descriptor = engine.chunk_keys(args.key.as_str()).await?;
    if !descriptor.exists() {
        bail!("{} not found", args.key);
    }
    match format {
        OutputFormat::Json => println!("{}", describe_json(&args.key, &descriptor)),
        OutputFormat::Text => print_descriptor(&args.key, &descriptor),
    }
    Ok(())
}

fn describe_json(key: &str, descriptor: &ChunkDescriptor) -> serde_json::Value {
    serde_json::json!({
        "key": key,
        "digest": descriptor.digest,
        "fragments": descriptor.chunks,
        "inline": descriptor.data.is_some(),
        "skipZip": descriptor.skip_zip,
        "uselz": descriptor.uselz,
        "expiresAt": descriptor.expires_at,
    })
}

fn print_descriptor(key: &str, descriptor: &ChunkDescriptor) {
    println!("Property {}", key.yellow().bold());
    println!("  Digest: {}", descriptor.digest.cyan());
    match &descriptor.chunks {
        Some(keys) => {
            println!("  Layout: {} fragments", keys.len().to_string().bold());
            for k in keys {
                println!("    {}", k.dimmed());
            }
        }
        None => println!("  Layout: {}", "inline".bold()),
    }
    let compressed = if descriptor.skip_zip { "no".normal() } else { "yes".green() };
    println!("  Compressed: {compressed}");
    match descriptor
        .expires_at
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
    {
        Some(at) => println!("  Expires: {}", at.to_rfc3339().yellow()),
        None => println!("  Expires: {}", "never".dimmed()),
    }
}
