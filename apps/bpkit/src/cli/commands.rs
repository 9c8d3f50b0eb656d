//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::ops::{BlueprintSummary, pack_values, parse_values};
use bpkit_core::{
    Blueprint, BlueprintError, BlueprintResult, ConnectCode, Direction, Document, EntityNumber,
    SignalCatalog, SignalId, WireColors,
    primitives::{MAX_EXCHANGE_STRING_LEN, MAX_INFLATED_SIZE},
};
use std::io::Read;
use std::path::{Path, PathBuf};

// =============================================================================
// INPUT / OUTPUT
// =============================================================================

/// Maximum size of an exchange-string input, with room for surrounding
/// whitespace.
const MAX_EXCHANGE_INPUT_SIZE: u64 = MAX_EXCHANGE_STRING_LEN as u64 + 4096;

/// Maximum size of a JSON document or value list input.
const MAX_DOCUMENT_INPUT_SIZE: u64 = MAX_INFLATED_SIZE;

/// Output flags shared by all commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json_mode: bool,
    pub quiet: bool,
}

/// Validate file path.
///
/// Resolves symlinks and `..`, and ensures the path is an existing regular
/// file.
fn validate_file_path(path: &Path) -> BlueprintResult<PathBuf> {
    let canonical = path.canonicalize().map_err(|e| {
        BlueprintError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(BlueprintError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> BlueprintResult<PathBuf> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        BlueprintError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(BlueprintError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| BlueprintError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read a file, or stdin when no path is given, refusing more than
/// `max_size` bytes.
pub fn read_input(path: Option<&Path>, max_size: u64) -> BlueprintResult<String> {
    let mut text = String::new();
    match path {
        Some(path) => {
            let path = validate_file_path(path)?;
            let metadata = std::fs::metadata(&path)
                .map_err(|e| BlueprintError::Io(format!("Cannot read file metadata: {}", e)))?;
            if metadata.len() > max_size {
                return Err(BlueprintError::Io(format!(
                    "File size {} bytes exceeds maximum allowed {} bytes",
                    metadata.len(),
                    max_size
                )));
            }
            std::fs::File::open(&path)
                .and_then(|mut f| f.read_to_string(&mut text))
                .map_err(|e| BlueprintError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
        }
        None => {
            std::io::stdin()
                .take(max_size + 1)
                .read_to_string(&mut text)
                .map_err(|e| BlueprintError::Io(format!("Cannot read stdin: {}", e)))?;
            if text.len() as u64 > max_size {
                return Err(BlueprintError::Io(format!(
                    "Input exceeds maximum allowed {} bytes",
                    max_size
                )));
            }
        }
    }
    Ok(text)
}

/// Write to a file, or stdout when no path is given.
pub fn write_output(path: Option<&Path>, text: &str) -> BlueprintResult<()> {
    match path {
        Some(path) => {
            let path = validate_output_path(path)?;
            std::fs::write(&path, format!("{}\n", text.trim_end())).map_err(|e| {
                BlueprintError::Io(format!("Cannot write '{}': {}", path.display(), e))
            })?;
            tracing::debug!("Wrote {}", path.display());
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}

fn read_blueprint(path: Option<&Path>) -> BlueprintResult<Blueprint> {
    Blueprint::from_exchange_string(&read_input(path, MAX_EXCHANGE_INPUT_SIZE)?)
}

fn pretty(value: &impl serde::Serialize) -> BlueprintResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| BlueprintError::Encode(e.to_string()))
}

// =============================================================================
// DECODE / ENCODE COMMANDS
// =============================================================================

/// Print the JSON document inside an exchange string.
pub fn cmd_decode(input: Option<&Path>, output: Option<&Path>) -> BlueprintResult<()> {
    let text = read_input(input, MAX_EXCHANGE_INPUT_SIZE)?;
    let document = bpkit_core::decode(&text)?;
    write_output(output, &pretty(&document)?)
}

/// Print the exchange string for a JSON document.
pub fn cmd_encode(input: Option<&Path>, output: Option<&Path>) -> BlueprintResult<()> {
    let text = read_input(input, MAX_DOCUMENT_INPUT_SIZE)?;
    let document: Document = serde_json::from_str(&text)
        .map_err(|e| BlueprintError::Structural(format!("input is not JSON: {}", e)))?;
    write_output(output, &bpkit_core::encode(&document)?)
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

/// Show a summary of a blueprint.
pub fn cmd_inspect(input: Option<&Path>, out: Output) -> BlueprintResult<()> {
    let bp = read_blueprint(input)?;
    let summary = BlueprintSummary::of(&bp);

    if out.json_mode {
        println!("{}", pretty(&summary)?);
        return Ok(());
    }

    println!("Blueprint");
    println!("=========");
    println!("Label:       {}", summary.label.as_deref().unwrap_or("-"));
    println!("Description: {}", summary.description.as_deref().unwrap_or("-"));
    match summary.version {
        Some(v) => println!("Version:     {}", v),
        None => println!("Version:     -"),
    }
    if !summary.icons.is_empty() {
        println!("Icons:       {}", summary.icons.join(", "));
    }
    println!();
    println!("Entities: {}", summary.entity_count);
    for (name, count) in &summary.entities {
        println!("  {:<32} {}", name, count);
    }
    println!("Wires:    {}", summary.wire_count);
    if summary.constant_filters > 0 {
        println!("Constant combinator filters: {}", summary.constant_filters);
    }

    Ok(())
}

// =============================================================================
// EDIT COMMAND
// =============================================================================

/// Changes requested by `bpkit edit`.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub label: Option<String>,
    pub description: Option<String>,
    pub rotate: Option<Direction>,
    /// `FROM=TO` entity renames.
    pub replacements: Vec<String>,
    /// `INDEX=SIGNAL` icon assignments.
    pub icons: Vec<String>,
}

fn split_pair<'a>(arg: &'a str, what: &str) -> BlueprintResult<(&'a str, &'a str)> {
    arg.split_once('=')
        .ok_or_else(|| BlueprintError::Structural(format!("{} {:?} is not of the form A=B", what, arg)))
}

/// Apply edits in place. All arguments are validated before anything
/// changes.
pub fn apply_edits(bp: &mut Blueprint, edits: &EditOptions) -> BlueprintResult<()> {
    let renames = edits
        .replacements
        .iter()
        .map(|r| split_pair(r, "replacement"))
        .collect::<BlueprintResult<Vec<_>>>()?;
    let icons = edits
        .icons
        .iter()
        .map(|arg| {
            let (index, signal) = split_pair(arg, "icon")?;
            let index: u8 = index.trim().parse().map_err(|_| {
                BlueprintError::Structural(format!("icon index {:?} is not a number", index))
            })?;
            Ok((index, signal.parse::<SignalId>()?))
        })
        .collect::<BlueprintResult<Vec<_>>>()?;
    // Range check before mutating.
    let mut staged = bp.clone();
    for (index, signal) in icons {
        staged.set_icon(index, signal)?;
    }
    *bp = staged;

    if let Some(label) = &edits.label {
        bp.set_label(label.clone());
    }
    if let Some(description) = &edits.description {
        bp.set_description(description.clone());
    }
    for (from, to) in renames {
        for entity in bp.entities_mut().filter(|e| e.name == from) {
            entity.replace(Some(to), None);
        }
    }
    if let Some(direction) = edits.rotate {
        bp.rotate_all(direction);
    }
    Ok(())
}

/// Edit a blueprint.
pub fn cmd_edit(
    input: Option<&Path>,
    output: Option<&Path>,
    edits: &EditOptions,
) -> BlueprintResult<()> {
    let mut bp = read_blueprint(input)?;
    apply_edits(&mut bp, edits)?;
    write_output(output, &bp.to_exchange_string()?)
}

// =============================================================================
// PACK COMMAND
// =============================================================================

/// Pack integers into a new constant-combinator blueprint.
pub fn cmd_pack(
    input: Option<&Path>,
    output: Option<&Path>,
    catalog: &SignalCatalog,
    label: Option<&str>,
    out: Output,
) -> BlueprintResult<()> {
    let values = parse_values(&read_input(input, MAX_DOCUMENT_INPUT_SIZE)?)?;
    if catalog.is_empty() {
        tracing::warn!("No signal catalog configured; packing needs one (--catalog)");
    }
    let packed = pack_values(catalog, &values, label)?;

    if !out.quiet {
        tracing::info!(
            "Packed {} values into {} section(s)",
            packed.filters,
            packed.sections
        );
    }
    write_output(output, &packed.blueprint.to_exchange_string()?)
}

// =============================================================================
// WIRE COMMAND
// =============================================================================

/// Connect two entities of a blueprint.
pub fn cmd_wire(
    input: Option<&Path>,
    output: Option<&Path>,
    from: u32,
    to: u32,
    code: ConnectCode,
    colors: WireColors,
) -> BlueprintResult<()> {
    let mut bp = read_blueprint(input)?;
    let added = bp.connect(EntityNumber(from), EntityNumber(to), code, colors)?;
    tracing::debug!("Added {} wire(s) {} -> {} ({})", added, from, to, code);
    write_output(output, &bp.to_exchange_string()?)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Startup summary logged by `cmd_server`.
fn server_summary(host: &str, port: u16, catalog_slots: usize) -> String {
    format!(
        "bpkit HTTP server on {}:{} (catalog: {} slots; endpoints: GET /health, POST /decode, POST /encode, POST /inspect, POST /pack)",
        host, port, catalog_slots
    )
}

/// Start the HTTP server.
///
/// Startup details go to the log, never to stdout.
pub async fn cmd_server(
    host: &str,
    port: u16,
    catalog: SignalCatalog,
    out: Output,
) -> BlueprintResult<()> {
    if !out.quiet {
        tracing::info!("{}", server_summary(host, port, catalog.len()));
        tracing::info!("Press Ctrl+C to stop");
    }

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, catalog).await
}
