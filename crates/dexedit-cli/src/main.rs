use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use dexedit_core::{AppConfig, DedupMode, EditorError, ResolveAction, Session, write_records};
use dexedit_species::{
    LatestRequest, PokeApiSource, RecordDraft, SpeciesNames, dex_id_from_number, sprite_url,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "dexedit",
    about = "Find and resolve duplicate creature records in JSON files",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting DEXEDIT_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List duplicate groups in a file.
    Dupes {
        file: PathBuf,
        /// strict | loose (defaults to the configured mode).
        #[arg(long)]
        mode: Option<DedupMode>,
    },

    /// Keep the first record of every duplicate group.
    Dedupe {
        file: PathBuf,
        #[arg(long)]
        mode: Option<DedupMode>,
        /// Write here instead of back to FILE.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Resolve one duplicate group by its key, as printed by `dupes`.
    Resolve {
        file: PathBuf,
        key: String,
        #[command(subcommand)]
        action: ResolveCommand,
        #[arg(long, global = true)]
        mode: Option<DedupMode>,
        #[arg(long, global = true)]
        out: Option<PathBuf>,
    },

    /// Remove a single record by index.
    Remove {
        file: PathBuf,
        index: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the records in a file.
    List { file: PathBuf },

    /// Compose a record and append it to a file.
    Add {
        file: PathBuf,
        /// National dex number.
        #[arg(long)]
        species: u32,
        #[arg(long, default_value = "1")]
        level: u32,
        #[arg(long)]
        nickname: Option<String>,
        /// Species name when the number is not in the built-in table.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        shiny: bool,
        /// Skip the species lookup and keep the form defaults.
        #[arg(long)]
        offline: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the sprite URL for a species.
    Sprite {
        id: u32,
        #[arg(long)]
        shiny: bool,
    },

    /// List the built-in species table.
    Species,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ResolveCommand {
    /// Keep the first member, remove the rest.
    KeepFirst,
    /// Keep the last member, remove the rest.
    KeepLast,
    /// Remove the given original indices.
    Remove {
        #[arg(long = "index", required = true, action = clap::ArgAction::Append)]
        indices: Vec<usize>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Get a specific config key.
    Get { key: String },
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let json_output = cli.json || std::env::var("DEXEDIT_JSON").as_deref() == Ok("1");
    let timing = std::env::var("DEXEDIT_TIMING").as_deref() == Ok("1");

    let config = AppConfig::load()?;

    if timing {
        eprintln!("[timing] config loaded in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    }

    let out = Output { json: json_output, start };

    match cli.command {
        Commands::Dupes { file, mode } => {
            let session = open_session(&out, &config, &file, mode);
            let groups = session.groups();

            if out.json {
                out.ok(serde_json::json!({
                    "mode": session.mode(),
                    "groups": groups,
                    "total_groups": groups.len(),
                    "total_members": groups.total_members(),
                }))?;
            } else if groups.is_empty() {
                println!("No duplicates found ({} mode).", session.mode());
            } else {
                println!(
                    "{} duplicate groups ({} mode: {}):",
                    groups.len(),
                    session.mode(),
                    session.mode().description()
                );
                for group in groups {
                    println!("\n  {} ({} records)", group.key, group.len());
                    for member in &group.members {
                        println!(
                            "    [{}] #{} {}",
                            member.original_index,
                            member.record.dex_number(),
                            member.record.display_label()
                        );
                    }
                }
            }
        }

        Commands::Dedupe { file, mode, out: dest } => {
            let mut session = open_session(&out, &config, &file, mode);
            if session.groups().is_empty() {
                if out.json {
                    out.ok(serde_json::json!({"removed": [], "remaining": session.len()}))?;
                } else {
                    println!("No duplicates found.");
                }
                return Ok(());
            }

            let removed = resolve_or_exit(&out, &mut session, &ResolveAction::RemoveAll);
            let path = save(&out, &session, &file, dest.as_deref());
            report_removal(&out, &session, &removed, &path)?;
        }

        Commands::Resolve { file, key, action, mode, out: dest } => {
            let mut session = open_session(&out, &config, &file, mode);
            let action = match action {
                ResolveCommand::KeepFirst => ResolveAction::KeepFirst { key },
                ResolveCommand::KeepLast => ResolveAction::KeepLast { key },
                ResolveCommand::Remove { indices } => ResolveAction::RemoveSelected {
                    key,
                    indices: indices.into_iter().collect(),
                },
            };

            let removed = resolve_or_exit(&out, &mut session, &action);
            let path = save(&out, &session, &file, dest.as_deref());
            report_removal(&out, &session, &removed, &path)?;
        }

        Commands::Remove { file, index, out: dest } => {
            let mut session = open_session(&out, &config, &file, None);
            let record = match session.remove_at(index) {
                Ok(r) => r,
                Err(e) => out.fail(&e),
            };
            let path = save(&out, &session, &file, dest.as_deref());

            if out.json {
                out.ok(serde_json::json!({
                    "removed": record,
                    "remaining": session.len(),
                    "path": path,
                }))?;
            } else {
                println!("Removed [{index}] {}. {} records left.", record.display_label(), session.len());
            }
        }

        Commands::List { file } => {
            let session = open_session(&out, &config, &file, None);

            if out.json {
                out.ok(serde_json::json!({"items": session.records(), "total": session.len()}))?;
            } else if session.is_empty() {
                println!("No records in {}.", file.display());
            } else {
                for (index, record) in session.records().iter().enumerate() {
                    let level = record.level().map(|l| l.to_string()).unwrap_or_default();
                    println!(
                        "[{index:>3}] #{dex}  {label:<30}  Lv.{level:<3}  {id}",
                        dex = record.dex_number(),
                        label = record.display_label(),
                        id = record.identity_prefix().unwrap_or_else(|| "-".to_string()),
                    );
                }
            }
        }

        Commands::Add { file, species, level, nickname, name, shiny, offline, out: dest } => {
            let mut session = if file.exists() {
                open_session(&out, &config, &file, None)
            } else {
                let file_name = file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(&config.export.default_file_name);
                Session::new(config.dedup.mode).with_default_file_name(file_name)
            };

            let names = SpeciesNames::builtin();
            let mut draft = RecordDraft::new();
            draft.select_species(&dex_id_from_number(species), &names);
            if let Some(name) = name {
                draft.name = name;
            }
            draft.set_level(level);

            if !offline {
                let source = PokeApiSource::from_config(&config.species)?;
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(draft.prefill(&source, &LatestRequest::new()));
            }

            draft.nickname = nickname.unwrap_or_default();
            draft.shiny = shiny;

            let record = draft.build();
            session.append(record.clone());
            let path = save(&out, &session, &file, dest.as_deref());

            if out.json {
                out.ok(serde_json::json!({
                    "record": record,
                    "total": session.len(),
                    "duplicate_groups": session.groups().len(),
                    "path": path,
                }))?;
            } else {
                println!(
                    "Added #{} {} ({}).",
                    record.dex_number(),
                    record.display_label(),
                    record.identity_prefix().unwrap_or_else(|| "-".to_string())
                );
            }
        }

        Commands::Sprite { id, shiny } => {
            let url = sprite_url(id, shiny);
            if out.json {
                out.ok(serde_json::json!({"id": id, "shiny": shiny, "url": url}))?;
            } else {
                println!("{url}");
            }
        }

        Commands::Species => {
            let names = SpeciesNames::builtin();
            let sorted = names.sorted();
            if out.json {
                let items: Vec<serde_json::Value> = sorted
                    .iter()
                    .map(|(id, name)| serde_json::json!({"id": id, "name": name}))
                    .collect();
                out.ok(serde_json::json!(items))?;
            } else {
                for (id, name) in sorted {
                    println!("#{id} - {name}");
                }
            }
        }

        Commands::Config { action } => {
            let kv = config.key_values();
            match action {
                ConfigAction::List => {
                    if out.json {
                        let map: serde_json::Map<String, serde_json::Value> = kv
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), v.into()))
                            .collect();
                        out.ok(serde_json::Value::Object(map))?;
                    } else {
                        for (k, v) in &kv {
                            println!("{k} = {v}");
                        }
                    }
                }
                ConfigAction::Get { key } => match kv.iter().find(|(k, _)| *k == key) {
                    Some((_, val)) => {
                        if out.json {
                            out.ok(serde_json::json!({"key": key, "value": val}))?;
                        } else {
                            println!("{val}");
                        }
                    }
                    None => {
                        eprintln!("Unknown config key: {key}");
                        std::process::exit(2);
                    }
                },
            }
        }
    }

    if timing {
        eprintln!("[timing] total {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

struct Output {
    json: bool,
    start: Instant,
}

impl Output {
    fn ok(&self, data: serde_json::Value) -> Result<()> {
        let dur = self.start.elapsed().as_millis();
        print_json(&serde_json::json!({"status":"ok","data":data,"meta":{"duration_ms":dur}}))
    }

    /// Report `err` and exit with its code.
    fn fail(&self, err: &EditorError) -> ! {
        let code = err.exit_code();
        if self.json {
            let dur = self.start.elapsed().as_millis();
            let _ = print_json(&serde_json::json!({
                "status": "error",
                "error": error_kind(err),
                "message": err.to_string(),
                "meta": {"duration_ms": dur}
            }));
        } else {
            eprintln!("Error: {err}");
        }
        std::process::exit(code as i32);
    }
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn error_kind(err: &EditorError) -> &'static str {
    match err {
        EditorError::InvalidUpload(_) => "invalid_upload",
        EditorError::GroupNotFound(_) => "not_found",
        EditorError::Io(_) => "io",
        e if e.is_validation() => "validation",
        _ => "error",
    }
}

/// Load `file` into a session, exiting on read or parse failure.
fn open_session(out: &Output, config: &AppConfig, file: &Path, mode: Option<DedupMode>) -> Session {
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => out.fail(&EditorError::Io(e)),
    };
    let file_name = file.file_name().and_then(|n| n.to_str());
    let mode = mode.unwrap_or(config.dedup.mode);

    match Session::from_upload(&text, file_name, mode) {
        Ok(s) => s.with_default_file_name(config.export.default_file_name.clone()),
        Err(e) => out.fail(&e),
    }
}

fn resolve_or_exit(out: &Output, session: &mut Session, action: &ResolveAction) -> BTreeSet<usize> {
    match session.resolve(action) {
        Ok(removed) => removed,
        Err(e) => out.fail(&e),
    }
}

/// Write the session to `dest`, or next to `source` under the export file name.
fn save(out: &Output, session: &Session, source: &Path, dest: Option<&Path>) -> PathBuf {
    let path = match dest {
        Some(p) => p.to_path_buf(),
        None => source.with_file_name(session.export_file_name()),
    };
    if let Err(e) = write_records(&path, session.records()) {
        out.fail(&e);
    }
    debug!(path = %path.display(), records = session.len(), "wrote records");
    path
}

fn report_removal(out: &Output, session: &Session, removed: &BTreeSet<usize>, path: &Path) -> Result<()> {
    if out.json {
        out.ok(serde_json::json!({
            "removed": removed,
            "remaining": session.len(),
            "groups_left": session.groups().len(),
            "path": path,
        }))
    } else {
        let indices: Vec<String> = removed.iter().map(ToString::to_string).collect();
        println!(
            "Removed {} records [{}]. {} left, {} duplicate groups remaining.",
            removed.len(),
            indices.join(", "),
            session.len(),
            session.groups().len()
        );
        println!("Saved to {}", path.display());
        Ok(())
    }
}
