//! Molt CLI - hot module reloading runtime
//!
//! Usage: molt <COMMAND>
//!
//! Commands:
//!   check   Bootstrap the project and report load order and entry resolution
//!   serve   Watch for changes and reload continuously, answering requests
//!           read line-by-line from stdin

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Molt - hot module reloading runtime
#[derive(Parser, Debug)]
#[command(name = "molt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output NDJSON events for CI
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bootstrap the project and report load order and entry resolution
    Check {
        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Entry point as 'unit:attribute' (overrides molt.toml)
        #[arg(long)]
        entry: Option<String>,
    },

    /// Watch for changes and reload continuously
    Serve {
        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Entry point as 'unit:attribute' (overrides molt.toml)
        #[arg(long)]
        entry: Option<String>,

        /// Debounce window in milliseconds (overrides molt.toml)
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { root, entry } => cmd_check(&root, entry, cli.json),
        Commands::Serve {
            root,
            entry,
            debounce_ms,
        } => cmd_serve(&root, entry, debounce_ms, cli.json),
    }
}

/// Resolve options from config file, env, and CLI flags (highest priority)
fn resolve_options(
    root: &PathBuf,
    entry: Option<String>,
    debounce_ms: Option<u64>,
    json: bool,
) -> Result<molt::RuntimeOptions> {
    use molt::config::CONFIG_FILE;

    let config_path = root.join(CONFIG_FILE);
    let config = if config_path.exists() {
        let (config, warnings) = molt::Config::load_with_warnings(&config_path)?;
        for warning in warnings {
            let suggestion = warning
                .suggestion
                .map(|s| format!(" (did you mean '{}'?)", s))
                .unwrap_or_default();
            if !json {
                eprintln!(
                    "⚠ Unknown config key '{}' in {}{}",
                    warning.key,
                    warning.file.display(),
                    suggestion
                );
            }
        }
        config.with_env_overrides()
    } else {
        molt::Config::default().with_env_overrides()
    };

    let mut options = molt::RuntimeOptions::from_config(root.clone(), &config)?;
    if let Some(spec) = entry {
        options.entry = molt::EntryPoint::parse(&spec)?;
    }
    if let Some(ms) = debounce_ms {
        options = options.with_debounce(std::time::Duration::from_millis(ms));
    }
    Ok(options)
}

fn cmd_check(root: &PathBuf, entry: Option<String>, json: bool) -> Result<()> {
    let options = resolve_options(root, entry, None, json)?;
    let entry_spec = options.entry.to_string();

    if !json {
        println!("🔍 Molt Check");
        println!("Root: {}", root.display());
    }

    let runtime = molt::Runtime::bootstrap(options)?;
    let order = runtime.load_order();
    let entry_result = runtime.app().verify_entry();

    if json {
        let output = serde_json::json!({
            "event": "check",
            "root": runtime.root().display().to_string(),
            "units_scanned": runtime.units_scanned(),
            "load_order": order.iter().map(|u| u.to_string()).collect::<Vec<_>>(),
            "entry": entry_spec,
            "entry_ok": entry_result.is_ok(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "\n✓ Scanned {} units, {} loaded at bootstrap",
            runtime.units_scanned(),
            order.len()
        );
        println!("Load order:");
        for (i, unit) in order.iter().enumerate() {
            println!("  {}. {}", i, unit);
        }
        match &entry_result {
            Ok(()) => println!("✓ Entry point '{}' resolves to a handler", entry_spec),
            Err(e) => println!("✗ Entry point '{}' failed: {}", entry_spec, e),
        }
    }

    if entry_result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_serve(
    root: &PathBuf,
    entry: Option<String>,
    debounce_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    use std::io::BufRead;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::channel;
    use std::sync::Arc;
    use std::time::Duration;

    let options = resolve_options(root, entry, debounce_ms, json)?;
    let mut runtime = molt::Runtime::bootstrap(options)?;
    let app = runtime.app();

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_ctrlc = running.clone();
    ctrlc::set_handler(move || {
        running_ctrlc.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    if !json {
        println!("👀 Molt Serve");
        println!("Root: {}", runtime.root().display());
        println!("Entry: {}", app.entry());
        println!("Type a request path and press Enter; Ctrl+C to stop\n");
    }

    // Watch + reload on a background thread; requests on this one.
    let watch_running = running.clone();
    let watch_handle = std::thread::spawn(move || {
        runtime.watch(watch_running, |event| print_event(&event, json))
    });

    // Forward stdin lines through a channel so the serving loop can also
    // observe the running flag.
    let (line_tx, line_rx) = channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines().map_while(|l| l.ok()) {
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    while running.load(Ordering::SeqCst) {
        if watch_handle.is_finished() {
            break;
        }
        if let Ok(line) = line_rx.recv_timeout(Duration::from_millis(50)) {
            let target = line.trim();
            if target.is_empty() {
                continue;
            }
            let response = app.handle(&molt::Request::new(target));
            if json {
                println!("{}", serde_json::to_string(&response)?);
            } else {
                println!("→ {} {}", response.status, response.body);
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    match watch_handle.join() {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("watch thread panicked"),
    }
    Ok(())
}

fn print_event(event: &molt::ReloadEvent, json: bool) {
    use molt::ReloadEvent;

    if json {
        println!("{}", event.to_json());
        return;
    }

    match event {
        ReloadEvent::WatchStarted { root, entry, units } => {
            println!("📂 Watching: {} (entry {}, {} units)", root, entry, units);
        }
        ReloadEvent::FileChanged { path } => {
            println!("📝 Changed: {}", path);
        }
        ReloadEvent::ReloadStarted { files } => {
            println!("🔄 Reloading ({} files changed)...", files);
        }
        ReloadEvent::NoAffectedUnits => {
            println!("✓ No affected units");
        }
        ReloadEvent::UnitsInvalidated { count, preview } => {
            let more = if *count > preview.len() { " [more...]" } else { "" };
            println!(
                "  {} unit{} invalidated: {}{}",
                count,
                if *count == 1 { "" } else { "s" },
                preview.join(", "),
                more
            );
        }
        ReloadEvent::UnitReloaded { unit } => {
            println!("  ✓ {}", unit);
        }
        ReloadEvent::UnitReloadFailed { unit, message } => {
            eprintln!("  ✗ {}: {}", unit, message);
        }
        ReloadEvent::EntryPointRefreshed { unit } => {
            println!("  ↻ entry point '{}' re-bound", unit);
        }
        ReloadEvent::ReloadComplete {
            reloaded,
            failed,
            duration_ms,
        } => {
            if *failed > 0 {
                println!(
                    "⚠ Reload: {} reloaded, {} failed ({}ms)",
                    reloaded, failed, duration_ms
                );
            } else {
                println!("✓ Reload: {} reloaded ({}ms)", reloaded, duration_ms);
            }
        }
        ReloadEvent::Error { message } => {
            eprintln!("✗ Error: {}", message);
        }
        ReloadEvent::Shutdown => {
            println!("\n👋 Shutting down...");
        }
    }
}
