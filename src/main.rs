use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use display_panel::config::AppConfig;
use display_panel::displays::builtin_factory;
use display_panel::panel::{CommandOutcome, DisplaysPanel, ScriptedPrompts};
use display_panel_core::{DisplayId, PanelCommand, Row, VisualizationManager};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

/// display-panel - headless driver for the displays panel
#[derive(Parser, Debug)]
#[command(name = "display-panel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0", global = true)]
    debug: u8,

    /// Settings file to use instead of the default location
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered display classes
    Classes,
    /// Load a group file and print the resulting tree
    Show {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Load a group file and save it again through the panel
    Copy {
        #[arg(value_name = "IN")]
        input: PathBuf,
        #[arg(value_name = "OUT")]
        output: PathBuf,
    },
    /// Load a group file and drive the update cycle
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Number of update cycles to run
        #[arg(long, default_value = "10")]
        ticks: u64,
        /// Update period, overriding the settings file
        #[arg(long = "interval-ms")]
        interval_ms: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let settings_path = cli.config.as_deref();
    let mut settings = load_settings(settings_path);

    match cli.command {
        Command::Classes => {
            for info in builtin_factory().list_classes() {
                println!("{:<8} {}", info.class_id, info.description);
            }
            Ok(())
        }
        Command::Show { file } => {
            let (manager, panel) = load_into_panel(&settings, &file)?;
            print_tree(&manager);
            persist_group_dir(&mut settings, panel.last_group_dir(), settings_path);
            Ok(())
        }
        Command::Copy { input, output } => {
            let panel = copy_group(&settings, &input, output)?;
            persist_group_dir(&mut settings, panel.last_group_dir(), settings_path);
            Ok(())
        }
        Command::Run {
            file,
            ticks,
            interval_ms,
        } => {
            let interval = interval_ms
                .map(|ms| Duration::from_millis(ms.max(1)))
                .unwrap_or_else(|| settings.update_interval());
            let (mut manager, panel) = load_into_panel(&settings, &file)?;
            manager.scheduler_mut().set_interval(interval);
            persist_group_dir(&mut settings, panel.last_group_dir(), settings_path);

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .context("Failed to create tokio runtime")?;
            rt.block_on(run_updates(&mut manager, ticks));
            Ok(())
        }
    }
}

fn load_settings(path: Option<&Path>) -> AppConfig {
    let loaded = match path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    };
    match loaded {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load settings, using defaults: {}", e);
            AppConfig::default()
        }
    }
}

/// Write the group dialog start directory back to the settings file
fn persist_group_dir(settings: &mut AppConfig, dir: Option<&Path>, path: Option<&Path>) {
    if !settings.remember_group_dir(dir) {
        return;
    }
    let saved = match path {
        Some(path) => settings.save_to_path(path),
        None => settings.save(),
    };
    if let Err(e) = saved {
        warn!("Failed to save settings: {}", e);
    }
}

/// Run the load-group command on `file`, failing with whatever the panel reported
fn load_into_panel(
    settings: &AppConfig,
    file: &Path,
) -> Result<(VisualizationManager, DisplaysPanel<ScriptedPrompts>)> {
    let mut manager = VisualizationManager::new(builtin_factory());
    let prompts = ScriptedPrompts::new().with_open_path(file);
    let mut panel = DisplaysPanel::with_settings(prompts, settings);

    match panel.execute(&mut manager, PanelCommand::LoadGroup) {
        CommandOutcome::Applied => {}
        outcome => {
            let reported: Vec<String> = panel
                .prompts_mut()
                .take_errors()
                .into_iter()
                .map(|(title, message)| format!("{}: {}", title, message))
                .collect();
            if reported.is_empty() {
                bail!("Could not load {} ({:?})", file.display(), outcome);
            }
            bail!("{}", reported.join("\n"));
        }
    }
    manager.process_idle();
    Ok((manager, panel))
}

fn copy_group(
    settings: &AppConfig,
    input: &Path,
    output: PathBuf,
) -> Result<DisplaysPanel<ScriptedPrompts>> {
    let (mut manager, mut panel) = load_into_panel(settings, input)?;
    let Some(&group) = manager.tree().top_level().last() else {
        bail!("{} produced no displays", input.display());
    };

    panel.select(&manager, [group]);
    panel.prompts_mut().push_save_path(output);
    match panel.execute(&mut manager, PanelCommand::SaveGroup) {
        CommandOutcome::Applied => {
            if let Some(dir) = panel.last_group_dir() {
                info!("Group written to {}", dir.display());
            }
            Ok(panel)
        }
        outcome => {
            let errors = panel.prompts_mut().take_errors();
            match errors.first() {
                Some((title, message)) => bail!("{} {}", title, message),
                None => bail!("Save group did not complete ({:?})", outcome),
            }
        }
    }
}

fn print_tree(manager: &VisualizationManager) {
    for row in manager.tree().rows() {
        match row {
            Row::Fixture(label) => println!("[{}]", label),
            Row::Display { id, depth } => {
                let Some(node) = manager.tree().get(id) else {
                    continue;
                };
                let state = if node.enabled { "" } else { " (disabled)" };
                println!(
                    "{}{} <{}>{}",
                    "  ".repeat(depth + 1),
                    node.name,
                    node.class_id,
                    state
                );
            }
        }
    }
}

async fn run_updates(manager: &mut VisualizationManager, ticks: u64) {
    let ids: Vec<DisplayId> = manager.tree().iter_preorder();
    for id in ids {
        let name = manager.display_name(id).unwrap_or_default().to_string();
        let logged = manager.connect(
            id,
            Box::new(move |_, event| info!("{}: {:?}", name, event)),
        );
        if let Err(e) = logged {
            warn!("Not watching {}: {}", id, e);
        }
    }

    let mut interval = tokio::time::interval(manager.scheduler().interval());
    let mut last = Instant::now();
    info!("Starting update loop");
    for _ in 0..ticks {
        interval.tick().await;
        let now = Instant::now();
        manager.update(now.duration_since(last));
        last = now;
        manager.process_idle();
    }
    println!(
        "Ran {} update cycle(s) over {} display(s)",
        manager.scheduler().frame_count(),
        manager.tree().len()
    );
}
