use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use tormenta_sheet::character::{Attribute, RecordPatch};
use tormenta_sheet::dice::{self, Die};
use tormenta_sheet::error::AppError;
use tormenta_sheet::logging;
use tormenta_sheet::save::SheetStore;
use tormenta_sheet::settings::{SETTINGS_FILE, Settings, Theme};
use tormenta_sheet::storage::FileStorage;

/// Tormenta 20 character sheets from the terminal
#[derive(Parser)]
#[command(name = "tormenta-sheet")]
#[command(about = "Manage Tormenta 20 character sheets", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding sheets, settings and logs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every sheet, marking the active one
    List,

    /// Create a blank sheet and make it active
    New,

    /// Make another sheet active
    Switch { id: String },

    /// Delete a sheet
    Delete { id: String },

    /// Print the active sheet and its derived stats
    Show {
        /// Print the raw record as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Merge a JSON object of fields into the active sheet
    Update { patch: String },

    /// Import a character file as a new active sheet
    Import { file: PathBuf },

    /// Write the active sheet to `<name>_tormenta20.json`
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Roll dice for the active sheet
    #[command(subcommand)]
    Roll(RollCommand),

    /// Show or change the colour theme
    Theme { theme: Option<String> },
}

#[derive(Subcommand)]
enum RollCommand {
    /// d20 plus an attribute modifier
    Attribute { attribute: Attribute },

    /// d20 plus a skill total
    Skill { skill: String },

    /// Any die plus a flat modifier
    Custom {
        #[arg(default_value = "d20")]
        die: Die,
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        modifier: i64,
    },
}

fn load_settings(data_dir: Option<PathBuf>) -> Settings {
    let settings_dir = data_dir.clone().unwrap_or_else(Settings::default_data_dir);
    let mut settings = Settings::load_settings_from_file(settings_dir.join(SETTINGS_FILE))
        .unwrap_or_else(|_| Settings::new());
    if data_dir.is_some() {
        settings.data_dir = data_dir;
    }
    settings
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.data_dir);
    let data_dir = settings.data_dir();

    if let Err(e) = logging::init(&data_dir, settings.log_level()) {
        eprintln!("Failed to initialize logger: {e}");
    }
    log::info!("Using data directory {}", data_dir.display());

    let storage = Arc::new(FileStorage::new(&data_dir));
    let (notices, mut failures) = mpsc::unbounded_channel();
    let mut store =
        SheetStore::open(storage.clone(), settings.save_debounce()).with_notices(notices);

    let outcome = run(cli.command, &mut store, storage.as_ref(), &mut settings);

    store
        .flush()
        .await
        .context("Failed to save sheets before exit")?;
    while let Ok(failure) = failures.try_recv() {
        eprintln!("Could not save {}: {}", failure.key, failure.message);
    }
    outcome
}

fn run(
    command: Command,
    store: &mut SheetStore,
    storage: &FileStorage,
    settings: &mut Settings,
) -> Result<()> {
    match command {
        Command::List => {
            for sheet in store.sheets() {
                let marker = if sheet.id == store.active_id() { "*" } else { " " };
                println!(
                    "{marker} {}  {} (nível {})",
                    sheet.id, sheet.meta.name, sheet.meta.level
                );
            }
        }
        Command::New => {
            let sheet = store.create_sheet(tormenta_sheet::make_default());
            println!("Created {}", sheet.id);
        }
        Command::Switch { id } => {
            if store.sheet(&id).is_none() {
                return Err(AppError::SheetNotFound(id).into());
            }
            store.switch_active(&id);
            println!("Active sheet is now {id}");
        }
        Command::Delete { id } => {
            if store.sheet(&id).is_none() {
                return Err(AppError::SheetNotFound(id).into());
            }
            store.delete_sheet(&id);
            println!("Deleted {id}");
        }
        Command::Show { json } => show(store, json)?,
        Command::Update { patch } => {
            let patch = RecordPatch::from_json(&patch)?;
            store.update_active(patch);
            if let Some(sheet) = store.active() {
                println!("Updated {} ({})", sheet.id, sheet.meta.name);
            }
        }
        Command::Import { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let sheet = store.import_record(&raw)?;
            println!("Imported {} as {}", sheet.meta.name, sheet.id);
        }
        Command::Export { out } => {
            let Some(export) = store.export_active() else {
                return Err(AppError::SheetNotFound(store.active_id().to_string()).into());
            };
            let export = export?;
            fs::create_dir_all(&out)?;
            let path = out.join(&export.file_name);
            fs::write(&path, &export.contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        Command::Roll(roll) => {
            let Some(record) = store.active_record() else {
                return Err(AppError::SheetNotFound(store.active_id().to_string()).into());
            };
            let mut rng = rand::rng();
            let result = match roll {
                RollCommand::Attribute { attribute } => {
                    dice::roll_attribute(record, attribute, &mut rng)
                }
                RollCommand::Skill { skill } => dice::roll_skill(record, &skill, &mut rng)
                    .with_context(|| format!("Unknown skill: {skill}"))?,
                RollCommand::Custom { die, modifier } => dice::roll_custom(die, modifier, &mut rng),
            };
            println!("{}", result.total);
            println!("{}", result.details);
        }
        Command::Theme { theme } => match theme {
            Some(value) => {
                let theme = Theme::parse(&value);
                theme.store(storage);
                settings.theme = theme;
                settings.save_to_file(settings.data_dir().join(SETTINGS_FILE))?;
                println!("Theme set to {}", theme.as_str());
            }
            None => println!("{}", Theme::load(storage).as_str()),
        },
    }
    Ok(())
}

fn show(store: &SheetStore, json: bool) -> Result<()> {
    let Some(sheet) = store.active() else {
        return Err(AppError::SheetNotFound(store.active_id().to_string()).into());
    };
    let record = &sheet.data;
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    let derived = record.derived();
    println!("{} [{}]", sheet.meta.name, sheet.id);
    println!("Nível {}  Defesa {}", derived.level, derived.defense);
    let modifiers: Vec<String> = derived
        .modifiers
        .iter()
        .map(|(attribute, modifier)| {
            format!(
                "{} {} ({modifier:+})",
                attribute.abbreviation(),
                record.attributes.get(*attribute)
            )
        })
        .collect();
    println!("{}", modifiers.join("  "));
    println!(
        "Vida {}/{}  Mana {}/{}",
        record.resources.life.current,
        record.resources.life.max,
        record.resources.mana.current,
        record.resources.mana.max
    );
    println!(
        "Carga {:.1} / {} ({})",
        derived.carried_weight, derived.load_limits.without_penalty, derived.load_status
    );
    if derived.armor_penalty != 0 {
        println!("Penalidade de armadura: -{}", derived.armor_penalty);
    }
    println!();
    for skill in &derived.skills {
        let marker = if skill.trained { "●" } else { "○" };
        let total = if skill.trained_only && !skill.trained {
            "-".to_string()
        } else {
            format!("{:+}", skill.total)
        };
        println!(
            "{marker} {:<16} {:>4}  {}",
            skill.name,
            total,
            skill.attribute.abbreviation()
        );
    }
    Ok(())
}
