//! Roomstore CLI - admin interface for the room resource store

use clap::{Parser, Subcommand};
use roomstore::room::RoomAttributes;
use roomstore::{config, ui, AttributeValue, NewRoom, RoomFilters, RoomPatch, RoomRepository};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "roomstore")]
#[command(version = "0.0.1")]
#[command(about = "Schema-flexible room resource store for campus administration")]
#[command(long_about = r#"
Roomstore keeps campus room resources in an EAV store: a core entity per
room plus an open-ended set of typed attributes, queryable without schema
migrations.

Example usage:
  roomstore init
  roomstore create --name "Physics Lab" --building "Science Hall" --type Lab --capacity 24
  roomstore list --type Lab --min-capacity 20
  roomstore search b204
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write roomstore.toml and create the database
    Init {
        /// Path to the database file
        #[arg(short, long, default_value = "roomstore.db")]
        database: PathBuf,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Create a room
    Create {
        /// Room name
        #[arg(short, long)]
        name: String,

        #[arg(long)]
        building: Option<String>,

        #[arg(long)]
        floor: Option<f64>,

        #[arg(long)]
        room_number: Option<String>,

        /// Room classification (Lab, Lecture Hall, Office, ...)
        #[arg(long = "type")]
        room_type: Option<String>,

        #[arg(long)]
        capacity: Option<f64>,

        /// Comma-separated equipment list
        #[arg(long)]
        equipment: Option<String>,

        /// Additional attribute as key=value (repeatable)
        #[arg(long = "attr")]
        attrs: Vec<String>,

        /// Create the room as inactive
        #[arg(long)]
        inactive: bool,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show one room by id
    Get {
        id: i64,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Update a room; omitted fields stay untouched
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        /// Set the activity flag
        #[arg(long)]
        active: Option<bool>,

        #[arg(long)]
        building: Option<String>,

        #[arg(long)]
        floor: Option<f64>,

        #[arg(long)]
        room_number: Option<String>,

        #[arg(long = "type")]
        room_type: Option<String>,

        #[arg(long)]
        capacity: Option<f64>,

        /// Comma-separated equipment list
        #[arg(long)]
        equipment: Option<String>,

        /// Additional attribute as key=value (repeatable)
        #[arg(long = "attr")]
        attrs: Vec<String>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete a room and its attribute values
    Delete {
        id: i64,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// List rooms with filters and pagination
    List {
        /// Free-text search term
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long = "type")]
        room_type: Option<String>,

        #[arg(long)]
        building: Option<String>,

        #[arg(long)]
        min_capacity: Option<f64>,

        /// Activity filter: true, false or all
        #[arg(long, default_value = "all")]
        active: String,

        /// 1-indexed page number
        #[arg(short, long, default_value = "1")]
        page: usize,

        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Free-text search across names and searchable attributes
    Search {
        term: String,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show row counts for the store
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { database, force } => {
            let config_path = config::default_config_path();
            let cfg = config::RoomstoreConfig {
                database: Some(database.display().to_string()),
            };
            config::write_config(&config_path, &cfg, force)?;
            config::ensure_db_dir(&database)?;
            RoomRepository::open(&database)?;
            ui::success(&format!(
                "Initialized store at {} (config: {})",
                database.display(),
                config_path.display()
            ));
        }

        Commands::Create {
            name,
            building,
            floor,
            room_number,
            room_type,
            capacity,
            equipment,
            attrs,
            inactive,
            database,
            format,
        } => {
            let mut repo = open_repository(database)?;
            let room = NewRoom {
                name,
                is_active: !inactive,
                attributes: gather_attributes(
                    building,
                    floor,
                    room_number,
                    room_type,
                    capacity,
                    equipment,
                    attrs,
                )?,
            };
            let created = repo.create(&room)?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&created)?);
            } else {
                ui::success(&format!("Created room {}", created.id));
                print_room(&created);
            }
        }

        Commands::Get { id, database, format } => {
            let repo = open_repository(database)?;
            match repo.get(id)? {
                Some(room) if format == "json" => {
                    println!("{}", serde_json::to_string_pretty(&room)?)
                }
                Some(room) => print_room(&room),
                None => {
                    ui::error(&format!("Room {} not found", id));
                    std::process::exit(1);
                }
            }
        }

        Commands::Update {
            id,
            name,
            active,
            building,
            floor,
            room_number,
            room_type,
            capacity,
            equipment,
            attrs,
            database,
            format,
        } => {
            let mut repo = open_repository(database)?;
            let patch = RoomPatch {
                name,
                is_active: active,
                attributes: gather_attributes(
                    building,
                    floor,
                    room_number,
                    room_type,
                    capacity,
                    equipment,
                    attrs,
                )?,
            };
            match repo.update(id, &patch)? {
                Some(room) if format == "json" => {
                    println!("{}", serde_json::to_string_pretty(&room)?)
                }
                Some(room) => {
                    ui::success(&format!("Updated room {}", id));
                    print_room(&room);
                }
                None => {
                    ui::error(&format!("Room {} not found", id));
                    std::process::exit(1);
                }
            }
        }

        Commands::Delete { id, database } => {
            let mut repo = open_repository(database)?;
            if repo.delete(id)? {
                ui::success(&format!("Deleted room {}", id));
            } else {
                ui::warn(&format!("Room {} not found", id));
                std::process::exit(1);
            }
        }

        Commands::List {
            search,
            room_type,
            building,
            min_capacity,
            active,
            page,
            limit,
            database,
            format,
        } => {
            let repo = open_repository(database)?;
            let filters = RoomFilters {
                search,
                room_type,
                building,
                min_capacity,
                is_active: parse_active(&active)?,
            };
            let result = repo.list(&filters, page, limit)?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", ui::room_table(&result.items));
                println!(
                    "{}",
                    ui::dim(&format!(
                        "page {} of {} ({} total)",
                        result.page, result.pages, result.total
                    ))
                );
            }
        }

        Commands::Search { term, database, format } => {
            let repo = open_repository(database)?;
            let rooms = repo.search(&term)?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&rooms)?);
            } else if rooms.is_empty() {
                ui::info("No rooms matched", &term);
            } else {
                println!("{}", ui::room_table(&rooms));
            }
        }

        Commands::Stats { database, format } => {
            let repo = open_repository(database)?;
            let stats = repo.stats()?;
            if format == "json" {
                println!(
                    "{}",
                    serde_json::json!({
                        "rooms": stats.rooms,
                        "attributes": stats.attributes,
                        "values": stats.values,
                    })
                );
            } else {
                println!("{}", ui::stats_table(&stats));
            }
        }
    }

    Ok(())
}

/// Database path resolution: flag, then config file, then default
fn open_repository(flag: Option<PathBuf>) -> anyhow::Result<RoomRepository> {
    let path = match flag {
        Some(path) => path,
        None => config::load_config(None)?
            .and_then(|c| c.database)
            .map(PathBuf::from)
            .unwrap_or_else(config::default_database_path),
    };
    tracing::debug!("opening store at {}", path.display());
    Ok(RoomRepository::open(&path)?)
}

fn gather_attributes(
    building: Option<String>,
    floor: Option<f64>,
    room_number: Option<String>,
    room_type: Option<String>,
    capacity: Option<f64>,
    equipment: Option<String>,
    attrs: Vec<String>,
) -> anyhow::Result<RoomAttributes> {
    Ok(RoomAttributes {
        building,
        floor,
        room_number,
        room_type,
        capacity,
        equipment: equipment
            .map(|list| list.split(',').map(|s| s.trim().to_string()).collect()),
        extra: parse_attr_pairs(attrs)?,
    })
}

/// Parse repeatable `--attr key=value` pairs, guessing the value type
fn parse_attr_pairs(pairs: Vec<String>) -> anyhow::Result<BTreeMap<String, AttributeValue>> {
    let mut extra = BTreeMap::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            anyhow::bail!("--attr expects key=value, got '{}'", pair);
        };
        let value = if let Ok(b) = raw.parse::<bool>() {
            AttributeValue::Bool(b)
        } else if let Ok(n) = raw.parse::<f64>() {
            AttributeValue::Number(n)
        } else {
            AttributeValue::Str(raw.to_string())
        };
        extra.insert(key.trim().to_string(), value);
    }
    Ok(extra)
}

fn parse_active(raw: &str) -> anyhow::Result<Option<bool>> {
    match raw.to_lowercase().as_str() {
        "all" => Ok(None),
        "true" | "yes" => Ok(Some(true)),
        "false" | "no" => Ok(Some(false)),
        other => anyhow::bail!("--active expects true, false or all, got '{}'", other),
    }
}

fn print_room(room: &roomstore::Room) {
    ui::header(&room.name);
    ui::status(ui::Icons::DATABASE, "Id", &room.id.to_string());
    if let Some(room_type) = &room.room_type {
        ui::status(ui::Icons::DOOR, "Type", room_type);
    }
    if let Some(building) = &room.location.building {
        ui::status(ui::Icons::BUILDING, "Building", building);
    }
    if let Some(floor) = room.location.floor {
        ui::status(ui::Icons::BUILDING, "Floor", &floor.to_string());
    }
    if let Some(number) = &room.location.room_number {
        ui::status(ui::Icons::DOOR, "Room", number);
    }
    ui::status(
        ui::Icons::INFO,
        "Active",
        if room.is_active { "yes" } else { "no" },
    );
    for (name, value) in &room.attributes {
        ui::status(ui::Icons::MOD, name, &value.to_string());
    }
    ui::status(
        ui::Icons::INFO,
        "Created",
        &room.created_at.to_rfc3339(),
    );
}
