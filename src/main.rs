//! `floorplan`: inspect and edit a persisted floor plan from the shell.
//!
//! Every command opens a session on the active area of the outlet's local
//! registry, applies one edit (which autosaves), and prints the result.
//! `area switch` picks which area later commands edit. `push` and `pull`
//! copy the active area to and from the remote layout API.


use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use floorplan::background::{BackgroundError, HttpImageMeasure, load_background};
use floorplan::canvas::config::{ConfigError, Side, label_patch};
use floorplan::canvas::doc::{ElementId, ElementKind, TablePreset, TableStatus, Template};
use floorplan::canvas::engine::{Action, CanvasState};
use floorplan::canvas::geometry::{Point, ResizeHandle, Rotation, Scale};
use floorplan::canvas::registry::{AreaId, RegistryError};
use floorplan::session::{Baseline, CanvasSession};
use floorplan::settings::{Settings, SettingsError};
use floorplan::store::{AreaStore, CanvasStore, LocalStore, RemoteStore, ScopeKey, StoreError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Background(#[from] BackgroundError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no element with id {0}")]
    UnknownElement(ElementId),
    #[error("element {0} is not a table")]
    NotATable(ElementId),
    #[error("remote backend not configured; set FLOORPLAN_API_BASE_URL")]
    RemoteDisabled,
    #[error("nothing saved remotely for {0}")]
    NothingToPull(ScopeKey),
}

#[derive(Parser, Debug)]
#[command(name = "floorplan", about = "Restaurant floor-plan editor")]
struct Cli {
    #[arg(long, env = "FLOORPLAN_TENANT", default_value = "default")]
    tenant: String,

    #[arg(long, env = "FLOORPLAN_OUTLET", default_value = "default")]
    outlet: String,

    #[arg(long, env = "FLOORPLAN_ZONE")]
    zone: Option<String>,

    /// Overrides FLOORPLAN_DATA_DIR.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canvas snapshot as JSON.
    Show,
    /// Place a new element at a random position.
    Add {
        kind: ElementKind,
        #[arg(long, default_value = "square-4")]
        preset: TablePreset,
    },
    Move {
        id: ElementId,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dx: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dy: f64,
    },
    Resize {
        id: ElementId,
        handle: ResizeHandle,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dx: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dy: f64,
    },
    /// Rotate by 90 degrees.
    Rotate {
        id: ElementId,
        #[arg(long)]
        ccw: bool,
    },
    Scale {
        id: ElementId,
        direction: ScaleArg,
    },
    Remove {
        id: ElementId,
    },
    /// Select an element, or clear the selection when no id is given.
    Select {
        id: Option<ElementId>,
    },
    /// Set a table's status. Details are kept only for reserved or occupied.
    Status {
        id: ElementId,
        status: TableStatus,
        #[arg(long)]
        details: Option<String>,
    },
    /// Rename a table.
    TableLabel {
        id: ElementId,
        label: String,
    },
    /// Edit one perimeter label.
    Label {
        side: Side,
        index: usize,
        text: String,
    },
    /// Load a background image from a URL, data URI, or file path.
    Background {
        reference: String,
        /// Rendered width; defaults to the current canvas width.
        #[arg(long)]
        width: Option<f64>,
    },
    /// Snapshot the current elements as the reset baseline.
    Baseline,
    /// Restore the baseline and drop background and labels.
    Reset,
    /// Reinitialize the canvas, keeping its size.
    Clear,
    /// Upload the local snapshot to the remote API.
    Push,
    /// Replace the local snapshot with the remote one.
    Pull,
    Area(AreaCommand),
}

#[derive(Args, Debug)]
struct AreaCommand {
    #[command(subcommand)]
    command: AreaSubcommand,
}

#[derive(Subcommand, Debug)]
enum AreaSubcommand {
    List,
    Create { name: String },
    Switch { id: AreaId },
    Rename { id: AreaId, name: String },
    Remove { id: AreaId },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ScaleArg {
    Enlarge,
    Reduce,
}

impl From<ScaleArg> for Scale {
    fn from(arg: ScaleArg) -> Self {
        match arg {
            ScaleArg::Enlarge => Scale::Enlarge,
            ScaleArg::Reduce => Scale::Reduce,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring .env: {e}");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env()?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    let mut key = ScopeKey::new(cli.tenant, cli.outlet);
    key.zone = cli.zone;

    run(&settings, key, cli.command).await
}

async fn run(settings: &Settings, key: ScopeKey, command: Command) -> Result<(), CliError> {
    let areas = AreaStore::new(LocalStore::new(settings.data_dir.clone()));
    match command {
        Command::Push => return push(settings, &areas, &key).await,
        Command::Pull => return pull(settings, &areas, &key).await,
        Command::Area(area) => return run_area(&areas, &key, area.command).await,
        _ => {}
    }

    let mut session = CanvasSession::open_with(areas, key, Baseline::KeepStored).await;
    match command {
        Command::Show => {}
        Command::Add { kind, preset } => {
            let template = template_for(kind, preset);
            let mut placed = None;
            session
                .edit(|e| {
                    let (id, actions) = e.place(template, &mut rand::rng());
                    placed = Some(id);
                    actions
                })
                .await;
            if let Some(id) = placed {
                println!("{id}");
            }
            return Ok(());
        }
        Command::Move { id, dx, dy } => {
            require_element(session.state(), id)?;
            let container = session.state().canvas_size();
            session
                .edit(|e| e.move_by(&id, Point::new(dx, dy), container))
                .await;
        }
        Command::Resize { id, handle, dx, dy } => {
            require_element(session.state(), id)?;
            session
                .edit(|e| e.resize(&id, handle, Point::new(dx, dy)))
                .await;
        }
        Command::Rotate { id, ccw } => {
            require_element(session.state(), id)?;
            let direction = if ccw { Rotation::CounterClockwise } else { Rotation::Clockwise };
            session.edit(|e| e.rotate(&id, direction)).await;
        }
        Command::Scale { id, direction } => {
            require_element(session.state(), id)?;
            session.edit(|e| e.scale(&id, direction.into())).await;
        }
        Command::Remove { id } => {
            require_element(session.state(), id)?;
            session.dispatch(Action::RemoveElement(id)).await;
        }
        Command::Select { id } => {
            if let Some(id) = id {
                require_element(session.state(), id)?;
            }
            session.dispatch(Action::SetSelectedElement(id)).await;
        }
        Command::Status { id, status, details } => {
            require_table(session.state(), id)?;
            let details: Option<serde_json::Value> =
                details.as_deref().map(serde_json::from_str).transpose()?;
            session
                .edit(|e| e.set_table_status(&id, status, details))
                .await;
        }
        Command::TableLabel { id, label } => {
            require_table(session.state(), id)?;
            session.edit(|e| e.set_table_label(&id, &label)).await;
        }
        Command::Label { side, index, text } => {
            let patch = label_patch(session.state().canvas_config(), side, index, text)?;
            session.dispatch(Action::SetCanvasConfig(patch)).await;
        }
        Command::Background { reference, width } => {
            let measure = HttpImageMeasure::new(settings.timeouts)?;
            let width = width.unwrap_or(session.state().canvas_config().width);
            load_background(&mut session, &measure, &reference, width).await?;
        }
        Command::Baseline => {
            session.capture_baseline().await;
        }
        Command::Reset => {
            session.dispatch(Action::ResetCanvas).await;
        }
        Command::Clear => {
            session.clear().await;
        }
        Command::Push | Command::Pull | Command::Area(_) => {}
    }

    print_state(session.state())
}

fn template_for(kind: ElementKind, preset: TablePreset) -> Template {
    match kind {
        ElementKind::Table => Template::Table(preset),
        ElementKind::Window => Template::Window,
        ElementKind::Door => Template::Door,
        ElementKind::Separator => Template::Separator,
    }
}

fn require_element(state: &CanvasState, id: ElementId) -> Result<(), CliError> {
    if state.element(&id).is_none() {
        return Err(CliError::UnknownElement(id));
    }
    Ok(())
}

fn require_table(state: &CanvasState, id: ElementId) -> Result<(), CliError> {
    match state.element(&id) {
        None => Err(CliError::UnknownElement(id)),
        Some(e) if !e.is_table() => Err(CliError::NotATable(id)),
        Some(_) => Ok(()),
    }
}

fn print_state(state: &CanvasState) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}

fn remote_store(settings: &Settings) -> Result<RemoteStore, CliError> {
    let remote = settings.remote.as_ref().ok_or(CliError::RemoteDisabled)?;
    Ok(RemoteStore::new(remote)?)
}

async fn push(settings: &Settings, areas: &AreaStore, key: &ScopeKey) -> Result<(), CliError> {
    let zone = key.require_zone()?;
    let remote = remote_store(settings)?;
    let mut state = areas.load(key).await?.unwrap_or_default();
    state.ensure_scope(zone);
    let mut session = CanvasSession::new(remote, key.clone());
    session.dispatch(Action::LoadState(Box::new(state))).await;
    session.save().await?;
    println!("pushed {key}");
    Ok(())
}

async fn pull(settings: &Settings, areas: &AreaStore, key: &ScopeKey) -> Result<(), CliError> {
    let zone = key.require_zone()?;
    let remote = remote_store(settings)?;
    let mut state = remote
        .load(key)
        .await?
        .ok_or_else(|| CliError::NothingToPull(key.clone()))?;
    state.ensure_scope(zone);
    areas.save(key, &state).await?;
    print_state(&state)
}

async fn run_area(areas: &AreaStore, key: &ScopeKey, command: AreaSubcommand) -> Result<(), CliError> {
    let mut registry = areas.registry(key).await?;
    match command {
        AreaSubcommand::List => {}
        AreaSubcommand::Create { name } => {
            let id = registry.create(name);
            println!("{id}");
        }
        AreaSubcommand::Switch { id } => registry.switch_active(id)?,
        AreaSubcommand::Rename { id, name } => registry.rename(id, name)?,
        AreaSubcommand::Remove { id } => {
            registry.remove(id)?;
        }
    }
    areas.local().save_registry(key, &registry).await?;
    for area in registry.iter() {
        let marker = if area.id == registry.active_id() { "*" } else { " " };
        println!("{marker} {} {} ({} elements)", area.id, area.name, area.state.elements().len());
    }
    Ok(())
}
