use anyhow::{anyhow, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use restcall::call::{CallEngine, HttpExecutor, OperationKind};
use restcall::config::{self, Config};
use restcall::resource::{lifecycle, FieldDef, ResourceSpec, ResourceState, CALL_FIELDS, RESOURCE_FIELDS};
use restcall::state::StateStore;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage a resource through configurable create/read/update/delete HTTP calls
#[derive(Parser, Debug)]
#[command(name = "restcall", version = restcall::VERSION, about, long_about = None)]
struct Args {
    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// State file (defaults to the configured or per-user location)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the resource and record its state
    Create(ResourceArgs),
    /// Read the resource and refresh its state
    Read(ResourceArgs),
    /// Update the resource and refresh its state
    Update(ResourceArgs),
    /// Delete the resource and forget its state
    Delete(ResourceArgs),
    /// Print the recorded state of a resource
    Show {
        /// Resource name
        #[arg(short, long)]
        name: String,
    },
    /// Describe the resource file fields
    Schema,
}

#[derive(ClapArgs, Debug)]
struct ResourceArgs {
    /// Resource file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    file: PathBuf,

    /// Name under which state is recorded (defaults to the file stem)
    #[arg(short, long)]
    name: Option<String>,
}

impl ResourceArgs {
    fn resource_name(&self) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        self.file
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Cannot derive a resource name from {:?}, use --name", self.file))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = config::app_dir().join("restcall.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("restcall started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let config = Config::load();
    let state_path = config.effective_state_path(args.state.as_deref());

    match args.command {
        Command::Create(resource) => run(OperationKind::Create, &resource, &state_path).await,
        Command::Read(resource) => run(OperationKind::Read, &resource, &state_path).await,
        Command::Update(resource) => run(OperationKind::Update, &resource, &state_path).await,
        Command::Delete(resource) => run(OperationKind::Delete, &resource, &state_path).await,
        Command::Show { name } => {
            let store = StateStore::load(&state_path)?;
            let state = store
                .get(&name)
                .ok_or_else(|| anyhow!("No state recorded for '{}' in {:?}", name, state_path))?;
            print_state(state)
        }
        Command::Schema => {
            print_fields("Resource fields", RESOURCE_FIELDS);
            println!();
            print_fields("create / read / update / delete fields", CALL_FIELDS);
            Ok(())
        }
    }
}

async fn run(kind: OperationKind, resource: &ResourceArgs, state_path: &Path) -> Result<()> {
    let spec = ResourceSpec::load(&resource.file)?;
    let name = resource.resource_name()?;
    let mut store = StateStore::load(state_path)?;
    let engine = CallEngine::new(HttpExecutor::new()?);

    tracing::info!("Running {} for '{}' from {:?}", kind, name, resource.file);

    let state = lifecycle::apply(&engine, &spec, kind, &name, &mut store).await?;
    if kind == OperationKind::Delete {
        println!("Deleted '{}' (id {})", name, state.id);
        return Ok(());
    }
    print_state(&state)
}

fn print_state(state: &ResourceState) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}

fn print_fields(title: &str, fields: &[FieldDef]) {
    println!("{}", title);
    for field in fields {
        let mut flags = Vec::new();
        if field.required {
            flags.push("required".to_string());
        }
        if field.computed {
            flags.push("computed".to_string());
        }
        if let Some(default) = field.default {
            flags.push(format!("default: {:?}", default));
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("  {:<14} {}{}", field.name, field.description, flags);
    }
}
