use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

use records_core::catalog_source::load_catalog;
use records_core::catalog_source::CatalogDocument;
use records_core::config::load_config;
use records_core::config::Config;
use records_core::config::LoggingConfig;
use records_core::Catalog;
use records_core::DepartmentId;
use records_core::Priority;
use records_core::RequestType;
use records_core::SelectionKey;
use records_core::UserAction;

mod session;
mod ui;

use session::Session;

#[derive(Debug, Parser)]
#[command(
    name = "records",
    version,
    about = "Browse the records catalog and submit retrieval requests",
    after_help = "Config is read from --config, then $RECORDS_CONFIG, then <config dir>/records/config.toml."
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Config file to read")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH", help = "Catalog file (.json, .yaml or .toml)")]
    catalog: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH", help = "Session journal file")]
    journal: Option<PathBuf>,
    #[arg(
        long = "drop-dir",
        global = true,
        value_name = "DIR",
        help = "Write submitted batches into this directory instead of simulating"
    )]
    drop_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive catalog browser (default).
    Browse,
    /// List departments, boxes and folders.
    Catalog {
        #[arg(long, help = "Only show this department")]
        department: Option<u64>,
        #[arg(long, help = "Print the catalog as JSON")]
        json: bool,
    },
    /// Create a folder inside a box.
    CreateFolder {
        #[arg(long = "box", value_name = "BOX_ID")]
        box_id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    /// Select items and submit them as one request.
    Submit {
        #[arg(
            long = "select",
            value_name = "KIND:ID",
            help = "Item to request, e.g. box:500 or folder:700; repeat as needed"
        )]
        items: Vec<SelectionKey>,
        #[arg(long, value_enum)]
        request_type: Option<RequestTypeArg>,
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
        #[arg(long, default_value = "")]
        instructions: String,
        #[arg(long, help = "Print the session state after submitting")]
        show_state: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RequestTypeArg {
    Temporary,
    Permanent,
}

impl From<RequestTypeArg> for RequestType {
    fn from(value: RequestTypeArg) -> Self {
        match value {
            RequestTypeArg::Temporary => RequestType::Temporary,
            RequestTypeArg::Permanent => RequestType::Permanent,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PriorityArg {
    Standard,
    Urgent,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Standard => Priority::Standard,
            PriorityArg::Urgent => Priority::Urgent,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(&config.logging)?;

    let catalog = load_catalog(&config.catalog.path)?;
    match cli.command.unwrap_or(Command::Browse) {
        Command::Browse => {
            let session = Session::from_config(&config, catalog)?;
            ui::run(session)
        }
        Command::Catalog { department, json } => {
            let session = Session::from_config(&config, catalog)?;
            print_catalog(&session, department.map(DepartmentId), json)
        }
        Command::CreateFolder {
            box_id,
            name,
            description,
        } => {
            let mut session = Session::from_config(&config, catalog)?;
            create_folder(&mut session, box_id, name, description)
        }
        Command::Submit {
            items,
            request_type,
            priority,
            instructions,
            show_state,
        } => {
            let mut session = Session::from_config(&config, catalog)?;
            submit(
                &mut session,
                &items,
                request_type.map(RequestType::from),
                priority.map(Priority::from),
                instructions,
            )?;
            if show_state {
                println!("{}", serde_json::to_string_pretty(&session.state().snapshot())?);
            }
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let fallback = dirs::config_dir().map(|dir| dir.join("records").join("config.toml"));
    let mut config = load_config(cli.config.as_deref(), fallback)?;
    if let Some(path) = &cli.catalog {
        config.catalog.path = path.clone();
    }
    if let Some(path) = &cli.journal {
        config.journal.path = path.clone();
    }
    if let Some(dir) = &cli.drop_dir {
        config.submission.drop_dir = Some(dir.clone());
    }
    Ok(config)
}

fn init_logging(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_path: &Path = &logging.path;
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "failed to create log directory '{}': {error}",
                    parent.display()
                )
            })?;
        }
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|error| format!("failed to open log file '{}': {error}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logging.filter.as_str().into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    Ok(())
}

fn print_catalog(
    session: &Session,
    department: Option<DepartmentId>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let view = session.catalog().view();
    let departments = match department {
        Some(department) => vec![department],
        None => session.state().department_choices(&view),
    };

    if json {
        let boxes: Vec<_> = departments
            .iter()
            .flat_map(|department| view.boxes_in_department(*department))
            .cloned()
            .collect();
        let folders = boxes
            .iter()
            .flat_map(|record| view.folders_in_box(Some(record.box_id)))
            .cloned()
            .collect();
        let document = CatalogDocument { boxes, folders };
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    for department in departments {
        println!("department {department}");
        for record in view.boxes_in_department(department) {
            println!("  box {} @ {}", record.box_id, record.location);
            for folder in view.folders_in_box(Some(record.box_id)) {
                println!(
                    "    folder {} {}: {}",
                    folder.folder_id, folder.name, folder.description
                );
            }
        }
    }
    Ok(())
}

fn create_folder(
    session: &mut Session,
    box_id: u64,
    name: String,
    description: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let box_id = records_core::BoxId(box_id);
    let department = session.catalog().view().owner_of_box(box_id)?.department_id;
    session.apply(UserAction::SelectDepartment(department))?;
    session.apply(UserAction::OpenBox(box_id))?;
    session.apply(UserAction::OpenFolderCreation)?;
    session.apply(UserAction::SetFolderName(name))?;
    session.apply(UserAction::SetFolderDescription(description))?;
    let before = session.catalog().folders().len();
    session.apply(UserAction::CreateFolder)?;

    let created = session
        .catalog()
        .folders()
        .get(before)
        .ok_or("folder was not created")?;
    println!("{}", serde_json::to_string_pretty(created)?);
    Ok(())
}

fn submit(
    session: &mut Session,
    items: &[SelectionKey],
    request_type: Option<RequestType>,
    priority: Option<Priority>,
    instructions: String,
) -> Result<(), Box<dyn std::error::Error>> {
    for key in items {
        let action = match key {
            SelectionKey::Box(box_id) => UserAction::SelectBox(*box_id),
            SelectionKey::Folder(folder_id) => UserAction::SelectFolder(*folder_id),
        };
        session.apply(action)?;
    }
    session.apply(UserAction::OpenSubmitConfirmation)?;
    if let Some(request_type) = request_type {
        session.apply(UserAction::SetRequestType(request_type))?;
    }
    if let Some(priority) = priority {
        session.apply(UserAction::SetPriority(priority))?;
    }
    session.apply(UserAction::SetInstructions(instructions))?;
    session.apply(UserAction::ConfirmSubmit)?;

    let last = session
        .state()
        .last_batch()
        .ok_or("request was not submitted")?;
    println!("{}", serde_json::to_string_pretty(&last.batch)?);
    if let Some(receipt) = session.last_receipt() {
        eprintln!(
            "request {} {} ({})",
            receipt.batch_id,
            receipt.status.label(),
            receipt.message
        );
    }
    Ok(())
}
