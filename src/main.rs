use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tasklist::{FileStorage, Filter, SqliteStorage, Storage, Task, TaskId, TaskStore};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Tasklist CLI - A single to-do list kept in a local snapshot")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task snapshot (default: platform data dir)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Where the snapshot is kept inside the store directory
    #[arg(short, long, value_enum, default_value_t = Backend::Sqlite)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Key-value row in tasklist.db
    Sqlite,
    /// Plain JSON in tasks.json
    File,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Toggle edit mode on a task
    Edit { id: TaskId },

    /// Replace a task's description
    Update {
        id: TaskId,
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Mark a task done, or not done again
    Done { id: TaskId },

    /// Delete a task
    Rm { id: TaskId },

    /// Delete every task
    Reset,

    /// Show the list
    List {
        #[arg(short, long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
    },

    /// Show how much is left to do
    Status,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let store_path = match cli.store_path {
        Some(path) => path,
        None => default_store_path(),
    };
    fs::create_dir_all(&store_path).context("Failed to create store directory")?;

    // Open store
    let store = TaskStore::open(open_storage(&store_path, cli.backend)?);

    run(store, cli.command)
}

fn run(mut store: TaskStore<Box<dyn Storage>>, command: Commands) -> Result<()> {
    match command {
        Commands::Add { words } => match store.create(&words.join(" ")) {
            Some(id) => println!("Added task {}", id),
            None => println!("Nothing added: description is empty"),
        },
        Commands::Edit { id } => {
            if store.toggle_edit(id) {
                let editing = store.get(id).is_some_and(|t| t.editing);
                println!("Task {} {}", id, if editing { "is being edited" } else { "is no longer being edited" });
            } else {
                not_found(id);
            }
        }
        Commands::Update { id, words } => {
            let description = words.join(" ");
            if store.update(id, &description) {
                println!("Updated task {}", id);
            } else if store.get(id).is_some() {
                println!("Nothing changed: description is empty");
            } else {
                not_found(id);
            }
        }
        Commands::Done { id } => {
            if store.toggle_done(id) {
                let done = store.get(id).is_some_and(|t| t.done);
                println!("Task {} marked {}", id, if done { "done" } else { "not done" });
            } else {
                not_found(id);
            }
        }
        Commands::Rm { id } => {
            if store.remove(id) {
                println!("Removed task {}", id);
            } else {
                not_found(id);
            }
        }
        Commands::Reset => {
            store.reset();
            println!("All tasks removed");
        }
        Commands::List { filter } => {
            println!("{}", store.tier().to_string().bold());
            for task in store.snapshot().iter().filter(|t| filter.matches(t)) {
                println!("{}", render(task));
            }
        }
        Commands::Status => {
            println!("{} ({})", store.tier(), store.tier().name());
        }
    }

    store.close()
}

fn render(task: &Task) -> String {
    let id = format!("{:>4}", task.id).dimmed();
    let description = if task.done {
        task.description.strikethrough().dimmed().to_string()
    } else {
        task.description.clone()
    };
    let marker = if task.done { "[x]".green() } else { "[ ]".normal() };

    if task.editing {
        format!("{} {} {} {}", id, marker, description, "(editing)".yellow())
    } else {
        format!("{} {} {}", id, marker, description)
    }
}

fn not_found(id: TaskId) {
    println!("No task with id {}", id);
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("tasklist"))
        .unwrap_or_else(|| PathBuf::from(".tasklist"))
}

fn open_storage(store_path: &Path, backend: Backend) -> Result<Box<dyn Storage>> {
    let storage: Box<dyn Storage> = match backend {
        Backend::Sqlite => Box::new(SqliteStorage::open(store_path.join("tasklist.db"))?),
        Backend::File => Box::new(FileStorage::new(store_path.join("tasks.json"))),
    };
    Ok(storage)
}
