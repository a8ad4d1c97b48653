use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use cadence_config::{
  SchedulerConfig, StoreConfig, TaskDefinition, Workflow, WorkflowId, WorkflowTrigger,
  WorkflowTriggerId,
};
use cadence_scheduler::{InMemoryJobScheduler, SchedulerServices, TriggerLifecycle};
use cadence_store::{StoreRegistry, Stores};

mod telemetry;

/// Cadence - multi-tenant workflow definitions and triggers
#[derive(Parser)]
#[command(name = "cadence")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to a JSON config file (default: SQLite database in the data directory)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Path to the data directory (default: ~/.cadence)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a workflow file and print its execution order
  Validate {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// Validate against task definitions from this file instead of the store
    #[arg(long)]
    definitions: Option<PathBuf>,
  },

  /// Manage task definitions
  Definition {
    #[command(subcommand)]
    action: DefinitionAction,
  },

  /// Manage workflows
  Workflow {
    #[command(subcommand)]
    action: WorkflowAction,
  },

  /// Manage workflow triggers
  Trigger {
    #[command(subcommand)]
    action: TriggerAction,
  },
}

#[derive(Subcommand)]
enum DefinitionAction {
  /// Add a task definition from a JSON file
  Add { file: PathBuf },

  /// List all task definitions
  List,
}

#[derive(Subcommand)]
enum WorkflowAction {
  /// Validate and add a workflow from a JSON file
  Add { file: PathBuf },

  /// List the workflows of a namespace
  List {
    #[arg(long)]
    namespace: String,
  },

  /// Delete a workflow and all of its triggers
  Delete {
    name: String,

    #[arg(long)]
    namespace: String,
  },
}

#[derive(Subcommand)]
enum TriggerAction {
  /// Add a trigger from a JSON file
  Add { file: PathBuf },

  /// List the triggers of a workflow
  List {
    workflow: String,

    #[arg(long)]
    namespace: String,
  },

  /// Delete a trigger
  Delete {
    name: String,

    #[arg(long)]
    workflow: String,

    #[arg(long)]
    namespace: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  telemetry::init_tracing()?;

  let Some(command) = cli.command else {
    println!("cadence - use --help to see available commands");
    return Ok(());
  };

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".cadence"),
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(run(command, cli.config, data_dir))
}

async fn run(command: Commands, config: Option<PathBuf>, data_dir: PathBuf) -> Result<()> {
  if let Commands::Validate {
    workflow_file,
    definitions: Some(definitions),
  } = &command
  {
    return validate_offline(workflow_file, definitions).await;
  }

  let services = open_services(config, &data_dir).await?;

  match command {
    Commands::Validate { workflow_file, .. } => {
      let workflow: Workflow = read_json(&workflow_file).await?;
      let order = services.workflows.validate(&workflow).await?;
      print_order(&workflow, &order);
    }
    Commands::Definition { action } => match action {
      DefinitionAction::Add { file } => {
        let definition: TaskDefinition = read_json(&file).await?;
        services.task_definitions.add(&definition).await?;
        eprintln!("Added task definition: {}", definition.name);
      }
      DefinitionAction::List => {
        print_json(&services.task_definitions.get_all().await?)?;
      }
    },
    Commands::Workflow { action } => match action {
      WorkflowAction::Add { file } => {
        let workflow: Workflow = read_json(&file).await?;
        services
          .workflows
          .add(&workflow)
          .await
          .with_context(|| format!("failed to add workflow {}", workflow.id()))?;
        eprintln!("Added workflow: {}", workflow.id());
      }
      WorkflowAction::List { namespace } => {
        print_json(&services.workflows.get_all(&namespace).await?)?;
      }
      WorkflowAction::Delete { name, namespace } => {
        let id = WorkflowId::new(name, namespace);
        services
          .workflows
          .delete(&id)
          .await
          .with_context(|| format!("failed to delete workflow {id}"))?;
        eprintln!("Deleted workflow: {id}");
      }
    },
    Commands::Trigger { action } => match action {
      TriggerAction::Add { file } => {
        let trigger: WorkflowTrigger = read_json(&file).await?;
        services
          .triggers
          .add(&trigger)
          .await
          .with_context(|| format!("failed to add trigger {}", trigger.id()))?;
        eprintln!("Added trigger: {}", trigger.id());
      }
      TriggerAction::List {
        workflow,
        namespace,
      } => {
        let triggers = services
          .triggers
          .list_by_workflow(&workflow, &namespace)
          .await?;
        print_json(&triggers)?;
      }
      TriggerAction::Delete {
        name,
        workflow,
        namespace,
      } => {
        let id = WorkflowTriggerId::new(name, workflow, namespace);
        services
          .triggers
          .delete(&id)
          .await
          .with_context(|| format!("failed to delete trigger {id}"))?;
        eprintln!("Deleted trigger: {id}");
      }
    },
  }

  Ok(())
}

/// Open the configured store, defaulting to a SQLite file in `data_dir`.
async fn open_services(config: Option<PathBuf>, data_dir: &Path) -> Result<SchedulerServices> {
  let store_config = match config {
    Some(path) => SchedulerConfig::load(&path)?.store,
    None => {
      tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
      let url = format!("sqlite://{}", data_dir.join("cadence.db").display());
      StoreConfig::new("sqlite").with_options(serde_json::json!({ "url": url }))
    }
  };

  let stores = StoreRegistry::default()
    .open(&store_config)
    .await
    .with_context(|| format!("failed to open {} store", store_config.backend))?;

  // No wall-clock engine is attached to the CLI; jobs are only recorded.
  Ok(SchedulerServices::new(stores, Arc::new(InMemoryJobScheduler::new())))
}

/// Validate against definitions read from a file, touching no store.
async fn validate_offline(workflow_file: &Path, definitions_file: &Path) -> Result<()> {
  let workflow: Workflow = read_json(workflow_file).await?;
  let definitions: Vec<TaskDefinition> = read_json(definitions_file).await?;

  let services = SchedulerServices::new(Stores::in_memory(), Arc::new(InMemoryJobScheduler::new()));
  for definition in &definitions {
    services.task_definitions.add(definition).await?;
  }
  info!(definitions = definitions.len(), "loaded task definitions");

  let order = services
    .workflows
    .validate(&workflow)
    .await
    .with_context(|| format!("workflow {} is invalid", workflow.id()))?;
  print_order(&workflow, &order);
  Ok(())
}

fn print_order(workflow: &Workflow, order: &[String]) {
  eprintln!("Workflow {} is valid", workflow.id());
  for (position, task) in order.iter().enumerate() {
    println!("{}. {}", position + 1, task);
  }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read file: {}", path.display()))?;

  serde_json::from_str(&content).with_context(|| format!("failed to parse file: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
