use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::sync::Arc;
use tracing::{info, warn};

use docwriter::{
    config::Config,
    store::{DocumentStore, FirestoreRestStore, InMemoryStore},
    AppError, Fields, ProcessState, StatesService, WriteService,
};

fn cli() -> Command {
    let collection = Arg::new("collection")
        .help("Collection path, e.g. 'users' or 'users/u1/posts'")
        .required(true)
        .index(1);
    let id = Arg::new("id")
        .help("Document ID")
        .required(true)
        .index(2);

    Command::new("docwriter")
        .about("Create, update and delete documents in a Firestore database")
        .arg(
            Arg::new("memory")
                .help("Use a throwaway in-memory store instead of Firestore")
                .long("memory")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Create a document with a generated ID")
                .arg(collection.clone())
                .arg(Arg::new("data").help("Document fields as a JSON object").required(true).index(2)),
        )
        .subcommand(
            Command::new("update")
                .about("Update fields of an existing document")
                .arg(collection.clone())
                .arg(id.clone())
                .arg(Arg::new("data").help("Fields to merge as a JSON object").required(true).index(3)),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a document")
                .arg(collection)
                .arg(id),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,docwriter=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    let matches = cli().get_matches();

    let store: Arc<dyn DocumentStore> = if matches.get_flag("memory") {
        info!("Using in-memory document store");
        Arc::new(InMemoryStore::new())
    } else {
        let config = Config::from_env()?;
        let firestore = config.firestore()?;
        info!("Using Firestore project '{}' at {}", firestore.project_id, firestore.base_url);
        Arc::new(FirestoreRestStore::new(firestore)?)
    };

    let service: WriteService<Fields> = WriteService::new(store, StatesService::new());
    let watcher = spawn_state_logger(service.states());

    let outcome = run(&service, &matches).await;

    // Dropping the last sender ends the logger loop
    drop(service);
    if let Err(e) = watcher.await {
        warn!("State logger task failed: {}", e);
    }

    outcome
}

async fn run(service: &WriteService<Fields>, matches: &ArgMatches) -> Result<()> {
    let result = match matches.subcommand() {
        Some(("create", args)) => {
            let data = parse_fields(args)?;
            service
                .create_document(required(args, "collection")?, &data)
                .await
                .map(|id| println!("{}", id))
        }
        Some(("update", args)) => {
            let data = parse_fields(args)?;
            service
                .update_document(required(args, "collection")?, required(args, "id")?, &data)
                .await
        }
        Some(("delete", args)) => {
            service
                .delete_document(required(args, "collection")?, required(args, "id")?)
                .await
        }
        _ => return Err(anyhow!("Unknown command")),
    };

    result.map_err(|e| anyhow!("{} [{}]", e.user_message(), e.error_code()))
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing argument '{}'", name))
}

fn parse_fields(args: &ArgMatches) -> Result<Fields> {
    let raw = required(args, "data")?;
    match serde_json::from_str(raw)? {
        serde_json::Value::Object(fields) => Ok(fields),
        _ => Err(anyhow!("Document data must be a JSON object")),
    }
}

/// Log every state transition until all senders are gone
fn spawn_state_logger(states: &StatesService) -> tokio::task::JoinHandle<()> {
    let mut rx = states.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match state {
                ProcessState::Error { .. } => warn!("State: {}", state.description()),
                _ => info!("State: {}", state.description()),
            }
        }
    })
}
