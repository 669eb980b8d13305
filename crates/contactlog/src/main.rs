//! `contactlog` - CLI for the contact log
//!
//! This binary saves, lists, edits and marks contacts kept in a single
//! storage slot.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use chrono::Local;
use clap::Parser;

use contactlog::cli::{
    corrupt_slot_warning, render_contacts, render_details, render_stats, AddCommand, Cli,
    Command, ConfigCommand, EditCommand, ListCommand, OutputFormat,
};
use contactlog::contact::sort_by_name;
use contactlog::location::{geolocator_for, Geolocator};
use contactlog::storage::{open_backend, KeyValueStore};
use contactlog::{init_logging, Config, ContactStore, DialIntake};

type Store = ContactStore<Box<dyn KeyValueStore>>;
type Intake = DialIntake<Box<dyn Geolocator>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        command => run(&config, command).await,
    }
}

async fn run(config: &Config, command: Command) -> anyhow::Result<()> {
    let backend = open_backend(config).with_context(|| {
        format!(
            "failed to open {} storage at {}",
            config.storage.backend,
            config.storage_path().display()
        )
    })?;
    let store = ContactStore::with_key(backend, config.storage.key.clone());
    let intake = DialIntake::new(geolocator_for(config.tagging.place.as_ref()), &config.tagging);

    // Checked before any command runs, since a write replaces the data.
    if store.is_corrupt().await? {
        eprintln!("{}", corrupt_slot_warning(store.key()));
    }

    match command {
        Command::Dial(cmd) => {
            let saved = intake.save(&store, cmd.into()).await?;
            println!("Saved {} <{}> at {}", saved.name, saved.number, saved.location);
        }
        Command::Add(cmd) => handle_add(&store, &intake, cmd).await?,
        Command::List(cmd) => handle_list(&store, &cmd).await?,
        Command::Show(cmd) => {
            let matches = store.find_by_number(&cmd.number).await?;
            if matches.is_empty() {
                anyhow::bail!("no contact with number {}", cmd.number);
            }
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                for contact in &matches {
                    print!("{}", render_details(contact));
                }
            }
        }
        Command::Edit(cmd) => handle_edit(&store, cmd).await?,
        Command::Mark(cmd) => {
            let updated = store.mark_contacted(&cmd.name, &cmd.number).await?;
            if updated == 0 {
                println!("No contact named {} with number {}", cmd.name, cmd.number);
            } else {
                println!("Marked {updated} contact(s) as contacted");
            }
        }
        Command::Stats(cmd) => {
            let stats = store.stats().await?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", render_stats(&stats));
            }
        }
        Command::Config(cmd) => handle_config(config, cmd)?,
    }

    Ok(())
}

async fn handle_add(store: &Store, intake: &Intake, cmd: AddCommand) -> anyhow::Result<()> {
    let time = intake.format_time(&Local::now());
    let location = match &cmd.location {
        Some(location) => location.clone(),
        None => intake.resolve_location().await,
    };
    let contact = cmd.into_contact(time, location);
    contact.validate()?;

    let saved = store.add(contact).await?;
    println!("Added {} <{}>", saved.name, saved.number);
    Ok(())
}

async fn handle_list(store: &Store, cmd: &ListCommand) -> anyhow::Result<()> {
    let mut contacts = store.get_all().await?;
    if cmd.sort_by_name {
        sort_by_name(&mut contacts);
    }

    if contacts.is_empty() && cmd.format != OutputFormat::Json {
        println!("No contacts saved.");
        return Ok(());
    }
    print!("{}", render_contacts(&contacts, cmd.format)?);
    if cmd.format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

async fn handle_edit(store: &Store, cmd: EditCommand) -> anyhow::Result<()> {
    let number = cmd.number.clone();
    let updated = store
        .edit_by_number(&number, |current| cmd.apply(current))
        .await?;
    if updated == 0 {
        println!("No contact with number {number}; added it as a new contact");
    } else {
        println!("Updated {updated} contact(s)");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Path:               {}", config.storage_path().display());
                println!("  Slot key:           {}", config.storage.key);
                println!();
                println!("[Tagging]");
                println!("  Time format:        {}", config.tagging.time_format);
                println!("  Fallback location:  {}", config.tagging.fallback_location);
                println!(
                    "  Fixed place:        {}",
                    config
                        .tagging
                        .place
                        .as_ref()
                        .and_then(|p| p.label())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
