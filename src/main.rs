mod admin;
mod cli;
mod config;
mod error;
mod logging;
mod relations;
mod store;
mod template;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cli::commands;
use cli::{OutputMode, create_handler};
use error::RelatedError;
use relations::{EntityId, Taxonomy};
use std::path::PathBuf;
use store::{Product, SqliteStore};
use template::TemplateEngine;

#[derive(Parser)]
#[command(name = "related-products")]
#[command(about = "Curated, optionally reciprocating related products for a product catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory to read .related-products/config.toml from
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Catalog database (overrides store.path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Write logs to this file as well
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit JSON instead of console text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress normal output
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show an entity's stored related products
    Show { entity: EntityId },

    /// Save related products, as the product edit form does
    Save {
        entity: EntityId,

        /// Submitted IDs; invalid values are dropped, none deletes the list
        ids: Vec<String>,

        /// Submit without the field, deleting the list
        #[arg(long, conflicts_with = "ids")]
        clear: bool,
    },

    /// Should the related block be forced to display?
    Display {
        entity: EntityId,

        /// The host's own decision
        #[arg(long)]
        host: bool,
    },

    /// Should taxonomy overlap count toward relatedness?
    Relevance {
        entity: EntityId,

        #[arg(long, value_enum, default_value_t = TaxonomyArg::Category)]
        taxonomy: TaxonomyArg,

        /// The host's own flag
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        host: bool,
    },

    /// Print the related-products query for an entity
    Query {
        entity: EntityId,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the related products shown for an entity
    Related {
        entity: EntityId,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Render the product edit screen selector
    Selector { entity: EntityId },

    /// Plugin settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Catalog products
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// List registered extension points
    Hooks,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show current settings
    Show,

    /// Issue a form token for the configured admin user
    Token,

    /// Submit the settings form
    Submit {
        /// Empty-list behavior: "" for default, "none" to show nothing
        #[arg(long)]
        empty_behavior: Option<String>,

        /// Check the reciprocate box
        #[arg(long)]
        reciprocate: bool,

        /// Form token from `settings token`
        #[arg(long)]
        token: Option<String>,
    },

    /// Render the settings page
    Render {
        /// Include the saved notice
        #[arg(long)]
        saved: bool,
    },
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// Add or replace a product
    Add {
        id: EntityId,
        name: String,

        #[arg(long)]
        sku: Option<String>,

        #[arg(long, default_value = "publish")]
        status: String,

        /// Category term ID (repeatable)
        #[arg(long = "category")]
        categories: Vec<u64>,

        /// Tag term ID (repeatable)
        #[arg(long = "tag")]
        tags: Vec<u64>,
    },

    /// List products
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum TaxonomyArg {
    Category,
    Tag,
}

impl From<TaxonomyArg> for Taxonomy {
    fn from(arg: TaxonomyArg) -> Self {
        match arg {
            TaxonomyArg::Category => Taxonomy::Category,
            TaxonomyArg::Tag => Taxonomy::Tag,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match run(cli) {
        Err(err)
            if err
                .downcast_ref::<RelatedError>()
                .is_some_and(RelatedError::is_request_fatal) =>
        {
            eprintln!("✗ Request rejected: {}", err);
            std::process::exit(2);
        }
        other => other,
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::AppConfig::load(cli.dir.as_deref())?;

    let log_file = match cli.log_file {
        Some(path) => Some(path),
        None => config.log_file()?,
    };
    let _log_guard = logging::init_logging(cli.debug, cli.quiet, log_file.as_deref())?;

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Console
    };
    let handler = create_handler(mode);
    let handler = handler.as_ref();

    let db_path = match cli.db {
        Some(path) => path,
        None => config.store_path()?,
    };
    let mut store = SqliteStore::open(&db_path)?;
    let limit = |l: Option<usize>| l.unwrap_or(config.display.limit);

    match cli.command {
        Commands::Show { entity } => commands::show(&store, entity, handler)?,

        Commands::Save { entity, ids, clear } => {
            commands::save_related(&mut store, entity, &ids, clear, handler)?
        }

        Commands::Display { entity, host } => {
            commands::force_display(&store, entity, host, handler)?
        }

        Commands::Relevance {
            entity,
            taxonomy,
            host,
        } => commands::relevance(&store, entity, taxonomy.into(), host, handler)?,

        Commands::Query {
            entity,
            limit: requested,
        } => commands::query(&store, entity, limit(requested), handler)?,

        Commands::Related {
            entity,
            limit: requested,
        } => commands::related_products(&store, entity, limit(requested), handler)?,

        Commands::Selector { entity } => {
            let engine = TemplateEngine::new()?;
            commands::selector(&engine, &store, entity, handler)?
        }

        Commands::Settings(SettingsCommand::Show) => commands::settings_show(&store, handler)?,

        Commands::Settings(SettingsCommand::Token) => commands::settings_token(&config, handler)?,

        Commands::Settings(SettingsCommand::Submit {
            empty_behavior,
            reciprocate,
            token,
        }) => commands::settings_submit(
            &mut store,
            &config,
            empty_behavior,
            reciprocate,
            token,
            handler,
        )?,

        Commands::Settings(SettingsCommand::Render { saved }) => {
            let engine = TemplateEngine::new()?;
            commands::settings_render(&engine, &store, &config, saved, handler)?
        }

        Commands::Catalog(CatalogCommand::Add {
            id,
            name,
            sku,
            status,
            categories,
            tags,
        }) => {
            let product = Product {
                id,
                name,
                sku,
                status,
            };
            commands::catalog_add(&mut store, product, &categories, &tags, handler)?
        }

        Commands::Catalog(CatalogCommand::List) => commands::catalog_list(&store, handler)?,

        Commands::Hooks => commands::list_hooks(handler),
    }

    Ok(())
}
