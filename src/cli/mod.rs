mod commands;
pub mod error;
pub mod utils;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, ENV_DB_PATH, ENV_DELETE_POLICY};
use crate::db::{Database, DeletePolicy, Id, SqliteDatabase};
use commands::PageParams;
use commands::item::PriceRange;
use error::CliResult;

#[derive(Parser)]
#[command(name = "reviewdb")]
#[command(author, version, about = "Customer, item and review store", long_about = None)]
pub struct Cli {
    /// Database file path (defaults to XDG data directory: ~/.local/share/reviewdb/reviewdb.db)
    #[arg(long, global = true, env = ENV_DB_PATH)]
    pub db: Option<PathBuf>,

    /// What to do with reviews when deleting their customer or item (restrict or cascade)
    #[arg(long, global = true, env = ENV_DELETE_POLICY)]
    pub on_delete: Option<DeletePolicy>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Customer management commands
    Customer {
        #[command(subcommand)]
        command: CustomerCommands,
    },
    /// Item management commands
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Review management commands
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },
}

/// Shared paging flags for list commands
#[derive(Args)]
struct PageArgs {
    /// Maximum number of rows
    #[arg(long)]
    limit: Option<usize>,
    /// Rows to skip
    #[arg(long)]
    offset: Option<usize>,
    /// Field to sort by
    #[arg(long)]
    sort: Option<String>,
    /// Sort order (asc or desc)
    #[arg(long)]
    order: Option<String>,
}

impl PageArgs {
    fn params(&self) -> PageParams<'_> {
        PageParams {
            limit: self.limit,
            offset: self.offset,
            sort: self.sort.as_deref(),
            order: self.order.as_deref(),
        }
    }
}

#[derive(Subcommand)]
enum CustomerCommands {
    /// Create a customer
    Create {
        /// Customer name
        name: String,
    },
    /// Show a customer and its reviews
    Get {
        id: Id,
        /// Exclusion path, e.g. reviews.item (repeatable)
        #[arg(long = "exclude", short = 'x')]
        exclude: Vec<String>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List customers
    List {
        /// Case-insensitive name filter
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        page: PageArgs,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Rename a customer
    Update {
        id: Id,
        #[arg(long)]
        name: String,
    },
    /// Delete a customer
    Delete { id: Id },
    /// List the items a customer has reviewed
    Items {
        id: Id,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Add an item to a customer by creating a review
    AddItem {
        id: Id,
        item_id: Id,
        /// Optional review comment
        #[arg(long)]
        comment: Option<String>,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Create an item
    Create {
        name: String,
        #[arg(allow_negative_numbers = true)]
        price: f64,
    },
    /// Show an item and its reviews
    Get {
        id: Id,
        /// Exclusion path, e.g. reviews.customer (repeatable)
        #[arg(long = "exclude", short = 'x')]
        exclude: Vec<String>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List items
    List {
        /// Case-insensitive name filter
        #[arg(long)]
        name: Option<String>,
        /// Minimum price (inclusive)
        #[arg(long)]
        min_price: Option<f64>,
        /// Maximum price (inclusive)
        #[arg(long)]
        max_price: Option<f64>,
        #[command(flatten)]
        page: PageArgs,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Change an item's name or price
    Update {
        id: Id,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        price: Option<f64>,
    },
    /// Delete an item
    Delete { id: Id },
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// Create a review
    Create {
        customer_id: Id,
        item_id: Id,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Show a review with its customer and item
    Get {
        id: Id,
        /// Exclusion path, e.g. customer (repeatable)
        #[arg(long = "exclude", short = 'x')]
        exclude: Vec<String>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List reviews
    List {
        #[arg(long)]
        customer: Option<Id>,
        #[arg(long)]
        item: Option<Id>,
        #[command(flatten)]
        page: PageArgs,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Change or clear a review's comment
    Update {
        id: Id,
        #[arg(long, conflicts_with = "clear_comment")]
        comment: Option<String>,
        #[arg(long)]
        clear_comment: bool,
    },
    /// Delete a review
    Delete { id: Id },
}

/// Log to stderr so table and json output on stdout stay clean.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reviewdb=warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

async fn open_database(cli: &Cli) -> CliResult<SqliteDatabase> {
    let mut config = Config::from_env()?;
    if let Some(path) = &cli.db {
        config.db_path = path.clone();
    }
    if let Some(policy) = cli.on_delete {
        config.delete_policy = policy;
    }

    if let Some(parent) = config.db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let db = SqliteDatabase::connect(&config).await?;
    db.migrate().await?;
    Ok(db)
}

async fn dispatch<D: Database>(db: &D, command: Commands) -> CliResult<String> {
    match command {
        Commands::Customer { command } => match command {
            CustomerCommands::Create { name } => {
                commands::customer::create_customer(db, &name).await
            }
            CustomerCommands::Get {
                id,
                exclude,
                format,
            } => commands::customer::get_customer(db, id, &exclude, &format).await,
            CustomerCommands::List { name, page, format } => {
                commands::customer::list_customers(db, name.as_deref(), page.params(), &format)
                    .await
            }
            CustomerCommands::Update { id, name } => {
                commands::customer::update_customer(db, id, &name).await
            }
            CustomerCommands::Delete { id } => commands::customer::delete_customer(db, id).await,
            CustomerCommands::Items { id, format } => {
                commands::customer::customer_items(db, id, &format).await
            }
            CustomerCommands::AddItem {
                id,
                item_id,
                comment,
            } => commands::customer::add_item(db, id, item_id, comment.as_deref()).await,
        },
        Commands::Item { command } => match command {
            ItemCommands::Create { name, price } => {
                commands::item::create_item(db, &name, price).await
            }
            ItemCommands::Get {
                id,
                exclude,
                format,
            } => commands::item::get_item(db, id, &exclude, &format).await,
            ItemCommands::List {
                name,
                min_price,
                max_price,
                page,
                format,
            } => {
                let price = PriceRange {
                    min: min_price,
                    max: max_price,
                };
                commands::item::list_items(db, name.as_deref(), price, page.params(), &format)
                    .await
            }
            ItemCommands::Update { id, name, price } => {
                commands::item::update_item(db, id, name.as_deref(), price).await
            }
            ItemCommands::Delete { id } => commands::item::delete_item(db, id).await,
        },
        Commands::Review { command } => match command {
            ReviewCommands::Create {
                customer_id,
                item_id,
                comment,
            } => {
                commands::review::create_review(db, customer_id, item_id, comment.as_deref())
                    .await
            }
            ReviewCommands::Get {
                id,
                exclude,
                format,
            } => commands::review::get_review(db, id, &exclude, &format).await,
            ReviewCommands::List {
                customer,
                item,
                page,
                format,
            } => {
                commands::review::list_reviews(db, customer, item, page.params(), &format).await
            }
            ReviewCommands::Update {
                id,
                comment,
                clear_comment,
            } => commands::review::update_review(db, id, comment.as_deref(), clear_comment).await,
            ReviewCommands::Delete { id } => commands::review::delete_review(db, id).await,
        },
    }
}

pub async fn run() -> miette::Result<()> {
    let mut cli = Cli::parse();
    init_tracing();

    let Some(command) = cli.command.take() else {
        // Show help when no command provided
        let _ = Cli::parse_from(["reviewdb", "--help"]);
        return Ok(());
    };

    let db = open_database(&cli).await?;
    let output = dispatch(&db, command).await?;
    println!("{}", output);
    Ok(())
}
