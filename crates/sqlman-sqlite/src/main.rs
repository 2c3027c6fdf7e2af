//! sqlman CLI
//!
//! Inspects a SQLite schema and diffs tables against JSON column specs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use sqlman_core::affinity;
use sqlman_core::builder::Generator;
use sqlman_core::migrations::ColumnSpec;
use sqlman_sqlite::{Database, Introspector, IntrospectorConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Inspect SQLite schemas and diff them against column specs.
#[derive(Parser)]
#[command(name = "sqlman")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Attached schema to inspect.
    #[arg(short, long)]
    schema: Option<String>,

    /// Master table holding the schema.
    #[arg(long, default_value = "sqlite_master")]
    master_table: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the affinity of declared types.
    Affinity {
        /// Declared types, e.g. "VARCHAR(30)".
        #[arg(required = true)]
        types: Vec<String>,
    },

    #[command(flatten)]
    Schema(SchemaCommand),
}

/// Commands that read a live database.
#[derive(Subcommand)]
enum SchemaCommand {
    /// List tables.
    Tables,

    /// List views.
    Views,

    /// List indexes.
    Indexes {
        /// Only indexes of this table.
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Show the columns of a table as JSON.
    Info {
        /// Table name.
        table: String,
    },

    /// Print the stored CREATE TABLE statement.
    Ddl {
        /// Table name.
        table: String,
    },

    /// Diff a table against a JSON file of column specs.
    Diff {
        /// Table name.
        table: String,

        /// JSON object mapping column names to column specs.
        spec: PathBuf,

        /// Print ALTER statements instead of the diff.
        #[arg(long)]
        sql: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let command = match cli.command {
        Commands::Affinity { types } => {
            for declared in &types {
                println!("{declared}\t{}", affinity(declared));
            }
            return Ok(());
        }
        Commands::Schema(command) => command,
    };

    let db = Database::connect(&cli.database).await?;
    let config = IntrospectorConfig {
        master_table: cli.master_table,
        schema: cli.schema,
    };
    let introspector = Introspector::with_config(db, &config);

    match command {
        SchemaCommand::Tables => {
            for name in introspector.table_list().await? {
                println!("{name}");
            }
        }

        SchemaCommand::Views => {
            for name in introspector.view_list().await? {
                println!("{name}");
            }
        }

        SchemaCommand::Indexes { table } => {
            for index in introspector.index_list(table.as_deref()).await? {
                println!("{}\t{}", index.name, index.table);
            }
        }

        SchemaCommand::Info { table } => {
            let columns = introspector.table_info(&table).await?;
            println!("{}", serde_json::to_string_pretty(&columns)?);
        }

        SchemaCommand::Ddl { table } => {
            println!("{}", introspector.table_ddl(&table).await?);
        }

        SchemaCommand::Diff { table, spec, sql } => {
            let text = std::fs::read_to_string(&spec)?;
            let desired: IndexMap<String, ColumnSpec> = serde_json::from_str(&text)?;
            let diff = introspector.column_diff(&table, &desired).await?;
            if sql {
                for statement in diff.to_statements(&Generator::sqlite(), &table)? {
                    println!("{statement};");
                }
                if !diff.change.is_empty() {
                    info!(
                        columns = ?diff.change.keys().collect::<Vec<_>>(),
                        "Changed columns need a table rebuild"
                    );
                }
            } else if diff.is_empty() {
                info!(table = %table, "Table matches the column specs");
            } else {
                println!("{}", serde_json::to_string_pretty(&diff)?);
            }
        }
    }

    Ok(())
}
