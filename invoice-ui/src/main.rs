use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

use invoice_core::InvoiceStatus;
use invoice_ui::utils::parse_item_spec;
use invoice_ui::{
    AppConfig, ConsoleNotifier, InvoiceApp, SaveOutcome, build_registry, logging, views,
};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Create, edit and review invoices.
///
/// Settings come from a TOML file; `--backend` and `--db` override the
/// `[database]` table.
#[derive(Debug, Parser)]
#[command(name = "InvoiceManager")]
struct Cli {
    /// Config file. Defaults to `<executable name>.toml` if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string, e.g. `sqlite:invoices.db?mode=rwc`.
    #[arg(long)]
    db: Option<String>,

    /// Log level or filter directive, overriding the config file.
    #[arg(long)]
    log_level: Option<String>,

    /// Print results only; suppress log output on stdout.
    #[arg(long, short)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Totals and the most recent invoices.
    Dashboard,
    /// All invoices, optionally filtered by number or client name.
    List {
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Client directory.
    Clients,
    /// Placeholder for analytics.
    Reports,
    /// Create a new invoice.
    Create(InvoiceArgs),
    /// Change an existing invoice. Omitted options keep their stored values.
    Edit {
        id: i64,
        #[command(flatten)]
        fields: InvoiceArgs,
    },
    /// Remove an invoice and its line items.
    Delete {
        id: i64,
    },
}

#[derive(Debug, Args)]
struct InvoiceArgs {
    /// Client id.
    #[arg(long)]
    client: Option<i64>,

    /// Issue date, YYYY-MM-DD. Defaults to today for new invoices.
    #[arg(long)]
    issue: Option<String>,

    /// Due date, YYYY-MM-DD.
    #[arg(long)]
    due: Option<String>,

    /// Discount percentage, 0 to 100.
    #[arg(long)]
    discount: Option<String>,

    /// draft, sent, paid or overdue.
    #[arg(long)]
    status: Option<String>,

    #[arg(long)]
    notes: Option<String>,

    /// Line item as `description:quantity:rate`. Repeat for more items;
    /// when given, replaces every existing item.
    #[arg(long = "item")]
    items: Vec<String>,
}

// ─── form filling ────────────────────────────────────────────────────────────

fn fill_form(
    app: &mut InvoiceApp,
    args: &InvoiceArgs,
) -> anyhow::Result<()> {
    let Some(form) = app.router_mut().form_mut() else {
        bail!("no invoice form is open");
    };

    if let Some(client) = args.client {
        form.draft_mut().client_id = Some(client);
    }
    if let Some(issue) = &args.issue {
        form.set_issue_date_input(issue)?;
    }
    if let Some(due) = &args.due {
        form.set_due_date_input(due)?;
    }
    if let Some(discount) = &args.discount {
        form.set_discount_input(discount)?;
    }
    if let Some(status) = &args.status {
        form.draft_mut().status = InvoiceStatus::parse(&status.to_lowercase())
            .with_context(|| format!("unknown status '{status}'"))?;
    }
    if let Some(notes) = &args.notes {
        form.draft_mut().notes = notes.clone();
    }

    let items = args
        .items
        .iter()
        .map(|spec| parse_item_spec(spec))
        .collect::<Result<Vec<_>, _>>()?;
    form.replace_items(items);
    Ok(())
}

async fn save(app: &mut InvoiceApp) -> anyhow::Result<()> {
    if let Some(form) = app.router().form() {
        print!("{}", views::invoice_form(form));
    }
    match app.save().await? {
        SaveOutcome::Created(invoice) | SaveOutcome::Updated(invoice) => {
            println!("Saved invoice {} (id {})", invoice.invoice_number, invoice.id);
            Ok(())
        }
        SaveOutcome::Rejected(e) => bail!("invoice was not saved: {e}"),
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(&AppConfig::default_path())?,
    };
    if let Some(backend) = cli.backend {
        config.database.backend = backend;
    }
    if let Some(db) = cli.db {
        config.database.connection_string = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    logging::init_logging(&config.log_level);
    if cli.quiet {
        logging::set_stdout_enabled(false)?;
    }
    if let Some(path) = &config.log_file {
        if let Err(e) = logging::enable_file_logging(path) {
            warn!("{e:#}");
        }
    }

    debug!("connecting to {} backend", config.database.backend);
    let registry = build_registry();
    let repo = registry
        .create(&config.database)
        .await
        .with_context(|| format!("cannot open {} database", config.database.backend))?;

    let mut app = InvoiceApp::new(repo, Arc::new(ConsoleNotifier::stderr()), config);

    match cli.command {
        Command::Dashboard => {
            let stats = app.dashboard().await?;
            let clients = app.clients().await?;
            print!("{}", views::dashboard(&stats, &clients));
        }
        Command::List { search } => {
            let rows = app.invoice_list(search.as_deref().unwrap_or("")).await?;
            print!("{}", views::invoice_list(&rows));
        }
        Command::Clients => {
            let clients = app.clients().await?;
            print!("{}", views::clients(&clients));
        }
        Command::Reports => print!("{}", views::reports()),
        Command::Create(fields) => {
            app.create();
            fill_form(&mut app, &fields)?;
            save(&mut app).await?;
        }
        Command::Edit { id, fields } => {
            app.edit(id)
                .await
                .with_context(|| format!("cannot load invoice {id}"))?;
            fill_form(&mut app, &fields)?;
            save(&mut app).await?;
        }
        Command::Delete { id } => {
            app.delete_invoice(id)
                .await
                .with_context(|| format!("cannot delete invoice {id}"))?;
            println!("Deleted invoice {id}");
        }
    }

    Ok(())
}
