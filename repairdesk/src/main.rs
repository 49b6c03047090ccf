use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use repairdesk_core::schema::format_date;
use repairdesk_core::{FinancialReport, NewTicket, RepairTicket, StatusLabels, TicketId, TicketPatch};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod storage;

use auth::CredentialGate;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json, Jsonl }

#[derive(Debug, Parser)]
#[command(name = "repairdesk", version, about = "Repair shop ticket desk: intake, search, print and report")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./repairdesk.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Ticket table to use instead of the configured one (.db/.sqlite selects SQLite)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[arg(long, global = true, env = "REPAIRDESK_USER")]
    user: Option<String>,
    #[arg(long, global = true, env = "REPAIRDESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version info
    Version,
    /// Print the SHA-256 digest to put in `auth.password_sha256`
    HashPassword { password: String },
    /// Register a device for repair and print its ticket id
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        brand: String,
        #[arg(long, default_value = "")]
        model: String,
        #[arg(long, default_value = "")]
        issue: String,
        /// Price agreed with the customer
        #[arg(long, default_value = "0")]
        cost: Decimal,
        /// Image file of the device
        #[arg(long)]
        photo: Option<PathBuf>,
        /// Also write the receipt and sticker page to this file
        #[arg(long)]
        print: Option<PathBuf>,
    },
    /// Case-sensitive search over customer name, phone and id; no query lists everything
    Search {
        query: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    Show {
        id: TicketId,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Change fields of an existing ticket
    Edit {
        id: TicketId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        issue: Option<String>,
        #[arg(long)]
        cost: Option<Decimal>,
        /// Cost of spare parts used
        #[arg(long)]
        parts: Option<Decimal>,
        /// Status label or token (in_repair, delivered)
        #[arg(long)]
        status: Option<String>,
        #[arg(long, conflicts_with = "clear_photo")]
        photo: Option<PathBuf>,
        #[arg(long)]
        clear_photo: bool,
    },
    Delete { id: TicketId },
    /// Income, parts and net profit over delivered tickets
    Report {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Receipt and sticker page for one ticket (stdout when --out is omitted)
    #[cfg(feature = "print")]
    Print {
        id: TicketId,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the stored device photo to a file
    Photo {
        id: TicketId,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write the whole table as CSV regardless of the storage backend
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match &cli.command {
        Commands::Version => {
            println!("repairdesk {} (core {})", env!("CARGO_PKG_VERSION"), repairdesk_core::version());
            return Ok(());
        }
        Commands::HashPassword { password } => {
            println!("{}", auth::password_digest(password));
            return Ok(());
        }
        _ => {}
    }

    let gate = CredentialGate::check(cfg.auth.as_ref(), cli.user.as_deref(), cli.password.as_deref());
    if !gate.granted() {
        bail!("login required: pass valid --user and --password (or REPAIRDESK_USER / REPAIRDESK_PASSWORD)");
    }
    let labels = cfg.status_labels();
    let mut store = storage::open_store(&cfg, cli.data.as_deref())?.with_gate(gate);
    if let Some(rec) = store.recovery() {
        match &rec.quarantined {
            Some(to) => eprintln!("warning: {}; the unreadable table was moved to {} and an empty one started", rec.reason, to),
            None => eprintln!("warning: {}; starting with an empty table", rec.reason),
        }
    }
    debug!(location = %store.location(), tickets = store.scan().len(), "store ready");

    match cli.command {
        Commands::Version | Commands::HashPassword { .. } => {}
        Commands::Add { name, phone, brand, model, issue, cost, photo, print } => {
            if print.is_some() && !cfg!(feature = "print") {
                bail!("--print needs a build with the `print` feature");
            }
            let id = store.create(NewTicket {
                customer_name: name.trim().to_string(),
                phone: phone.trim().to_string(),
                brand: cfg.canonical_brand(&brand),
                model: model.trim().to_string(),
                issue_description: issue.trim().to_string(),
                agreed_cost: cost,
                photo: read_photo(photo.as_deref())?,
            })?;
            println!("{id}");
            if let Some(out) = print {
                let t = store.get(id).ok_or_else(|| anyhow!("ticket {id} vanished after create"))?;
                write_sheet(t, &cfg, &labels, Some(&out))?;
            }
        }
        Commands::Search { query, format } => {
            let hits = store.search(query.as_deref().unwrap_or(""));
            match format {
                OutputFormat::Text => {
                    for t in &hits { println!("{}", ticket_line(t, &labels, &cfg.currency())); }
                    if hits.is_empty() { eprintln!("no matching tickets"); }
                }
                OutputFormat::Json => {
                    let arr = hits.iter().map(|t| ticket_json(t, &labels)).collect::<Result<Vec<_>>>()?;
                    println!("{}", serde_json::to_string_pretty(&arr)?);
                }
                OutputFormat::Jsonl => {
                    for t in &hits { println!("{}", serde_json::to_string(&ticket_json(t, &labels)?)?); }
                }
            }
        }
        Commands::Show { id, format } => {
            let t = store.get(id).ok_or_else(|| anyhow!("no ticket with id {id}"))?;
            match format {
                OutputFormat::Text => print!("{}", ticket_card(t, &labels, &cfg.currency())),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ticket_json(t, &labels)?)?),
                OutputFormat::Jsonl => println!("{}", serde_json::to_string(&ticket_json(t, &labels)?)?),
            }
        }
        Commands::Edit { id, name, phone, brand, model, issue, cost, parts, status, photo, clear_photo } => {
            let status = match status {
                Some(s) => Some(labels.parse(&s).ok_or_else(|| {
                    anyhow!("unknown status {s:?}; use {:?} or {:?}", labels.in_repair, labels.delivered)
                })?),
                None => None,
            };
            let photo = if clear_photo { Some(Vec::new()) } else { photo.as_deref().map(read_file).transpose()? };
            let patch = TicketPatch {
                customer_name: name.map(|s| s.trim().to_string()),
                phone: phone.map(|s| s.trim().to_string()),
                brand: brand.map(|b| cfg.canonical_brand(&b)),
                model: model.map(|s| s.trim().to_string()),
                issue_description: issue.map(|s| s.trim().to_string()),
                agreed_cost: cost,
                parts_cost: parts,
                status,
                photo,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            let t = store.update(id, &patch)?;
            print!("{}", ticket_card(&t, &labels, &cfg.currency()));
        }
        Commands::Delete { id } => {
            let t = store.delete(id)?;
            println!("deleted {} ({})", t.id, t.customer_name);
        }
        Commands::Report { format } => {
            let r = store.report()?;
            match format {
                OutputFormat::Text => print!("{}", report_text(&r, &cfg.currency())),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&r)?),
                OutputFormat::Jsonl => println!("{}", serde_json::to_string(&r)?),
            }
        }
        #[cfg(feature = "print")]
        Commands::Print { id, out } => {
            let t = store.get(id).ok_or_else(|| anyhow!("no ticket with id {id}"))?;
            write_sheet(t, &cfg, &labels, out.as_deref())?;
        }
        Commands::Photo { id, out } => {
            let t = store.get(id).ok_or_else(|| anyhow!("no ticket with id {id}"))?;
            if !t.has_photo() {
                bail!("ticket {id} has no photo");
            }
            fs::write(&out, &t.photo).with_context(|| format!("writing {}", out.display()))?;
        }
        Commands::Export { out } => {
            ticket_csv::write_tickets(&out, store.scan())?;
            println!("exported {} tickets to {}", store.scan().len(), out.display());
        }
    }
    Ok(())
}

#[cfg(feature = "print")]
fn write_sheet(t: &RepairTicket, cfg: &config::Config, labels: &StatusLabels, out: Option<&Path>) -> Result<()> {
    let page = receipts::print_sheet(t, &cfg.shop_profile(), labels);
    match out {
        Some(p) => fs::write(p, page).with_context(|| format!("writing {}", p.display())),
        None => {
            print!("{page}");
            Ok(())
        }
    }
}

#[cfg(not(feature = "print"))]
fn write_sheet(_: &RepairTicket, _: &config::Config, _: &StatusLabels, _: Option<&Path>) -> Result<()> {
    bail!("printing needs a build with the `print` feature")
}

fn read_file(p: &Path) -> Result<Vec<u8>> {
    fs::read(p).with_context(|| format!("reading {}", p.display()))
}

fn read_photo(p: Option<&Path>) -> Result<Vec<u8>> {
    Ok(p.map(read_file).transpose()?.unwrap_or_default())
}

/// The ticket's own serialization plus display-only fields.
fn ticket_json(t: &RepairTicket, labels: &StatusLabels) -> Result<serde_json::Value> {
    let mut v = serde_json::to_value(t)?;
    if let Some(obj) = v.as_object_mut() {
        obj.insert("status_label".into(), labels.label(t.status).into());
        obj.insert("has_photo".into(), t.has_photo().into());
    }
    Ok(v)
}

fn ticket_line(t: &RepairTicket, labels: &StatusLabels, currency: &str) -> String {
    format!(
        "{} | {} | {} | {} | {} {} | {} | {}",
        t.id,
        t.customer_name,
        t.phone,
        t.device(),
        t.agreed_cost,
        currency,
        labels.label(t.status),
        format_date(t.created_date)
    )
}

fn ticket_card(t: &RepairTicket, labels: &StatusLabels, currency: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("ticket   {}\n", t.id));
    out.push_str(&format!("customer {}\n", t.customer_name));
    out.push_str(&format!("phone    {}\n", t.phone));
    out.push_str(&format!("device   {}\n", t.device()));
    out.push_str(&format!("issue    {}\n", t.issue_description));
    out.push_str(&format!("cost     {} {}\n", t.agreed_cost, currency));
    out.push_str(&format!("parts    {} {}\n", t.parts_cost, currency));
    out.push_str(&format!("status   {}\n", labels.label(t.status)));
    out.push_str(&format!("date     {}\n", format_date(t.created_date)));
    out.push_str(&format!("photo    {}\n", if t.has_photo() { "yes" } else { "no" }));
    out
}

fn report_text(r: &FinancialReport, currency: &str) -> String {
    format!(
        "income      {} {c}\nparts       {} {c}\nnet profit  {} {c}\ndelivered   {}\nin repair   {}\n",
        r.income,
        r.parts_total,
        r.net_profit,
        r.delivered,
        r.in_repair,
        c = currency
    )
}
