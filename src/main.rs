use std::fs::OpenOptions;
use std::io;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::{backend::CrosstermBackend, Terminal};

use archflow::actions;
use archflow::auth::{self, Session};
use archflow::config::Config;
use archflow::db::{self, Database};
use archflow::error::ActionError;
use archflow::models::{RegisterInput, Role};
use archflow::reports::{LabeledHours, ReportFilters, ReportKind, ReportPeriod};
use archflow::storage::LocalStorage;
use archflow::ui::App;

#[derive(Parser)]
#[command(name = "archflow", version, about = "Projects, time and deliverables for architecture studios")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the terminal interface (default)
    Tui,
    /// Apply database migrations and exit
    Migrate,
    /// Create a user account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "editor")]
        role: Role,
    },
    /// Print the business or productivity report for a period
    Report {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// today, week, month, quarter or YYYY-MM-DD..YYYY-MM-DD
        #[arg(long, default_value = "month")]
        period: ReportPeriod,
        #[arg(long)]
        business: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print your own hours for a period, by project, client and category
    Timesheet {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "month")]
        period: ReportPeriod,
        #[arg(long)]
        json: bool,
    },
    /// Print the firm dashboard
    Dashboard {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Serialize)]
struct Timesheet {
    period: String,
    projects: Vec<LabeledHours>,
    clients: Vec<LabeledHours>,
    categories: Vec<LabeledHours>,
}

/// The terminal belongs to the interface, so logs go to a file.
fn init_logging(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("failed to open log file {}", config.log_file.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("archflow=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

async fn sign_in(db: &Database, email: &str, password: &str) -> Result<Session> {
    auth::authenticate(db, email, password).await.map_err(|e| match e {
        ActionError::Unauthorized => anyhow!("invalid email or password"),
        other => anyhow!(other),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_hours(title: &str, rows: &[LabeledHours]) {
    println!("{title}");
    for row in rows {
        println!("  {:<32} {:>8.1}h", row.name, row.hours);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_logging(&config)?;

    let db = db::init(&config).await?;
    let today = Utc::now().date_naive();

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => run_tui(db, config).await?,
        Command::Migrate => {
            db.migrate().await?;
            println!("Database is up to date");
        }
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let input = RegisterInput {
                full_name: name,
                email,
                password,
                role,
            };
            let user = auth::register_user(&db, input).await.map_err(|e| anyhow!(e))?;
            println!("Registered {} ({})", user.full_name, user.id);
        }
        Command::Report {
            email,
            password,
            period,
            business,
            json,
        } => {
            let session = sign_in(&db, &email, &password).await?;
            let kind = if business { ReportKind::Business } else { ReportKind::Productivity };
            let filters = ReportFilters {
                period,
                project_ids: Vec::new(),
            };
            let report =
                actions::reports::report_preview(&db, &session, &filters, kind, today, config.default_bill_rate)
                    .await
                    .map_err(|e| anyhow!(e))?;
            if json {
                print_json(&report)?;
            } else {
                println!("Report for {}", report.period);
                println!("Revenue       {:>10.2}", report.business.total_revenue);
                println!("New clients   {:>10}", report.business.new_clients);
                println!("Hours         {:>10.1}", report.productivity.total_hours);
                println!("Billable      {:>10.1}", report.productivity.billable_hours);
                println!("Utilization   {:>9.0}%", report.productivity.average_utilization);
                for user in &report.productivity.user_ranking {
                    println!("  {:<28} {:>8.1}h {:>5.0}%", user.name, user.total_hours, user.utilization);
                }
            }
        }
        Command::Timesheet {
            email,
            password,
            period,
            json,
        } => {
            let session = sign_in(&db, &email, &password).await?;
            let range = period.range(today);
            let (projects, clients, categories) = tokio::try_join!(
                actions::reports::project_breakdown(&db, &session, range),
                actions::reports::time_by_client(&db, &session, range),
                actions::reports::time_by_category(&db, &session, range),
            )
            .map_err(|e| anyhow!(e))?;
            let sheet = Timesheet {
                period: range.label(),
                projects,
                clients,
                categories,
            };
            if json {
                print_json(&sheet)?;
            } else {
                println!("Timesheet for {}", sheet.period);
                print_hours("By project", &sheet.projects);
                print_hours("By client", &sheet.clients);
                print_hours("By category", &sheet.categories);
            }
        }
        Command::Dashboard { email, password } => {
            let session = sign_in(&db, &email, &password).await?;
            let metrics = actions::reports::dashboard_metrics(&db, &session, Utc::now(), config.default_bill_rate)
                .await
                .map_err(|e| anyhow!(e))?;
            print_json(&metrics)?;
        }
    }

    Ok(())
}

async fn run_tui(db: Database, config: Config) -> Result<()> {
    let objects = LocalStorage::new(&config.storage_dir, &config.storage_public_url);
    let mut app = App::new(db, objects, config);
    info!("starting terminal interface");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        eprintln!("Error: {err:#}");
    }
    info!("terminal interface closed");
    result
}
