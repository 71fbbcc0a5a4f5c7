use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use storage::dto::team_member::TeamMemberDraft;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use web::{
    Config, Stores,
    features::{
        entries::{Decision, EntriesTab},
        roster::{HEADING, RosterSection, RosterView},
        teams::TeamsTab,
    },
    notify::Notifier,
};

#[derive(Parser)]
#[command(name = "site-admin")]
#[command(about = "Manage the team roster and competition entries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the public team section
    Roster,
    #[command(subcommand)]
    Teams(TeamCommands),
    Competitions,
    Entries {
        #[arg(long)]
        competition: Uuid,
    },
    Approve {
        competition: Uuid,
        entry: Uuid,
    },
    Reject {
        competition: Uuid,
        entry: Uuid,
    },
}

#[derive(Subcommand)]
enum TeamCommands {
    List,
    Add {
        #[command(flatten)]
        fields: MemberFields,
    },
    Edit {
        id: Uuid,

        #[command(flatten)]
        fields: MemberFields,
    },
    Delete {
        id: Uuid,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Default)]
struct MemberFields {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    role: Option<String>,

    #[arg(long)]
    bio: Option<String>,

    #[arg(long, conflicts_with = "image")]
    image_url: Option<String>,

    /// Local image uploaded before the member is saved
    #[arg(long)]
    image: Option<PathBuf>,

    #[arg(long)]
    linkedin_url: Option<String>,

    #[arg(long)]
    email: Option<String>,
}

impl MemberFields {
    /// Overwrite the draft with every field given on the command line
    fn apply(&self, draft: &mut TeamMemberDraft) {
        let pairs = [
            (&self.name, &mut draft.name),
            (&self.role, &mut draft.role),
            (&self.bio, &mut draft.bio),
            (&self.image_url, &mut draft.image_url),
            (&self.linkedin_url, &mut draft.linkedin_url),
            (&self.email, &mut draft.email),
        ];
        for (value, field) in pairs {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("site_admin={},web={},storage={}", log_level, log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!("Using {:?} backend", config.backend);
    let stores = config.connect().await?;

    match cli.command {
        Commands::Roster => show_roster(&stores).await,
        Commands::Teams(command) => handle_teams(command, &stores, &config.image_bucket).await,
        Commands::Competitions => list_competitions(&stores).await,
        Commands::Entries { competition } => list_entries(&stores, competition).await,
        Commands::Approve { competition, entry } => {
            moderate(&stores, competition, entry, Decision::Approve).await
        }
        Commands::Reject { competition, entry } => {
            moderate(&stores, competition, entry, Decision::Reject).await
        }
    }
}

async fn show_roster(stores: &Stores) -> Result<()> {
    let mut view = RosterView::new(stores.tables.clone());
    view.mount().await;

    match view.render() {
        RosterSection::Members { cards, .. } => {
            println!("{}", HEADING);
            for card in cards {
                println!("  {} - {}", card.member.name, card.member.role);
            }
        }
        _ => tracing::info!("No active team members to show"),
    }
    Ok(())
}

async fn handle_teams(command: TeamCommands, stores: &Stores, bucket: &str) -> Result<()> {
    let mut tab = TeamsTab::new(stores.tables.clone(), stores.objects.clone(), bucket);
    let result = run_team_command(command, &mut tab).await;
    report(tab.notifications());
    result
}

async fn run_team_command(command: TeamCommands, tab: &mut TeamsTab) -> Result<()> {
    match command {
        TeamCommands::List => {
            tab.mount().await?;
            for member in tab.members() {
                println!(
                    "{}  {:<8}  {} - {}",
                    member.id, member.status, member.name, member.role
                );
            }
        }
        TeamCommands::Add { fields } => {
            tab.open_create();
            fill_form(tab, &fields).await?;
            let id = tab.submit().await?;
            println!("{}", id);
        }
        TeamCommands::Edit { id, fields } => {
            tab.mount().await?;
            let member = tab
                .members()
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .with_context(|| format!("No team member with id {}", id))?;

            tab.open_edit(&member);
            fill_form(tab, &fields).await?;
            tab.submit().await?;
        }
        TeamCommands::Delete { id, yes } => {
            tab.mount().await?;
            let confirm = |question: &str| yes || prompt(question);
            if !tab.delete(id, &confirm).await? {
                tracing::info!("Delete cancelled");
            }
        }
    }
    Ok(())
}

async fn fill_form(tab: &mut TeamsTab, fields: &MemberFields) -> Result<()> {
    if let Some(draft) = tab.draft_mut() {
        fields.apply(draft);
    }

    if let Some(path) = &fields.image {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        tab.upload_image(&file_name(path)?, bytes).await?;
    }
    Ok(())
}

fn file_name(path: &Path) -> Result<String> {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => Ok(name.to_string()),
        None => bail!("{} has no usable file name", path.display()),
    }
}

async fn list_competitions(stores: &Stores) -> Result<()> {
    let mut tab = EntriesTab::new(stores.tables.clone());
    let result = tab.mount().await;
    report(tab.notifications());
    result?;

    for competition in tab.competitions() {
        println!("{}  {}", competition.id, competition.title);
    }
    Ok(())
}

async fn list_entries(stores: &Stores, competition: Uuid) -> Result<()> {
    let mut tab = EntriesTab::new(stores.tables.clone());
    tab.choose_competition(Some(competition)).await;
    report(tab.notifications());

    if let Some(message) = tab.empty_state() {
        println!("{}", message);
    }
    for entry in tab.entries() {
        println!(
            "{}  {:<8}  {}  {}  {}  ticket {}",
            entry.id,
            entry.status,
            entry.name,
            entry.email,
            entry.phone,
            entry.ticket_number.as_deref().unwrap_or("pending"),
        );
    }
    Ok(())
}

async fn moderate(stores: &Stores, competition: Uuid, id: Uuid, decision: Decision) -> Result<()> {
    let mut tab = EntriesTab::new(stores.tables.clone());
    tab.choose_competition(Some(competition)).await;

    let Some(entry) = tab.entries().iter().find(|e| e.id == id).cloned() else {
        report(tab.notifications());
        bail!("No entry {} in competition {}", id, competition);
    };

    tab.open_details(&entry);
    if !tab.can_transition(decision) {
        println!("Entry {} is already {}", id, entry.status);
        return Ok(());
    }

    let result = tab.transition(id, decision).await;
    report(tab.notifications());
    result?;
    Ok(())
}

/// Print pending toasts to stderr
fn report(notifications: &mut Notifier) {
    for notification in notifications.drain() {
        eprintln!("{}: {}", notification.title, notification.description);
    }
}

fn prompt(question: &str) -> bool {
    eprint!("{} [y/N] ", question);
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
