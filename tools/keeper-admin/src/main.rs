//! Keeper Admin CLI
//!
//! Loads one keeper season from the league API and either prints its ledger
//! views or applies a single edit as the given manager.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

use keeper_ledger::{Actor, Roster, RosterId, SeasonYear};
use keeper_service::logging::initialize_logging_with_config;
use keeper_service::{EditStatus, KeeperServiceConfig, KeeperSession, ManualTradeInput};

#[derive(Parser)]
#[command(name = "keeper-admin")]
#[command(about = "Keeper and trade bookkeeping for the league - summaries, edits and the season lock")]
#[command(version = "0.1.0")]
struct Cli {
    /// Season year
    #[arg(short, long)]
    year: SeasonYear,

    /// TOML config file; environment variables are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Acting manager id
    #[arg(long)]
    manager_id: Option<String>,

    /// Acting manager name (legacy rosters without ids)
    #[arg(long)]
    manager_name: Option<String>,

    /// Act as league commissioner
    #[arg(long)]
    commissioner: bool,

    /// Print views as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Kept players per roster
    Summary,

    /// Manual and keeper trades
    Trades,

    /// Net draft budgets
    Budgets,

    /// Keepers, trades and budgets together
    Ledger,

    /// Players on one roster with their keeper state
    Roster {
        #[arg(short, long)]
        roster: RosterId,
    },

    /// Toggle keep on a player
    Keep {
        #[arg(short, long)]
        roster: RosterId,
        #[arg(short, long)]
        player: String,
    },

    /// Start or update a keeper trade
    Trade {
        #[arg(short, long)]
        roster: RosterId,
        #[arg(short, long)]
        player: String,
        /// Counterparty roster id
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// Cancel a keeper trade
    CancelTrade {
        #[arg(short, long)]
        roster: RosterId,
        #[arg(short, long)]
        player: String,
    },

    /// Record a cash trade between two rosters
    ManualTrade {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Delete a manual trade by id
    DeleteTrade {
        #[arg(long)]
        id: i64,
    },

    /// Lock keeper edits for the season (commissioner)
    Lock,

    /// Unlock keeper edits for the season (commissioner)
    Unlock,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => KeeperServiceConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => KeeperServiceConfig::from_env().context("loading config from environment")?,
    };
    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
    }
    initialize_logging_with_config(&config.logging)?;

    let actor = if cli.manager_id.is_some() || cli.manager_name.is_some() {
        Actor::manager(cli.manager_id.as_deref(), cli.manager_name.as_deref())
            .with_commissioner(cli.commissioner)
    } else {
        Actor::anonymous()
    };

    let mut session = KeeperSession::connect(&config)?.with_actor(actor);
    session.select_season(Some(cli.year)).await;
    if let Some(err) = session.last_error() {
        eprintln!("{}", format!("⚠️  {err}").yellow());
    }
    if session.rosters().is_empty() {
        bail!("no rosters loaded for {}", cli.year);
    }

    match cli.command {
        Commands::Summary => print_keepers(&session, cli.json)?,
        Commands::Trades => print_trades(&session, cli.json)?,
        Commands::Budgets => print_budgets(&session, cli.json)?,
        Commands::Ledger => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&session.ledger())?);
            } else {
                print_keepers(&session, false)?;
                print_trades(&session, false)?;
                print_budgets(&session, false)?;
            }
        }
        Commands::Roster { roster } => print_roster(&session, roster)?,
        Commands::Keep { roster, player } => {
            let index = player_index(&session, roster, &player)?;
            let status = session.toggle_keep(roster, index).await?;
            report(&session, "keep", status);
        }
        Commands::Trade { roster, player, to, amount, note } => {
            let mut index = player_index(&session, roster, &player)?;
            if !is_trading(&session, roster, index) {
                let status = match to.as_deref() {
                    Some(to) => {
                        let counterparty = keeper_ledger::parse_roster_id(to)?;
                        session.begin_trade(roster, index, counterparty).await?
                    }
                    None => session.toggle_trade(roster, index).await?,
                };
                report(&session, "begin trade", status);
                if status == EditStatus::Ignored {
                    return Ok(());
                }
                index = player_index(&session, roster, &player)?;
            } else if let Some(to) = to.as_deref() {
                let status = session.set_trade_counterparty(roster, index, to).await?;
                report(&session, "counterparty", status);
                index = player_index(&session, roster, &player)?;
            }
            if let Some(amount) = amount.as_deref() {
                let status = session.set_trade_amount(roster, index, amount).await?;
                report(&session, "amount", status);
                index = player_index(&session, roster, &player)?;
            }
            if let Some(note) = note.as_deref() {
                let status = session.set_trade_note(roster, index, note).await?;
                report(&session, "note", status);
            }
        }
        Commands::CancelTrade { roster, player } => {
            let index = player_index(&session, roster, &player)?;
            if !is_trading(&session, roster, index) {
                bail!("{player} is not being traded by roster {roster}");
            }
            let status = session.toggle_trade(roster, index).await?;
            report(&session, "cancel trade", status);
        }
        Commands::ManualTrade { from, to, amount, note } => {
            let input = ManualTradeInput { from, to, amount, note };
            let status = session.add_manual_trade(&input).await?;
            report(&session, "manual trade", status);
        }
        Commands::DeleteTrade { id } => {
            let status = session.delete_manual_trade(id).await?;
            report(&session, "delete trade", status);
        }
        Commands::Lock => {
            let status = session.set_keeper_lock(true).await?;
            report(&session, "lock", status);
        }
        Commands::Unlock => {
            let status = session.set_keeper_lock(false).await?;
            report(&session, "unlock", status);
        }
    }

    Ok(())
}

fn player_index(session: &KeeperSession, roster_id: RosterId, player_id: &str) -> Result<usize> {
    session
        .find_player(roster_id, player_id)
        .with_context(|| format!("player {player_id} not found on roster {roster_id}"))
}

fn is_trading(session: &KeeperSession, roster_id: RosterId, index: usize) -> bool {
    session.roster(roster_id).and_then(|r| r.players.get(index)).is_some_and(|p| p.trade)
}

fn report(session: &KeeperSession, action: &str, status: EditStatus) {
    match status {
        EditStatus::Applied => println!("{}", format!("✅ {action} saved").green()),
        EditStatus::Ignored => {
            println!("{}", format!("⛔ {action} not allowed for this manager or season").yellow())
        }
        EditStatus::Unsaved => println!(
            "{}",
            format!(
                "❌ {action} applied locally but not saved: {}",
                session.last_error().unwrap_or("unknown error")
            )
            .red()
        ),
    }
}

fn print_keepers(session: &KeeperSession, json: bool) -> Result<()> {
    let keepers = session.keeper_summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&keepers)?);
        return Ok(());
    }
    println!("{}", "📋 Keepers".cyan().bold());
    if keepers.is_empty() {
        println!("  (none)");
    }
    for entry in keepers {
        let players: Vec<String> = entry.players.iter().map(ToString::to_string).collect();
        println!("  {}: {}", entry.team_name.bold(), players.join(", "));
    }
    println!();
    Ok(())
}

fn print_trades(session: &KeeperSession, json: bool) -> Result<()> {
    let trades = session.trade_summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&trades)?);
        return Ok(());
    }
    println!("{}", "🔁 Trades".cyan().bold());
    if trades.is_empty() {
        println!("  (none)");
    }
    for trade in trades {
        let what = trade.player.as_deref().unwrap_or("cash");
        let kind = if trade.manual { "manual".blue() } else { "keeper".magenta() };
        print!("  [{}] {} → {}: {} ${}", kind, trade.from, trade.to, what, trade.amount);
        if !trade.note.is_empty() {
            print!(" ({})", trade.note);
        }
        println!();
    }
    println!();
    Ok(())
}

fn print_budgets(session: &KeeperSession, json: bool) -> Result<()> {
    let budgets = session.draft_budget_summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&budgets)?);
        return Ok(());
    }
    let base = session.rules().draft_budget_base;
    println!("{}", "💰 Draft budgets".cyan().bold());
    for entry in budgets {
        let amount = format!("${}", entry.amount);
        let amount = match entry.amount.cmp(&base) {
            std::cmp::Ordering::Greater => amount.green(),
            std::cmp::Ordering::Less => amount.red(),
            std::cmp::Ordering::Equal => amount.normal(),
        };
        println!("  {:<24} {}", entry.manager, amount);
    }
    println!();
    Ok(())
}

fn print_roster(session: &KeeperSession, roster_id: RosterId) -> Result<()> {
    let roster: &Roster =
        session.roster(roster_id).with_context(|| format!("roster {roster_id} not found"))?;
    let editable = if session.can_edit_roster(roster_id) { "editable".green() } else { "read-only".yellow() };
    println!("{} ({})", format!("🏈 {}", roster.label()).cyan().bold(), editable);
    for player in &roster.players {
        let cost = player.cost_to_keep.map_or_else(|| "-".to_string(), |c| format!("${c}"));
        let mut flags = Vec::new();
        if player.keep {
            flags.push("keep".green().to_string());
        }
        if player.trade {
            let label = player.trade_roster_id.map(|id| session.manager_label(id)).unwrap_or_default();
            let side = if player.locked { "from" } else { "to" };
            flags.push(format!("trade {side} {label}").magenta().to_string());
        }
        println!(
            "  {:<10} {:<24} prev {:>5} years {} keep-cost {:>5} {}",
            player.player_id,
            player.name,
            player.previous_cost.map_or_else(|| "-".to_string(), |c| format!("${c}")),
            player.years_kept,
            cost,
            flags.join(" ")
        );
    }
    Ok(())
}
