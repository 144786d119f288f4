mod commands;
mod metrics;
mod render;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bdtheque_core::{
    load_config, load_config_from_env, validate_config, AdminCatalog, AdminMembers, AvailableBds,
    BdthequeClient, Config, CoordinatorConfig, CoordinatorUpdate, PagedSource, PublicCatalog,
    QueryCoordinator, SanitizedConfig, Session, UserProfile,
};

use commands::{parse_command, Command, HELP};
use metrics::{encode_metrics, COMMANDS_TOTAL};
use render::Row;

/// Default config file, overridden by `BDTHEQUE_CONFIG`.
const DEFAULT_CONFIG: &str = "bdtheque.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr; stdout is the screen.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = std::env::var("BDTHEQUE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG));

    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using defaults and environment", config_path);
        load_config_from_env().context("Failed to load config from environment")?
    };
    validate_config(&config).context("Configuration validation failed")?;
    info!("Backend: {}", config.api.base_url);

    let session = Session::new();
    if let Some(token) = config.api.token.clone().filter(|t| !t.trim().is_empty()) {
        session
            .login_success(token, configured_admin())
            .await
            .context("Invalid api.token")?;
    }

    let client = Arc::new(
        BdthequeClient::new(&config.api, Arc::new(session.clone()))
            .context("Failed to create API client")?,
    );

    let screen = std::env::args().nth(1).unwrap_or_else(|| "catalog".to_string());
    let ctx = AppContext {
        client: Arc::clone(&client),
        session,
        config: config.clone(),
    };

    match screen.as_str() {
        "catalog" => {
            let source = PublicCatalog::new(client);
            run_screen(source, config.catalog.coordinator(), &ctx).await
        }
        "bds" => {
            let source = AdminCatalog::new(client);
            run_screen(source, config.admin.bds(), &ctx).await
        }
        "members" => {
            let source = AdminMembers::new(client);
            run_screen(source, config.admin.members(), &ctx).await
        }
        "available" => {
            let source = AvailableBds::new(client);
            run_screen(source, config.admin.available(), &ctx).await
        }
        other => anyhow::bail!(
            "Unknown screen '{}' (expected catalog, bds, members or available)",
            other
        ),
    }
}

fn configured_admin() -> UserProfile {
    UserProfile {
        username: "config".to_string(),
        email: None,
        is_admin: true,
    }
}

/// Shared by every screen.
struct AppContext {
    client: Arc<BdthequeClient>,
    session: Session,
    config: Config,
}

/// Drive one list screen from stdin until EOF or `quit`.
async fn run_screen<S>(source: S, config: CoordinatorConfig, ctx: &AppContext) -> Result<()>
where
    S: PagedSource,
    S::Item: Row,
    S::Field: FromStr<Err = String>,
{
    let mut coordinator = QueryCoordinator::new(Arc::new(source), config);
    info!(
        "Screen '{}' (page size {})",
        coordinator.source_name(),
        coordinator.page_size()
    );
    coordinator.initial_load();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(update) = coordinator.next_update() => report(&coordinator, &update),
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    // Input closed: show what was still on its way, then leave.
                    for update in coordinator.settle().await {
                        report(&coordinator, &update);
                    }
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(command)) => {
                        COMMANDS_TOTAL.with_label_values(&[command.name()]).inc();
                        if !handle(command, &mut coordinator, ctx).await {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{}", e),
                }
            }
        }
    }
    Ok(())
}

/// Apply one command. Returns false to leave the screen.
async fn handle<S>(command: Command, coordinator: &mut QueryCoordinator<S>, ctx: &AppContext) -> bool
where
    S: PagedSource,
    S::Item: Row,
    S::Field: FromStr<Err = String>,
{
    match command {
        Command::Search(text) => coordinator.set_search_term(text),
        Command::Sort { field, order } => match field.parse::<S::Field>() {
            Ok(field) => coordinator.set_sort(field, order),
            Err(e) => println!("{}", e),
        },
        Command::Unsort => coordinator.clear_sort(),
        Command::More => {
            if !coordinator.request_next_page() {
                println!("Rien de plus à charger.");
            }
        }
        Command::Reload => coordinator.refresh(),
        Command::Show => {
            for item in coordinator.items() {
                println!("{}", item.row());
            }
            print_summary(coordinator);
        }
        Command::Status => {
            println!(
                "état: {:?}, recherche: {:?}{}, tri: {:?}",
                coordinator.state(),
                coordinator.identity().search_term,
                if coordinator.search_pending() {
                    " (en attente)"
                } else {
                    ""
                },
                coordinator.identity().sort
            );
            print_summary(coordinator);
            if let Some(e) = coordinator.error() {
                println!("erreur: {}", e.message);
            }
        }
        Command::Dismiss => coordinator.dismiss_error(),
        Command::Stats => match ctx.client.stats().await {
            Ok(stats) => println!(
                "{} BDs, {} membres, {} locations",
                stats.total_bds, stats.total_membres, stats.total_locations
            ),
            Err(e) => println!("Erreur: {}", e),
        },
        Command::Rentals(mid) => match ctx.client.member_rentals(mid).await {
            Ok(rentals) if rentals.is_empty() => println!("Aucune location en cours."),
            Ok(rentals) => rentals.iter().for_each(|r| println!("{}", r.row())),
            Err(e) => println!("Erreur: {}", e),
        },
        Command::History { mid, page } => {
            let page_size = ctx.config.admin.history_page_size;
            match ctx.client.member_rental_history(mid, page, page_size).await {
                Ok(history) => {
                    history.rentals.iter().for_each(|r| println!("{}", r.row()));
                    let pages = history.total.div_ceil(u64::from(page_size)).max(1);
                    println!("page {}/{} ({} locations)", page + 1, pages, history.total);
                }
                Err(e) => println!("Erreur: {}", e),
            }
        }
        Command::Rent { mid, bid } => match ctx.client.rent_book(mid, &bid).await {
            Ok(()) => {
                println!("BD {} louée au membre {}.", bid, mid);
                coordinator.refresh();
            }
            Err(e) => println!("Erreur: {}", e),
        },
        Command::Return(lid) => match ctx.client.return_book(lid).await {
            Ok(()) => {
                println!("Location {} clôturée.", lid);
                coordinator.refresh();
            }
            Err(e) => println!("Erreur: {}", e),
        },
        Command::Delete(bid) => match ctx.client.delete_bd(&bid).await {
            Ok(()) => {
                println!("BD {} supprimée.", bid);
                coordinator.refresh();
            }
            Err(e) => println!("Erreur: {}", e),
        },
        Command::Login(token) => {
            match ctx.session.login_success(token, configured_admin()).await {
                Ok(()) => println!("Session ouverte."),
                Err(e) => println!("Erreur: {}", e),
            }
        }
        Command::Logout => {
            ctx.session.logout().await;
            println!("Session fermée.");
        }
        Command::Metrics => print!("{}", encode_metrics()),
        Command::Config => {
            let sanitized = SanitizedConfig::from(&ctx.config);
            match serde_json::to_string_pretty(&sanitized) {
                Ok(json) => println!("{}", json),
                Err(e) => println!("Erreur: {}", e),
            }
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => return false,
    }
    true
}

fn report<S>(coordinator: &QueryCoordinator<S>, update: &CoordinatorUpdate)
where
    S: PagedSource,
    S::Item: Row,
{
    match update {
        CoordinatorUpdate::SearchFired { search_term } => {
            println!("Recherche: {:?}", search_term.trim());
        }
        CoordinatorUpdate::Applied { received, .. } => {
            let items = coordinator.items();
            let start = items.len().saturating_sub(*received);
            for item in &items[start..] {
                println!("{}", item.row());
            }
            print_summary(coordinator);
        }
        CoordinatorUpdate::Discarded { .. } => {}
        CoordinatorUpdate::Failed { append, message, .. } => {
            if *append {
                println!("Erreur de chargement (liste conservée): {}", message);
            } else {
                println!("Erreur de connexion: {}", message);
            }
        }
    }
}

fn print_summary<S: PagedSource>(coordinator: &QueryCoordinator<S>) {
    println!(
        "-- {} / {}{}",
        coordinator.items().len(),
        coordinator.total_count(),
        if coordinator.has_more() {
            " (more)"
        } else {
            ""
        }
    );
}
