//! Terminal preview of the availability calendar for one space.
//!
//! Usage: `availability-preview <space_id> [coworking|common] [day|week|month] [YYYY-MM-DD]`
//!
//! Reads `AVAILABILITY_CONFIG` (YAML) when set; `COWORKING_API_URL` overrides
//! the API base URL.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use coworking_frontend::components::{render_calendar, CalendarView, DayView};
use coworking_frontend::services::date_utils::{Clock, SystemClock};
use coworking_frontend::services::logging::init_logging;
use coworking_frontend::{
    ApiClient, AvailabilityConfig, AvailabilityController, AvailabilityFetcher, ControllerOptions,
    InMemoryAvailabilityCache, Phase,
};
use shared::{ResourceType, ViewMode};
use tracing::info;

const CONFIG_PATH_ENV: &str = "AVAILABILITY_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let space_id: i64 = args
        .first()
        .context("usage: availability-preview <space_id> [coworking|common] [day|week|month] [YYYY-MM-DD]")?
        .parse()
        .context("space_id must be an integer")?;
    let resource_type = args
        .get(1)
        .map(|raw| ResourceType::from_space_type(raw))
        .unwrap_or(ResourceType::Coworking);
    let view_mode: ViewMode = match args.get(2) {
        Some(raw) => raw.parse()?,
        None => ViewMode::Day,
    };

    let config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => AvailabilityConfig::load(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => AvailabilityConfig::default(),
    }
    .with_env_overrides();
    info!("Using availability API at {}", config.api.base_url);

    let fetcher = AvailabilityFetcher::new(
        Arc::new(ApiClient::from_config(&config.api)),
        Arc::new(InMemoryAvailabilityCache::new()),
        &config,
    );
    let mut options = ControllerOptions::new(space_id, resource_type).view_mode(view_mode);
    if let Some(date) = args.get(3) {
        options = options.initial_date(date.as_str());
    }
    let controller = AvailabilityController::new(fetcher, options);

    let mut updates = controller.subscribe();
    controller.mount();
    let wait = config.api.request_timeout() + Duration::from_secs(1);
    let state = tokio::time::timeout(
        wait,
        updates.wait_for(|state| matches!(state.phase, Phase::Ready | Phase::Failed)),
    )
    .await
    .context("timed out waiting for availability")??
    .clone();

    print_view(&render_calendar(&state, &config, SystemClock.today()));
    Ok(())
}

fn print_view(view: &CalendarView) {
    match view {
        CalendarView::Skeleton(grid) => println!("(cargando {}x{})", grid.rows, grid.columns),
        CalendarView::Failed { message, .. } => println!("{}", message),
        CalendarView::Day(day) => {
            println!("{}", day.heading());
            match day {
                DayView::Coworking { cards, .. } => {
                    for card in cards {
                        println!("{}: {}", card.title, card.classification.label);
                        for row in &card.slots {
                            println!("  {}", row.text());
                        }
                    }
                }
                DayView::Common { rows, .. } => {
                    for row in rows {
                        println!("{}", row.text());
                    }
                }
                DayView::Empty { message, .. } => println!("{}", message),
            }
        }
        CalendarView::Week(cells) => {
            for cell in cells {
                println!("{} {:>2}  {}", cell.weekday, cell.day_number, cell.classification.label);
            }
        }
        CalendarView::Month(grid) => {
            println!("{}", grid.title);
            println!("{}", grid.weekday_headers.join("  "));
            for row in &grid.rows {
                let line: Vec<String> = row
                    .iter()
                    .map(|cell| {
                        let marker = if cell.is_deemphasized() {
                            '.'
                        } else {
                            cell.classification.color_token.chars().next().unwrap_or(' ')
                        };
                        format!("{:>2}{}", cell.day_number, marker)
                    })
                    .collect();
                println!("{}", line.join("  "));
            }
        }
    }
}
