use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;

use tripplanner::config::PlannerConfig;
use tripplanner::logging::init_tracing;
use tripplanner::{
    CurrencyService, DestinationRef, Itinerary, PlacesProviderKind, PlacesService, TripPlanner,
    TripRequest, WeatherService, format_currency,
};

/// Weather-aware, budget-conscious trip itinerary planner
#[derive(Parser)]
#[command(name = "tripplanner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging for the planner
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a day-by-day itinerary
    Plan {
        /// Destination to search for, e.g. "Lisbon"
        #[arg(short, long, required_unless_present = "place_id")]
        destination: Option<String>,

        /// Place id from a previous `search`
        #[arg(long, conflicts_with = "destination")]
        place_id: Option<String>,

        /// First day of the trip (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,

        /// Number of days
        #[arg(long, default_value_t = 3)]
        days: u32,

        /// Currency for all prices; the configured default when omitted
        #[arg(long)]
        currency: Option<String>,

        /// Advisory budget in the trip currency
        #[arg(short, long)]
        budget: Option<f64>,

        /// Places backend (nominatim or google)
        #[arg(short, long)]
        provider: Option<PlacesProviderKind>,

        /// Print the itinerary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the exchange rate between two currencies
    Rate {
        #[arg(long, default_value = "USD")]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Show the daily forecast for a coordinate
    Forecast {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// Search for a destination
    Search {
        query: String,

        /// Places backend (nominatim or google)
        #[arg(short, long)]
        provider: Option<PlacesProviderKind>,
    },

    /// List supported currency codes
    Currencies,
}

fn print_itinerary(itinerary: &Itinerary) {
    let money = |amount: f64| format_currency(amount, &itinerary.currency);

    println!(
        "{} ({}), {} to {}",
        itinerary.destination.name,
        itinerary.destination.formatted_address,
        itinerary.start_date,
        itinerary.end_date
    );
    for day in &itinerary.day_plans {
        println!(
            "\nDay {} - {} - {}, {}",
            day.day,
            day.date.format("%a %d %b"),
            day.weather.description,
            day.weather.format_temperature()
        );
        for activity in &day.activities {
            println!(
                "  • {} [{}] {:.1}h {}",
                activity.name,
                activity.category,
                activity.duration,
                money(activity.cost_estimate)
            );
        }
        println!("  Day total: {}", money(day.total_cost));
    }

    println!("\nTotal: {}", money(itinerary.total_cost));
    if let Some(budget) = itinerary.budget {
        let status = if itinerary.over_budget { "over budget" } else { "within budget" };
        println!("Budget: {} ({status})", money(budget));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = PlannerConfig::load_from_path(cli.config.clone())?;
    init_tracing(&config.logging, cli.verbose);
    debug!("Loaded configuration");

    match cli.command {
        Commands::Plan {
            destination,
            place_id,
            start,
            days,
            currency,
            budget,
            provider,
            json,
        } => {
            let destination = match (place_id, destination) {
                (Some(id), _) => DestinationRef::PlaceId(id),
                (None, Some(query)) => DestinationRef::Query(query),
                (None, None) => anyhow::bail!("Either --destination or --place-id is required"),
            };
            let request = TripRequest {
                destination,
                start_date: start,
                days,
                currency,
                budget,
                provider,
            };

            let planner = TripPlanner::from_config(&config)?;
            let itinerary = planner
                .plan(&request)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&itinerary).context("Failed to serialize itinerary")?
                );
            } else {
                print_itinerary(&itinerary);
            }
        },

        Commands::Rate { from, to } => {
            let service = CurrencyService::new(&config.currency)?;
            let rate = service.get_exchange_rate(&from, &to).await;
            println!("1 {} = {} {} ({})", rate.from, rate.rate, rate.to, rate.symbol);
        },

        Commands::Forecast { lat, lng, days } => {
            let service = WeatherService::new(&config.weather)?;
            let today = chrono::Local::now().date_naive();
            for (offset, day) in (0_i64..).zip(service.forecast(lat, lng, days).await) {
                println!(
                    "{}  {:<14} {:>5}  humidity {}%  wind {} km/h",
                    today + chrono::Duration::days(offset),
                    day.description,
                    day.format_temperature(),
                    day.humidity,
                    day.wind_speed
                );
            }
        },

        Commands::Search { query, provider } => {
            let service = PlacesService::new(&config.places)?;
            let suggestions = service.search_places(&query, provider).await;
            if suggestions.is_empty() {
                println!("No places found for '{query}'");
            }
            for suggestion in suggestions {
                println!("{}  {}", suggestion.place_id, suggestion.description);
            }
        },

        Commands::Currencies => {
            let service = CurrencyService::new(&config.currency)?;
            let currencies = service.supported_currencies().await;
            println!("{}", currencies.join(", "));
        },
    }

    Ok(())
}
