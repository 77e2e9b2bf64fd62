mod render;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chairspace_search::{
    parse_date, AreaType, CalendarGrid, ChronoCalendar, Duration, SearchConfig, SearchCriteria,
    SearchForm, SearchRequest, TimeOfDay, WeekNumbering,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chairspace",
    version,
    about = "Render month grids and build Chairspace search requests"
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the week grid covering a month
    Month {
        #[arg(long)]
        year: i32,
        /// Month, 1-12
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
        /// Number of week rows (defaults to the configured grid size)
        #[arg(long)]
        weeks: Option<usize>,
        /// Use ISO 8601 week numbers
        #[arg(long)]
        iso: bool,
        /// Emit JSON instead of a text grid
        #[arg(long)]
        json: bool,
    },
    /// Print the week number of a date
    WeekNumber {
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Use ISO 8601 week numbers
        #[arg(long)]
        iso: bool,
    },
    /// Validate search criteria and print the search request
    Query(QueryArgs),
}

#[derive(clap::Args)]
struct QueryArgs {
    /// desk, room, floor, building, other or any
    #[arg(long, default_value = "desk")]
    area_type: AreaType,
    #[arg(long, default_value_t = 1)]
    capacity: u32,
    /// Search date (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "00:00")]
    start: TimeOfDay,
    #[arg(long, default_value = "23:59")]
    end: TimeOfDay,
    #[arg(long)]
    hours: Option<u32>,
    #[arg(long)]
    minutes: Option<u32>,
    /// Super-area id
    #[arg(long)]
    location: Option<String>,
    /// Required feature; repeat for several
    #[arg(long = "feature")]
    features: Vec<String>,
    #[arg(long, default_value_t = 0)]
    page: u32,
    /// Anchor for "today" when no date is given
    #[arg(long, value_parser = parse_date_arg)]
    today: Option<NaiveDate>,
    /// Emit the parameters as JSON instead of a URL
    #[arg(long)]
    json: bool,
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SearchConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SearchConfig::default(),
    };

    match cli.command {
        Commands::Month {
            year,
            month,
            weeks,
            iso,
            json,
        } => run_month(&config, year, month - 1, weeks, iso, json),
        Commands::WeekNumber { date, iso } => {
            let grid = numbering_grid(&config, iso);
            println!("{}", grid.week_number(date));
            Ok(())
        }
        Commands::Query(args) => run_query(&config, args),
    }
}

fn numbering_grid(config: &SearchConfig, iso: bool) -> CalendarGrid<ChronoCalendar> {
    let grid = config.grid(ChronoCalendar);
    if iso {
        grid.with_numbering(WeekNumbering::Iso)
    } else {
        grid
    }
}

fn run_month(
    config: &SearchConfig,
    year: i32,
    month: u32,
    weeks: Option<usize>,
    iso: bool,
    json: bool,
) -> Result<()> {
    let grid = numbering_grid(config, iso);
    let count = weeks.unwrap_or(config.weeks_per_grid);
    let weeks = grid
        .weeks_of_month(year, month, count)
        .with_context(|| format!("cannot build grid for {year}-{:02}", month + 1))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&weeks)?);
    } else {
        print!("{}", render::month_grid(year, month, &weeks));
    }
    Ok(())
}

fn run_query(config: &SearchConfig, args: QueryArgs) -> Result<()> {
    let criteria = SearchCriteria {
        area_type: args.area_type,
        capacity: args.capacity,
        date: args.date,
        time_start: Some(args.start),
        time_end: Some(args.end),
        duration: Duration {
            hours: args.hours,
            minutes: args.minutes,
        },
        location: args.location,
        features: args.features.into_iter().collect(),
    };
    let mut form = SearchForm::with_criteria(criteria, ChronoCalendar);

    if !form.validate() {
        eprintln!("{}", render::error_messages(form.error_messages()));
        bail!("invalid search criteria");
    }

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    debug!(%today, "building search request");
    let params = form.create_query_params(today)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&params)?);
        return Ok(());
    }

    let url = SearchRequest::new(params)
        .with_page(args.page)
        .with_items_per_page(config.items_per_page)
        .to_url(config)?;
    println!("{url}");
    Ok(())
}
