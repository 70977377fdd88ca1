//! hours - Command-line interface for the planetary hours engine
//!
//! Commands:
//! - day: All 24 planetary hours of a civil day
//! - now: The planetary hour in effect at an instant
//! - positions: Sign and dignity of the seven planets at an instant
//! - profile: Manage the saved location and natal data

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use planetary_hours::encoder::ReportEncoder;
use planetary_hours::types::{
    parse_date, parse_instant, utc_offset, DayReport, EnrichedHour, Location, NatalChart,
    PlanetPosition,
};
use planetary_hours::{HourEngine, HoursError, Profile, HOURS_VERSION};

/// Planetary hours for any day and place
#[derive(Parser)]
#[command(name = "hours")]
#[command(version = HOURS_VERSION)]
#[command(about = "Compute planetary hours, zodiac placements and dignities", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print all 24 planetary hours of a day
    Day {
        /// Civil date (YYYY-MM-DD), defaults to today at the location
        #[arg(long)]
        date: Option<String>,

        #[command(flatten)]
        place: PlaceArgs,

        /// Override the day ruler (e.g. "Venus")
        #[arg(long)]
        ruler: Option<String>,

        /// Evaluation instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Output format
        #[arg(long, default_value = "table")]
        output_format: OutputFormat,
    },

    /// Print the planetary hour in effect
    Now {
        #[command(flatten)]
        place: PlaceArgs,

        /// Evaluation instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Output format
        #[arg(long, default_value = "table")]
        output_format: OutputFormat,
    },

    /// Print sign and dignity of the seven planets
    Positions {
        /// Instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Offset used to display the default instant
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        offset_minutes: i32,

        /// Output format
        #[arg(long, default_value = "table")]
        output_format: OutputFormat,
    },

    /// Manage the saved profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Args)]
struct PlaceArgs {
    /// Profile file with a saved location and natal data
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Latitude in decimal degrees (north positive)
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees (east positive)
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Civil time offset from UTC in minutes
    #[arg(long, allow_negative_numbers = true)]
    offset_minutes: Option<i32>,

    /// Place name for display
    #[arg(long)]
    name: Option<String>,

    /// Birth date (YYYY-MM-DD) for natal resonance
    #[arg(long, requires = "natal_time")]
    natal_date: Option<String>,

    /// Birth time (HH:MM or HH:MM:SS)
    #[arg(long, requires = "natal_date")]
    natal_time: Option<String>,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Save a location
    SetLocation {
        #[arg(long)]
        profile: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        offset_minutes: i32,

        #[arg(long, default_value = "")]
        name: String,
    },

    /// Save natal data
    SetNatal {
        #[arg(long)]
        profile: PathBuf,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Birth time (HH:MM or HH:MM:SS)
        #[arg(long)]
        time: String,

        /// Civil offset at birth, if different from the saved location's
        #[arg(long, allow_negative_numbers = true)]
        offset_minutes: Option<i32>,
    },

    /// Print the profile
    Show {
        #[arg(long)]
        profile: PathBuf,
    },

    /// Remove the saved location and natal data
    Clear {
        #[arg(long)]
        profile: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    Table,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), HoursCliError> {
    match cli.command {
        Commands::Day {
            date,
            place,
            ruler,
            at,
            output_format,
        } => cmd_day(date.as_deref(), &place, ruler.as_deref(), at.as_deref(), output_format),
        Commands::Now {
            place,
            at,
            output_format,
        } => cmd_now(&place, at.as_deref(), output_format),
        Commands::Positions {
            at,
            offset_minutes,
            output_format,
        } => cmd_positions(at.as_deref(), offset_minutes, output_format),
        Commands::Profile { action } => cmd_profile(action),
    }
}

fn cmd_day(
    date: Option<&str>,
    place: &PlaceArgs,
    ruler: Option<&str>,
    at: Option<&str>,
    format: OutputFormat,
) -> Result<(), HoursCliError> {
    let resolved = resolve_place(place)?;
    let at = evaluation_instant(at, &resolved.location)?;
    let date = match date {
        Some(raw) => parse_date(raw)?,
        None => at.date_naive(),
    };

    let engine = HourEngine::with_config(resolved.profile.engine.clone());
    let natal = resolved.natal.as_ref();
    let report = match ruler {
        Some(name) => engine.compute_day_named(date, &resolved.location, name, natal, &at)?,
        None => engine.compute_day(date, &resolved.location, natal, &at)?,
    };

    match format {
        OutputFormat::Table => print!("{}", render_day(&report)),
        OutputFormat::Json => println!("{}", ReportEncoder::new().encode_to_json(&report)?),
        OutputFormat::JsonPretty => {
            println!("{}", ReportEncoder::pretty().encode_to_json(&report)?)
        }
    }
    Ok(())
}

fn cmd_now(place: &PlaceArgs, at: Option<&str>, format: OutputFormat) -> Result<(), HoursCliError> {
    let resolved = resolve_place(place)?;
    let at = evaluation_instant(at, &resolved.location)?;

    let engine = HourEngine::with_config(resolved.profile.engine.clone());
    let report = engine.compute_current(&resolved.location, resolved.natal.as_ref(), &at)?;
    let hour = report.active_hour().ok_or(HoursCliError::NoActiveHour)?;

    match format {
        OutputFormat::Table => {
            println!("{}", render_hour_header());
            println!("{}", render_hour(hour, true));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(hour)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(hour)?),
    }
    Ok(())
}

fn cmd_positions(
    at: Option<&str>,
    offset_minutes: i32,
    format: OutputFormat,
) -> Result<(), HoursCliError> {
    let at = match at {
        Some(raw) => parse_instant(raw)?,
        None => Utc::now().with_timezone(&utc_offset(offset_minutes)?),
    };
    let positions = HourEngine::new().positions(&at)?;

    match format {
        OutputFormat::Table => print!("{}", render_positions(&at, &positions)),
        OutputFormat::Json => println!("{}", serde_json::to_string(&positions)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&positions)?),
    }
    Ok(())
}

fn cmd_profile(action: ProfileAction) -> Result<(), HoursCliError> {
    match action {
        ProfileAction::SetLocation {
            profile: path,
            lat,
            lon,
            offset_minutes,
            name,
        } => {
            let mut profile = load_profile_or_default(&path)?;
            profile.set_location(Location::new(name, lat, lon, offset_minutes)?)?;
            save_profile(&path, &profile)?;
            log::info!("saved location to {}", path.display());
        }
        ProfileAction::SetNatal {
            profile: path,
            date,
            time,
            offset_minutes,
        } => {
            let mut profile = load_profile_or_default(&path)?;
            let mut natal = NatalChart::new(date, time);
            natal.utc_offset_minutes = offset_minutes;
            profile.set_natal(natal)?;
            save_profile(&path, &profile)?;
            log::info!("saved natal data to {}", path.display());
        }
        ProfileAction::Show { profile: path } => {
            let profile = load_profile(&path)?;
            println!("{}", profile.to_json()?);
        }
        ProfileAction::Clear { profile: path } => {
            let mut profile = load_profile_or_default(&path)?;
            profile.clear();
            save_profile(&path, &profile)?;
        }
    }
    Ok(())
}

/// Location, natal data and settings after merging flags over the profile
struct ResolvedPlace {
    profile: Profile,
    location: Location,
    natal: Option<NatalChart>,
}

fn resolve_place(args: &PlaceArgs) -> Result<ResolvedPlace, HoursCliError> {
    let profile = match &args.profile {
        Some(path) => load_profile(path)?,
        None => Profile::default(),
    };

    let location = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            let saved_offset = profile.location.as_ref().map(|l| l.utc_offset_minutes);
            let offset = args.offset_minutes.or(saved_offset).unwrap_or(0);
            let name = args.name.clone().unwrap_or_default();
            let mut location = Location::new(name, lat, lon, offset)?;
            location.name = planetary_hours::profile::sanitize_place_name(&location.name);
            location
        }
        (None, None) => {
            let mut location = profile
                .location
                .clone()
                .ok_or(HoursCliError::NotConfigured)?;
            if let Some(offset) = args.offset_minutes {
                location.utc_offset_minutes = offset;
                location.validate()?;
            }
            location
        }
        _ => return Err(HoursCliError::IncompleteLocation),
    };

    let natal = match (&args.natal_date, &args.natal_time) {
        (Some(date), Some(time)) => Some(NatalChart::new(date.clone(), time.clone())),
        _ => profile.natal.clone(),
    };

    Ok(ResolvedPlace {
        profile,
        location,
        natal,
    })
}

fn evaluation_instant(
    at: Option<&str>,
    location: &Location,
) -> Result<DateTime<FixedOffset>, HoursCliError> {
    let offset = location.offset()?;
    let at = match at {
        Some(raw) => parse_instant(raw)?,
        None => Utc::now().with_timezone(&offset),
    };
    Ok(at.with_timezone(&offset))
}

fn load_profile(path: &Path) -> Result<Profile, HoursCliError> {
    let content = fs::read_to_string(path)?;
    Ok(Profile::from_json(&content)?)
}

fn load_profile_or_default(path: &Path) -> Result<Profile, HoursCliError> {
    if path.exists() {
        load_profile(path)
    } else {
        Ok(Profile::default())
    }
}

fn save_profile(path: &Path, profile: &Profile) -> Result<(), HoursCliError> {
    fs::write(path, profile.to_json()? + "\n")?;
    Ok(())
}

// Table rendering

fn render_day(report: &DayReport) -> String {
    let mut out = String::new();
    let place = if report.location.name.is_empty() {
        format!(
            "{:.4}, {:.4}",
            report.location.coordinates.latitude, report.location.coordinates.longitude
        )
    } else {
        report.location.name.clone()
    };
    out.push_str(&format!(
        "{} {} - day of {} {}\n",
        weekday_name(report.date),
        report.date,
        report.day_ruler.symbol(),
        report.day_ruler
    ));
    out.push_str(&format!(
        "{place}  sunrise {}  sunset {}\n\n",
        report.sun_times.sunrise.format("%H:%M"),
        report.sun_times.sunset.format("%H:%M")
    ));
    out.push_str(&render_hour_header());
    out.push('\n');
    for hour in &report.hours {
        let active = report.active_index == Some(hour.index);
        out.push_str(&render_hour(hour, active));
        out.push('\n');
    }
    out
}

fn render_hour_header() -> String {
    format!(
        "  {:>2}  {:<5} {:<5}  {:<10} {:<13} {:<10} {:<14} {}",
        "#", "start", "end", "ruler", "sign", "dignity", "strength", "natal"
    )
}

fn render_hour(hour: &EnrichedHour, active: bool) -> String {
    let marker = if active { ">" } else { " " };
    let phase = if hour.is_day { "☀" } else { "☾" };
    format!(
        "{marker} {:>2}{phase} {:<5} {:<5}  {} {:<8} {} {:<11} {:<10} {} {:<12} {}",
        hour.index + 1,
        hour.start.format("%H:%M"),
        hour.end.format("%H:%M"),
        hour.planet_symbol,
        hour.planet.name(),
        hour.sign_symbol,
        hour.sign.name(),
        hour.dignity.as_str(),
        hour.strength.score,
        hour.strength.tier.as_str(),
        if hour.natal_resonant { "yes" } else { "" }
    )
}

fn render_positions(at: &DateTime<FixedOffset>, positions: &[PlanetPosition]) -> String {
    let mut out = format!("Positions at {}\n\n", at.to_rfc3339());
    for position in positions {
        out.push_str(&format!(
            "  {} {:<8} {:>7.2}°  {} {:<11} {:>5.2}°  {}\n",
            position.planet.symbol(),
            position.planet.name(),
            position.longitude,
            position.sign.symbol(),
            position.sign.name(),
            position.degree_in_sign,
            position.dignity.as_str()
        ));
    }
    out
}

fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

// Errors

#[derive(Debug)]
enum HoursCliError {
    Io(io::Error),
    Engine(HoursError),
    Json(serde_json::Error),
    NotConfigured,
    IncompleteLocation,
    NoActiveHour,
}

impl From<io::Error> for HoursCliError {
    fn from(e: io::Error) -> Self {
        HoursCliError::Io(e)
    }
}

impl From<HoursError> for HoursCliError {
    fn from(e: HoursError) -> Self {
        HoursCliError::Engine(e)
    }
}

impl From<serde_json::Error> for HoursCliError {
    fn from(e: serde_json::Error) -> Self {
        HoursCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HoursCliError> for CliError {
    fn from(e: HoursCliError) -> Self {
        match e {
            HoursCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HoursCliError::Engine(e) => {
                let (code, hint) = match &e {
                    HoursError::InvalidCoordinates { .. } => (
                        "INVALID_COORDINATES",
                        "Latitude must be within -90..90 and longitude within -180..180",
                    ),
                    HoursError::InvalidUtcOffset(_) => {
                        ("INVALID_OFFSET", "Offsets are minutes east of UTC, at most 1080")
                    }
                    HoursError::NoSunEvent(_) => (
                        "NO_SUN_EVENT",
                        "The sun does not rise or set here on this date",
                    ),
                    HoursError::InvalidRuler(_) => (
                        "INVALID_RULER",
                        "Use one of Saturn, Jupiter, Mars, Sun, Venus, Mercury, Moon",
                    ),
                    HoursError::InvalidNatalData(_) => (
                        "INVALID_NATAL_DATA",
                        "Birth date is YYYY-MM-DD (1900-2100), time is HH:MM",
                    ),
                    HoursError::InvalidLongitude(_) => {
                        ("INVALID_LONGITUDE", "Check the ephemeris input")
                    }
                    HoursError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                    HoursError::DateParseError(_) => (
                        "DATE_PARSE_ERROR",
                        "Dates are YYYY-MM-DD, instants are RFC 3339",
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            HoursCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HoursCliError::NotConfigured => CliError {
                code: "NOT_CONFIGURED".to_string(),
                message: "No location configured".to_string(),
                hint: Some(
                    "Pass --lat and --lon, or run 'hours profile set-location' and use --profile"
                        .to_string(),
                ),
            },
            HoursCliError::IncompleteLocation => CliError {
                code: "INCOMPLETE_LOCATION".to_string(),
                message: "--lat and --lon must be given together".to_string(),
                hint: None,
            },
            HoursCliError::NoActiveHour => CliError {
                code: "NO_ACTIVE_HOUR".to_string(),
                message: "No planetary hour contains the evaluation instant".to_string(),
                hint: Some("Pass --at within the day".to_string()),
            },
        }
    }
}
