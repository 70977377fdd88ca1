//! Print the planetary hours of 2024-06-21 in Athens as JSON

use chrono::{DateTime, NaiveDate};
use planetary_hours::{planetary_hours_json, Location, NatalChart};

fn main() {
    let location = match Location::new("Athens", 37.9838, 23.7275, 180) {
        Ok(location) => location,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };
    let natal = NatalChart::new("1990-05-05", "12:00");
    let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap_or_default();
    let at = match DateTime::parse_from_rfc3339("2024-06-21T12:00:00+03:00") {
        Ok(at) => at,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    match planetary_hours_json(date, &location, Some(&natal), &at) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
