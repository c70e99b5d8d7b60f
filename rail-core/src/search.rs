use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<NaiveDate>,
}

/// One bookable train run as shown in search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainOption {
    pub id: String,
    pub name: String,
    pub from: String,
    pub to: String,
    pub departure: NaiveTime,
    pub arrival: NaiveTime,
    pub date: NaiveDate,
    /// Per-seat fare in minor units
    pub unit_fare: i64,
    #[serde(default = "default_seat_class")]
    pub seat_class: String,
}

fn default_seat_class() -> String {
    "S Chair".to_string()
}

impl TrainOption {
    /// Travel time; arrivals earlier than departure are on the next day.
    pub fn duration(&self) -> Duration {
        let diff = self.arrival.signed_duration_since(self.departure);
        if diff < Duration::zero() {
            diff + Duration::days(1)
        } else {
            diff
        }
    }

    /// e.g. "7h 45m"
    pub fn duration_label(&self) -> String {
        let minutes = self.duration().num_minutes();
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }

    pub fn matches(&self, query: &SearchQuery) -> bool {
        let from_ok = query
            .from
            .as_deref()
            .map_or(true, |code| self.from.eq_ignore_ascii_case(code.trim()));
        let to_ok = query
            .to
            .as_deref()
            .map_or(true, |code| self.to.eq_ignore_ascii_case(code.trim()));
        let date_ok = query.date.map_or(true, |date| self.date == date);
        from_ok && to_ok && date_ok
    }
}

/// One day in the horizontal date picker on the results screen
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DateChip {
    pub day: String,
    pub week: String,
    pub date: NaiveDate,
}

const WEEK_DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub const DATE_STRIP_DAYS: usize = 14;

pub fn date_strip(start: NaiveDate, days: usize) -> Vec<DateChip> {
    start
        .iter_days()
        .take(days)
        .map(|date| DateChip {
            day: format!("{:02}", date.day()),
            week: WEEK_DAYS[date.weekday().num_days_from_sunday() as usize].to_string(),
            date,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train() -> TrainOption {
        TrainOption {
            id: "1".to_string(),
            name: "Sundarban Express".to_string(),
            from: "GAY".to_string(),
            to: "DEL".to_string(),
            departure: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            arrival: NaiveTime::from_hms_opt(3, 45, 0).unwrap(),
            date: NaiveDate::from_ymd_opt(2025, 9, 11).unwrap(),
            unit_fare: 62_500,
            seat_class: default_seat_class(),
        }
    }

    #[test]
    fn test_duration_wraps_midnight() {
        assert_eq!(train().duration_label(), "7h 45m");
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let query = SearchQuery {
            from: Some("gay".to_string()),
            to: Some(" del".to_string()),
            date: None,
        };
        assert!(train().matches(&query));

        let other_day = SearchQuery {
            date: NaiveDate::from_ymd_opt(2025, 9, 12),
            ..Default::default()
        };
        assert!(!train().matches(&other_day));
    }

    #[test]
    fn test_date_strip() {
        let start = NaiveDate::from_ymd_opt(2025, 9, 11).unwrap();
        let strip = date_strip(start, DATE_STRIP_DAYS);

        assert_eq!(strip.len(), 14);
        assert_eq!(strip[0].day, "11");
        assert_eq!(strip[0].week, "Thu");
        assert_eq!(strip[13].date, NaiveDate::from_ymd_opt(2025, 9, 24).unwrap());
    }
}
