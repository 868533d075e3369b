use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Start times arrive as RFC 3339 or as a zone-less `datetime-local` value,
/// which is taken as UTC. Blank means unscheduled.
pub fn parse_start_time(value: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| format!("Invalid startTime: {}", raw))
}

/// Due dates are calendar days; a full timestamp keeps only its date part
pub fn parse_due_date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| format!("Invalid dueDate: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn start_time_accepts_rfc3339_and_local_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_start_time(Some("2024-05-01T09:30:00Z")).unwrap(), Some(expected));
        assert_eq!(parse_start_time(Some("2024-05-01T11:30:00+02:00")).unwrap(), Some(expected));
        assert_eq!(parse_start_time(Some("2024-05-01T09:30")).unwrap(), Some(expected));
        assert_eq!(parse_start_time(Some("2024-05-01 09:30:00")).unwrap(), Some(expected));
    }

    #[test]
    fn blank_start_time_is_unscheduled() {
        assert_eq!(parse_start_time(None).unwrap(), None);
        assert_eq!(parse_start_time(Some("  ")).unwrap(), None);
        assert!(parse_start_time(Some("next tuesday")).is_err());
    }

    #[test]
    fn due_date_parsing() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(parse_due_date(Some("2024-06-01")).unwrap(), day);
        assert_eq!(parse_due_date(Some("2024-06-01T10:00:00Z")).unwrap(), day);
        assert_eq!(parse_due_date(Some("")).unwrap(), None);
        assert!(parse_due_date(Some("01/06/2024")).is_err());
    }
}
