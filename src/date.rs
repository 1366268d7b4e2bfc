use chrono::{Local, NaiveDate};

/// Header date, e.g. `Tuesday, March 4, 2025`.
pub fn format_date(date: NaiveDate) -> String {
    // chrono's %A and %B are English only, which is what the header wants.
    date.format("%A, %B %-d, %Y").to_string()
}

/// Header date for the current local day.
pub fn today() -> String {
    format_date(Local::now().date_naive())
}
