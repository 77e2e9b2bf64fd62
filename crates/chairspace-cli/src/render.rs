//! Plain-text rendering for terminal output.

use chairspace_search::{month_name, CalendarWeek, ErrorMessages};
use chrono::Datelike;

/// A month grid with a week-number column. Spill-over days are shown in
/// parentheses.
pub fn month_grid(year: i32, month: u32, weeks: &[CalendarWeek]) -> String {
    let title = month_name(month as usize).unwrap_or("?");
    let mut out = format!("{title} {year}\n");
    out.push_str(" Wk   Mon  Tue  Wed  Thu  Fri  Sat  Sun\n");

    for week in weeks {
        out.push_str(&format!("{:>3} ", week.week_number));
        for day in week.days {
            let cell = if day.month0() == month && day.year() == year {
                format!("{:>4} ", day.day())
            } else {
                format!("{:>4} ", format!("({})", day.day()))
            };
            out.push_str(&cell);
        }
        // Drop the trailing cell separator.
        out.pop();
        out.push('\n');
    }
    out
}

/// One `field: message` line per validation message.
pub fn error_messages(errors: &ErrorMessages) -> String {
    errors
        .iter()
        .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field}: {m}")))
        .collect::<Vec<_>>()
        .join("\n")
}
