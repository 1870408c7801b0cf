use chrono::{Local, NaiveDate};
use clap::Subcommand;
use pomo_core::{daily_summary, range_summary, Category, IntervalConfig};

#[derive(Subcommand)]
pub enum SummaryAction {
    /// Seconds per category for one day
    Today {
        /// Day to report (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Pomodoro and break minutes per day
    Range {
        /// Number of days ending today
        #[arg(long, default_value_t = 7)]
        days: usize,
    },
}

pub fn run(action: SummaryAction, config: &IntervalConfig) -> Result<(), Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();
    match action {
        SummaryAction::Today { date } => {
            let day = date.unwrap_or(today);
            let summary = daily_summary(day, config)?;
            let mut totals = serde_json::Map::new();
            for (category, total) in Category::ALL.iter().zip(summary) {
                totals.insert(category.to_string(), total.num_seconds().into());
            }
            let json = serde_json::json!({
                "date": day.to_string(),
                "seconds": totals,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        SummaryAction::Range { days } => {
            let series = range_summary(today, days, config)?;
            println!("{}", serde_json::to_string_pretty(&series)?);
        }
    }
    Ok(())
}
