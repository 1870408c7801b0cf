use pomo_core::{get_interval, IntervalConfig};

pub fn run(config: &IntervalConfig) -> Result<(), Box<dyn std::error::Error>> {
    let next = get_interval(config)?;
    let json = serde_json::json!({
        "category": next.category(),
        "planned_secs": next.planned_duration().num_seconds(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
