//! Command-line interface for pialarm.
//!
//! This binary provides a CLI for controlling and monitoring the alarm
//! daemon via the HTTP API.

use std::env;

use anyhow::Result;

use pialarm::api_client;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: pialarm-cli <command>");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  status     Show session state");
        eprintln!("  alarms     List configured alarms");
        eprintln!("  snooze     Snooze the active alarm");
        eprintln!("  dismiss    Dismiss the active alarm");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  PIALARM_API_URL    API base URL (default: http://127.0.0.1:5000)");
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "status" => cmd_status().await?,
        "alarms" => cmd_alarms().await?,
        "snooze" => {
            make_client().snooze().await?;
            println!("Snooze queued");
        }
        "dismiss" => {
            make_client().dismiss().await?;
            println!("Dismiss queued");
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build an API client, honoring PIALARM_API_URL if set.
fn make_client() -> api_client::Client {
    match env::var("PIALARM_API_URL") {
        Ok(url) => api_client::Client::with_base_url(url),
        Err(_) => api_client::Client::new(),
    }
}

/// Print the current session state.
async fn cmd_status() -> Result<()> {
    let client = make_client();
    let status = client.get_status().await?;

    println!("Time:   {}", status.now);
    println!("State:  {}", status.state);
    if let Some(id) = status.active_alarm_id {
        println!("Alarm:  {}", id);
    }
    if let Some(until) = &status.snooze_until {
        println!("Snoozed until: {}", until);
    }
    if let Some(started) = &status.ring_started_at {
        println!("Ringing since: {}", started);
    }

    Ok(())
}

/// Print the configured alarms.
async fn cmd_alarms() -> Result<()> {
    let client = make_client();
    let alarms = client.list_alarms().await?;

    if alarms.is_empty() {
        println!("No alarms configured");
        return Ok(());
    }

    for alarm in alarms {
        let marker = if alarm.enabled { " " } else { "x" };
        let days = alarm.days_of_week.join(",");
        println!(
            "[{marker}] {:>3}  {}  {:<12} {}",
            alarm.id, alarm.time_display, days, alarm.label
        );
    }

    Ok(())
}
