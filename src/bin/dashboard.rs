// dashboard - Runs the dashboard's read flows for one address from the terminal

use std::env;
use tracing_subscriber::EnvFilter;

use event_attendance::{
    app_state::AppState,
    config::Config,
    core::Address,
    framework::AggregationSession,
};

fn usage() {
    eprintln!("Usage: dashboard <command> <address> [search]");
    eprintln!("Commands:");
    eprintln!("  hosted      - Events in the address's registry");
    eprintln!("  discover    - All announced events, optionally filtered by [search]");
    eprintln!("  attendances - Attendance records owned by the address");
    eprintln!("  attended    - Attended events with participants, for adding friends");
    eprintln!("  refs        - Capability and registry ids used to create events");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage();
        return Ok(());
    }

    let owner = Address::parse(&args[2])?;
    let config = Config::from_env()?;
    let state = AppState::new(config)?;
    let session = state.session(owner)?;

    match args[1].as_str() {
        "hosted" => print_json(&session.hosted_events().await?)?,
        "discover" => {
            let listings = session.discover_events().await?;
            let term = args.get(3).map(String::as_str).unwrap_or("");
            print_json(&AggregationSession::filter_events(&listings, term))?;
        }
        "attendances" => print_json(&session.my_attendances().await?)?,
        "attended" => print_json(&session.my_attended_events().await?)?,
        "refs" => print_json(&session.host_references().await?)?,
        other => {
            eprintln!("Unknown command: {}", other);
            usage();
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
