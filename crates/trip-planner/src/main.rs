//! Asks for a destination and dates, lets the model plan the trip and saves
//! the result to `travel_plan.txt`.

#[macro_use]
extern crate tracing;

use std::time::Duration;

use anyhow::Context as _;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io;
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;
use trip_planner::config::OUTPUT_PATH;
use trip_planner::core::AgentEvent;
use trip_planner::prompt::read_trip_request;
use trip_planner::{Config, PlannerBuilder, plan_trip, save_itinerary};
use trip_planner_openai_model::OpenAIProvider;

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match dotenvy::dotenv() {
        Ok(path) => debug!("loaded {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => warn!("ignoring .env file: {err}"),
    }
    let config = Config::from_env().context("invalid configuration")?;

    println!(
        "{} {}",
        "🧭 Trip planner".bold(),
        format!("(model: {})", config.model.model()).dimmed()
    );

    let mut stdin = io::BufReader::new(io::stdin());
    let request = read_trip_request(&mut stdin, &mut io::stdout())
        .await
        .context("could not read the trip details")?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let planner = PlannerBuilder::with_model_provider(
        OpenAIProvider::new(config.model),
        config.weather,
    )
    .on_event(move |event| {
        event_tx.send(event).ok();
    })
    .build();

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::with_template("{spinner} {wide_msg}")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    progress_bar.set_message("🤔 Planning...");

    let plan = plan_trip(&planner, request);
    tokio::pin!(plan);
    let result = loop {
        select! {
            biased;
            Some(event) = event_rx.recv() => {
                progress_bar.suspend(|| print_event(event));
            }
            result = &mut plan => break result,
            _ = sleep(Duration::from_millis(100)) => progress_bar.tick(),
        }
    };
    progress_bar.finish_and_clear();
    while let Ok(event) = event_rx.try_recv() {
        print_event(event);
    }
    let itinerary = result.context("could not plan the trip")?;

    println!("\n{}\n", "✈️  Your travel plan".bold());
    println!("{}", itinerary.plan);

    save_itinerary(&itinerary, OUTPUT_PATH).await?;
    println!("\n{} Plan saved to {OUTPUT_PATH}", "✅".bright_green());
    Ok(())
}

fn print_event(event: AgentEvent) {
    match event {
        AgentEvent::ToolCall { name, input } => {
            println!(
                "{}🔧 {} {}",
                BAR_CHAR.bright_yellow(),
                name.bright_white().bold(),
                input.dimmed()
            );
        }
        AgentEvent::ToolOutput { output, .. } => {
            for line in output.lines() {
                println!("{}{}", BAR_CHAR.bright_yellow(), line.dimmed());
            }
        }
        AgentEvent::MessageDelta(_) => {}
    }
}
