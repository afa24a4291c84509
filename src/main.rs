use anyhow::Result;
use moodcast_core::Config;
use moodcast_store::{App, Phase, EMPTY_STATE_MESSAGE};

#[tokio::main]
async fn main() -> Result<()> {
    moodcast_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let app = App::new(config)?;

    app.initialize().await?;
    let state = app.store().snapshot();

    println!("Moodcast - weather-driven news");
    match state.phase() {
        Phase::Ready => {
            if let Some(weather) = &state.weather {
                println!(
                    "\n{}, {}: {}{} {} (humidity {}%, wind {})",
                    weather.location_name,
                    weather.country_code,
                    weather.temperature,
                    weather.unit.symbol(),
                    weather.description,
                    weather.humidity,
                    weather.wind_speed
                );
                for day in &weather.forecast {
                    println!(
                        "  {}  {}{}  {}",
                        day.label,
                        day.temperature,
                        weather.unit.symbol(),
                        day.condition.description()
                    );
                }
            }
            if let Some(mood) = state.mood() {
                println!("\nMood: {}", mood.label());
            }
            if state.is_empty_result() {
                println!("\n{}", EMPTY_STATE_MESSAGE);
            }
            for article in &state.articles {
                println!("\n* {} ({})\n  {}", article.title, article.source_name, article.url);
            }
        }
        Phase::Error => {
            println!("\n{}", state.error.as_deref().unwrap_or("Something went wrong"));
        }
        Phase::Idle | Phase::Loading => {
            tracing::warn!("Pipeline ended in {:?} phase", state.phase());
        }
    }

    app.shutdown();
    Ok(())
}
