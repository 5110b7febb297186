use anyhow::{bail, Result};
use dotenv::dotenv;
use tracing::info;

use earnings_dashboard::service::clock::Clock;
use earnings_dashboard::service::command::dashboard;
use earnings_dashboard::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env();
    let clock = Clock::system(settings.tz);

    info!(
        "Rendering dashboard from {} (tz {})",
        settings.data_path.display(),
        settings.tz
    );

    match dashboard::handle(&settings, &clock).await {
        Ok(content) => {
            println!("{content}");
            Ok(())
        }
        Err(err) => {
            eprintln!("❌ {}", err);
            bail!("dashboard unavailable")
        }
    }
}
