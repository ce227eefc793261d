use anyhow::{bail, Result};
use noprefix_locale::checks::check_locale_config;
use noprefix_locale::{build_app, AppState, Config};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("noprefix_locale=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    // Load configuration from environment
    let config = Config::from_env()?;

    let issues = check_locale_config(&config.locale);
    for issue in &issues {
        if issue.is_error() {
            error!("{}", issue);
        } else {
            warn!("{}", issue);
        }
    }
    let errors = issues.iter().filter(|issue| issue.is_error()).count();
    if errors > 0 {
        bail!("Language configuration has {} error(s)", errors);
    }

    info!(
        "Supported languages: {} (default: {})",
        config.locale.languages.codes().collect::<Vec<_>>().join(", "),
        config.locale.default_language()
    );
    if !config.sessions_enabled {
        info!("Sessions disabled, persisting language in the cookie only");
    }

    let app = build_app(AppState::from_config(&config));

    let addr = config.bind_address();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
