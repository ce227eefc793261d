//! Negotiation preview - shows how an Accept-Language header resolves
//! against the configured languages
//!
//! Usage:
//!   cargo run --bin negotiate -- "ko-KR,ko;q=0.9,en;q=0.8"
//!   cargo run --bin negotiate -- --strict "en;q=0,ja"
//!
//! Reads LOCALE_LANGUAGES and LOCALE_DEFAULT_LANGUAGE like the server does.
//! `--strict` clamps quality values to [0, 1] and drops `q=0` entries.

use anyhow::{bail, Result};
use noprefix_locale::config::LocaleConfig;
use noprefix_locale::i18n::{
    negotiate, parse_accept_language_with, resolve, LanguageSignals, QualityPolicy,
};
use tracing::info;

fn main() -> Result<()> {
    // Load environment from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("noprefix_locale=info".parse()?),
        )
        .init();

    // Parse CLI arguments
    let args: Vec<String> = std::env::args().skip(1).collect();
    let strict = args.iter().any(|arg| arg == "--strict");
    let Some(header) = args.iter().find(|arg| !arg.starts_with("--")) else {
        bail!("Usage: negotiate [--strict] <accept-language header>");
    };

    let mut config = LocaleConfig::from_env()?;
    if strict {
        config = config.with_quality_policy(QualityPolicy::Strict);
    }
    info!(
        "Negotiating against {} languages ({:?} quality policy)",
        config.languages.len(),
        config.quality_policy
    );

    let candidates = parse_accept_language_with(header, config.quality_policy);

    println!();
    println!("Accept-Language: {}", header);
    println!();
    println!("--- Ranked candidates ---");
    if candidates.is_empty() {
        println!("  (none)");
    }
    for (rank, candidate) in candidates.iter().enumerate() {
        let status = if config.is_valid(&candidate.tag) {
            "supported"
        } else if candidate
            .base_tag()
            .is_some_and(|base| config.is_valid(base))
        {
            "supported via base tag"
        } else {
            "not supported"
        };
        println!(
            "  {:>2}. {:<12} q={:<6} {}",
            rank + 1,
            candidate.tag,
            candidate.quality,
            status
        );
    }
    println!();

    match negotiate(&candidates, &config.languages) {
        Some(code) => println!(
            "Negotiated: {} ({})",
            code,
            config.language_display_name(code).unwrap_or(code)
        ),
        None => println!("Negotiated: nothing"),
    }

    let resolution = resolve(
        &LanguageSignals {
            accept_language: Some(header),
            ..Default::default()
        },
        &config.languages,
        config.default_language(),
        config.quality_policy,
    );
    println!(
        "Resolved:   {} (from {})",
        resolution.code, resolution.source
    );
    println!();

    Ok(())
}
