use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod advisory;
mod config;
mod error;
mod matcher;
mod models;
mod narrative;
mod signal;
mod signature;
mod store;

use config::AppConfig;
use models::InsightRecord;
use narrative::{NarrativeRequester, OllamaClient};
use store::LogStore;

#[derive(Parser)]
#[command(name = "burnout-insight")]
#[command(about = "Chrono-signature burnout insight system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full behavioral and biometric analysis for a birth date
    Analyze {
        #[arg(long)]
        dob: String,
    },
    /// Show the behavioral signature profile without biometrics
    Profile {
        #[arg(long)]
        dob: String,
    },
    /// Capture a single simulated signal reading
    Signal,
    /// Check narrative backend integration status
    Status,
    /// Show recent insight history
    History {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::resolve().context("failed to resolve configuration")?;

    match cli.command {
        Commands::Analyze { dob } => {
            let birth_date = signature::parse_birth_date(&dob)?;
            let sig = signature::derive(birth_date);
            let reading = signal::capture();

            let signal_store = LogStore::new(config.data_dir.join("signal_log.json"));
            if let Err(e) = signal_store.append(&reading) {
                tracing::warn!("failed to append signal log: {e}");
            }

            let requester = NarrativeRequester::new(config.narrative.clone())
                .context("narrative generation is unavailable")?;
            let outcome = requester.request(&sig.pattern_tags, &reading).await;
            let alignment = matcher::evaluate(&reading, &sig.pattern_tags);
            let insight = advisory::compose(&alignment, &outcome.text);

            println!("Chrono-signature profile ({})", sig.name);
            println!(
                "Tags: {}",
                sig.pattern_tags
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            for line in &sig.rationale {
                println!("- {line}");
            }
            println!();
            println!("{}", signal::summarize(&reading));
            println!();

            if !config.narrative.enabled {
                println!("Running in simulation mode (narrative backend disabled).");
            } else if let Some(detail) = &outcome.degraded {
                println!("Narrative backend degraded: {detail}. Using local fallback.");
            }

            println!("Summary: {}", insight.summary);
            println!("Recommendation: {}", insight.recommendation);
            println!();
            println!("Signal source: {}", reading.signal_id);
            println!("Model reference: {}", outcome.model_label);

            let record = InsightRecord {
                timestamp: chrono::Utc::now(),
                pattern_tags: sig.pattern_tags.iter().cloned().collect(),
                signal: reading,
                prompt_used: outcome.prompt.clone(),
                narrative: outcome.text.clone(),
                narrative_source: outcome.source,
                model_label: outcome.model_label.clone(),
                summary: insight.summary.clone(),
                recommendation: insight.recommendation.clone(),
            };
            let insight_store = LogStore::new(config.data_dir.join("insight_log.json"));
            if let Err(e) = insight_store.append(&record) {
                tracing::warn!("failed to append insight log: {e}");
            }
        }
        Commands::Profile { dob } => {
            let birth_date = signature::parse_birth_date(&dob)?;
            let sig = signature::derive(birth_date);

            println!("Behavioral signature profile: {}", sig.name);
            println!();
            if let Some(narrative) = signature::narrative_for(&sig) {
                println!("{narrative}");
                println!();
            }
            println!(
                "Pattern tags: {}",
                sig.pattern_tags
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!();
            println!("Rationale:");
            for line in &sig.rationale {
                println!("- {line}");
            }

            let timing = signature::timing_profile(&sig);
            println!();
            println!("Burn risk timing (descriptive cycle markers, not dynamically calculated):");
            println!("- Current risk level: {}", timing.current_risk);
            println!("- Next high-risk month: {}", timing.next_high_risk_month);
            println!(
                "- Recovery months: {}",
                timing
                    .recovery_months
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            println!();
            println!("Recovery strategies:");
            for (category, advice) in signature::recovery_recommendations(&sig) {
                println!("- {category}: {advice}");
            }
        }
        Commands::Signal => {
            let reading = signal::capture();
            let store = LogStore::new(config.data_dir.join("signal_log.json"));
            if let Err(e) = store.append(&reading) {
                tracing::warn!("failed to append signal log: {e}");
            }
            println!("{}", signal::summarize(&reading));
            println!("Signal ID: {}", reading.signal_id);
        }
        Commands::Status => {
            println!(
                "Narrative integration enabled: {}",
                config.narrative.enabled
            );
            println!("Configured model: {}", config.narrative.model);

            let client = OllamaClient::new(
                config.narrative.base_url.clone(),
                config.narrative.timeout,
            );
            let health = client.health(&config.narrative.model).await;
            match health.status {
                models::HealthStatus::Healthy => {
                    println!("Backend status: healthy");
                    if health.model_available {
                        println!("Model {} is available.", config.narrative.model);
                    } else {
                        println!(
                            "Model {} not found. Available: {}",
                            config.narrative.model,
                            health.available_models.join(", ")
                        );
                    }
                }
                models::HealthStatus::Unreachable => {
                    println!(
                        "Backend unreachable: {}",
                        health.error.unwrap_or_else(|| "unknown error".to_string())
                    );
                    println!("Analysis runs will use the local fallback generator.");
                }
            }
        }
        Commands::History { limit } => {
            let store = LogStore::new(config.data_dir.join("insight_log.json"));
            let records = store.read_all();

            if records.is_empty() {
                println!("No previous insights recorded.");
                return Ok(());
            }

            let recent: Vec<InsightRecord> = records
                .into_iter()
                .rev()
                .filter_map(|value| match serde_json::from_value(value) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!("skipping unreadable insight record: {e}");
                        None
                    }
                })
                .take(limit)
                .collect();

            for record in recent {
                println!("{}", record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
                println!("  Summary: {}", record.summary);
                println!("  Recommendation: {}", record.recommendation);
                println!("  Source: {} ({})", record.narrative_source, record.model_label);
                println!();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::NarrativeConfig;

    #[tokio::test]
    async fn analysis_pipeline_completes_with_backend_disabled() {
        let date = crate::signature::parse_birth_date("1990-05-15").unwrap();
        let sig = crate::signature::derive(date);
        let reading = crate::signal::capture();

        let requester = crate::narrative::NarrativeRequester::new(NarrativeConfig {
            enabled: false,
            base_url: "http://localhost:11434".to_string(),
            model: "gemma2:7b".to_string(),
            timeout: Duration::from_secs(5),
            template_path: PathBuf::from("prompts/base_prompt.txt"),
        })
        .unwrap();

        let outcome = requester.request(&sig.pattern_tags, &reading).await;
        assert_eq!(
            outcome.source,
            crate::models::NarrativeSource::Fallback
        );
        assert!(!outcome.text.is_empty());

        let alignment = crate::matcher::evaluate(&reading, &sig.pattern_tags);
        let insight = crate::advisory::compose(&alignment, &outcome.text);
        assert!(!insight.summary.is_empty());
        assert_eq!(insight.recommendation, outcome.text);
    }
}
