//! Bioequivalence Study Synopsis Designer
//!
//! Interactive terminal front-end: asks for the study parameters, searches
//! PubMed, estimates variability, sizes the trial and writes the synopsis.

use anyhow::{Context, Result};
use chrono::Local;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use be_synopsis::agent::build_provider;
use be_synopsis::config::SynopsisConfig;
use be_synopsis::evidence::{ParameterExtractor, PubMedSource};
use be_synopsis::synopsis::{StudyRequest, SynopsisTemplate};
use be_synopsis::utils::preview;
use be_synopsis::{PipelineError, SynopsisPipeline};

// ──────────────────────────────────────────────────────────────────────────────
// INPUT HELPERS
// ──────────────────────────────────────────────────────────────────────────────

/// Print `label`, read one line; blank input yields `default`.
fn ask(label: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        print!("{}: ", label);
    } else {
        print!("{} [{}]: ", label, default);
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    Ok(if input.is_empty() { default.to_string() } else { input.to_string() })
}

/// Ask until the answer parses.
fn ask_parsed<T>(label: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    loop {
        match ask(label, default)?.parse::<T>() {
            Ok(value) => return Ok(value),
            Err(e) => println!("   ⚠️  {}", e),
        }
    }
}

fn ask_yes_no(label: &str, default: bool) -> Result<bool> {
    let answer = ask(label, if default { "y" } else { "n" })?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

fn read_request(inn: String) -> Result<StudyRequest> {
    let mut request = StudyRequest::new(inn);
    request.dosage_form = ask("Dosage form", &request.dosage_form)?;
    request.dosage_strength = ask("Dosage strength", &request.dosage_strength)?;
    request.intake_mode = ask_parsed("Intake conditions (fasting / fed / both)", "fasting")?;
    request.design_preference = ask_parsed("Preferred design (auto / 2x2 / rsabe)", "auto")?;
    request.rsabe_opt_in = ask_yes_no("Allow RSABE when CV > 30%?", false)?;

    loop {
        let percent: f64 = ask_parsed("Expected dropout, %", "20")?;
        if (0.0..=40.0).contains(&percent) {
            request.sample_size.dropout = percent / 100.0;
            break;
        }
        println!("   ⚠️  Dropout must be between 0 and 40%");
    }
    Ok(request)
}

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("be_synopsis=info")),
        )
        .with_target(false)
        .init();

    println!("\n{}", "═".repeat(60));
    println!("💊 Bioequivalence Study Synopsis Designer v0.1.0");
    println!("{}", "═".repeat(60));
    println!("PubMed | PK extraction | Sample size | Design | Synopsis");
    println!("{}\n", "═".repeat(60));

    let config = SynopsisConfig::from_env();

    // One provider for the whole process, shared by reference
    let provider = build_provider(&config.llm);
    if provider.is_none() {
        println!("🤖 Model disabled: literature defaults will be used");
    }
    let extractor = ParameterExtractor::new(provider, config.llm.model.clone());
    let literature = Arc::new(PubMedSource::new(config.pubmed.clone()));

    let template = if config.template_path.exists() {
        SynopsisTemplate::load(&config.template_path).await?
    } else {
        warn!(
            "Template {} not found, using the built-in synopsis template",
            config.template_path.display()
        );
        SynopsisTemplate::builtin()
    };
    println!("📄 Template placeholders: {}", template.placeholders().len());

    let pipeline = SynopsisPipeline::new(literature, extractor, template)
        .with_organisations(config.organisations.clone());

    println!("\n💡 Enter an INN to design a study, or 'quit' to exit.\n");

    loop {
        let inn = ask("🔎 INN (e.g. Ibuprofen)", "")?;
        if inn.is_empty() {
            continue;
        }
        if matches!(inn.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("\n👋 Goodbye!\n");
            break;
        }

        let mut request = read_request(inn)?;

        println!("\n🔍 Searching PubMed and extracting parameters...\n");
        let evidence = pipeline.gather(&request.inn).await;
        if evidence.abstracts.is_empty() {
            println!("⚠️  No abstracts found. Literature defaults will be used.");
        } else {
            println!("📚 Abstracts: {} characters", evidence.abstracts.len());
            println!("   {}", preview(&evidence.abstracts, 200));
        }
        println!(
            "🤖 Parameters ({:?}): CVintra = {:?}, T½ = {:?} h",
            evidence.extracted.source,
            evidence.extracted.params.cv_intra,
            evidence.extracted.params.t_half
        );

        let generated_at = Local::now().naive_local();
        let draft = loop {
            match pipeline.draft(&request, &evidence, generated_at) {
                Ok(draft) => break Some(draft),
                Err(PipelineError::MissingParameter { name }) => {
                    println!("⚠️  {} not found, manual entry required.", name);
                    if name == "CVintra" {
                        request.cv_override = Some(ask_parsed("CVintra (e.g. 0.25)", "0.25")?);
                    } else {
                        request.t_half_override = Some(ask_parsed("Half-life T½, hours", "4.0")?);
                    }
                }
                Err(e) => {
                    println!("❌ Error: {}\n", e);
                    break None;
                }
            }
        };
        let Some(draft) = draft else {
            continue;
        };

        let path = config.output_dir.join(draft.file_name(&generated_at));
        tokio::fs::write(&path, &draft.document)
            .await
            .with_context(|| format!("Failed to write synopsis to {}", path.display()))?;
        info!("Synopsis written to {}", path.display());

        println!("\n✅ Synopsis generated: {}", path.display());
        println!(
            "   N = {}, N_total = {}, design = {}, washout = {} days, duration = {} days",
            draft.sample_size.per_sequence_count,
            draft.sample_size.total_count,
            draft.decision.design,
            draft.decision.washout_days,
            draft.decision.study_duration_days
        );
        println!("{}", "─".repeat(50));
        for line in draft.document.lines().filter(|l| !l.trim().is_empty()).take(5) {
            println!("{}", line);
        }
        println!("{}\n", "─".repeat(50));
    }

    Ok(())
}
