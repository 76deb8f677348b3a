use crate::cli::{load_config, print_rule, OutputFormat, SeedArgs};
use anyhow::{Context, Result};
use polymath_core::{seed, SeedData, SurrealStore};
use std::path::Path;

pub async fn run(args: SeedArgs, env_file: Option<&Path>, format: OutputFormat) -> Result<()> {
    let data = SeedData::load(&args.fields, &args.experts)
        .await
        .with_context(|| {
            format!(
                "Failed to read seed files {} and {}",
                args.fields.display(),
                args.experts.display()
            )
        })?;

    println!(
        "Parsed {} fields and {} experts",
        data.fields.len(),
        data.experts.len()
    );
    for name in data.dangling_experts() {
        eprintln!("  Warning: {} refers to a field that is not in the seed file", name);
    }

    if args.dry_run {
        println!("Dry run: no changes written.");
        for field in &data.fields {
            println!("  [field] {} ({} subfields)", field.name, field.subfields.len());
        }
        for expert in &data.experts {
            println!("  [expert] {} ({})", expert.name, expert.expertise);
        }
        return Ok(());
    }

    let config = load_config(env_file)?;
    let store = SurrealStore::connect(&config.surreal)
        .await
        .context("Failed to connect to SurrealDB")?;

    let outcome = seed(&store, &data).await;
    store.close();
    let report = outcome.context("Seeding failed")?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("Seed Summary");
    print_rule(50);
    println!("Fields:  {:>4} / {}", report.fields_inserted, report.fields_read);
    println!("Experts: {:>4} / {}", report.experts_inserted, report.experts_read);
    if !report.is_clean() {
        println!("Failures:");
        for failure in &report.failures {
            println!("  [{}] {}: {}", failure.collection, failure.name, failure.reason);
        }
    }
    print_rule(50);

    Ok(())
}
