use crate::cli::print_rule;
use anyhow::Result;
use polymath_core::{Collection, Config, Store, SurrealStore};
use std::path::Path;

#[derive(Debug)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
    fix_hint: Option<String>,
}

impl CheckResult {
    fn ok(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
            detail: detail.into(),
            fix_hint: None,
        }
    }
}

pub async fn run(env_file: Option<&Path>) -> Result<()> {
    println!();
    println!("Polymath Configuration Check");
    print_rule(50);

    let mut results = Vec::new();

    // Check 1: configuration resolves
    let config = match Config::load(env_file) {
        Ok(config) => {
            results.push(CheckResult::ok("Configuration", "all required settings present"));
            Some(config)
        }
        Err(e) => {
            results.push(CheckResult {
                name: "Configuration".into(),
                status: CheckStatus::Error,
                detail: e.to_string(),
                fix_hint: Some("Set the variable in .env or the environment".into()),
            });
            None
        }
    };

    if let Some(config) = &config {
        print_settings(config);

        // Check 2: database reachable
        match SurrealStore::connect(&config.surreal).await {
            Ok(store) => {
                results.push(CheckResult::ok("SurrealDB connection", config.surreal.endpoint.url()));
                results.push(check_seed_data(&store).await);
                store.close();
            }
            Err(e) => results.push(CheckResult {
                name: "SurrealDB connection".into(),
                status: CheckStatus::Error,
                detail: e.to_string(),
                fix_hint: Some("Check SURREALDB_HOST, SURREALDB_PORT and the credentials".into()),
            }),
        }
    }

    // Print results
    let mut has_errors = false;
    for r in &results {
        let symbol = match r.status {
            CheckStatus::Ok => "[✓]",
            CheckStatus::Warning => "[⚠]",
            CheckStatus::Error => {
                has_errors = true;
                "[✗]"
            }
        };
        println!("{} {}: {}", symbol, r.name, r.detail);
        if let Some(hint) = &r.fix_hint {
            println!("    → {}", hint);
        }
    }

    print_rule(50);

    if has_errors {
        std::process::exit(1);
    }

    Ok(())
}

fn print_settings(config: &Config) {
    let google = &config.google;
    let surreal = &config.surreal;
    println!("LLM model:        {}", google.llm_model);
    println!(
        "Embedding model:  {} ({} dimensions)",
        google.embedding_model, google.embedding_dimensions
    );
    println!("API base:         {}", google.api_base);
    println!("API key:          <redacted, {} chars>", google.api_key.chars().count());
    println!("SurrealDB:        {}", surreal.endpoint.url());
    println!(
        "Namespace/DB:     {}/{}",
        surreal.scope.namespace, surreal.scope.database
    );
    println!("User:             {}", surreal.credentials.username);
    print_rule(50);
}

async fn check_seed_data(store: &SurrealStore) -> CheckResult {
    let mut counts = Vec::new();
    for collection in Collection::ALL {
        match store.count(collection).await {
            Ok(n) => counts.push((collection, n)),
            Err(e) => {
                return CheckResult {
                    name: "Collections".into(),
                    status: CheckStatus::Error,
                    detail: e.to_string(),
                    fix_hint: None,
                }
            }
        }
    }

    let detail = counts
        .iter()
        .map(|(c, n)| format!("{} {}", n, c))
        .collect::<Vec<_>>()
        .join(", ");
    let unseeded = counts
        .iter()
        .any(|(c, n)| *c != Collection::GeneratedContent && *n == 0);

    if unseeded {
        CheckResult {
            name: "Seed data".into(),
            status: CheckStatus::Warning,
            detail,
            fix_hint: Some("Run `polymath seed` to load fields and experts".into()),
        }
    } else {
        CheckResult::ok("Seed data", detail)
    }
}
