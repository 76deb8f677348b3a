use crate::cli::{print_rule, truncate, ContentArgs, OutputFormat};
use anyhow::{Context, Result};
use polymath_core::{AppContext, GeneratedContent};

pub async fn run(args: ContentArgs, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let items = ctx
        .store
        .list_generated_content(args.limit)
        .await
        .context("Failed to list generated content")?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        print_content_table(&items);
    }
    Ok(())
}

fn print_content_table(items: &[GeneratedContent]) {
    if items.is_empty() {
        println!("(no content)");
        return;
    }
    println!(
        "{:<40}  {:<6}  {:<16}  {:<3}  {:<36}  {}",
        "ID", "TYPE", "CREATED", "EMB", "TITLE", "EXPERTS"
    );
    print_rule(130);
    for c in items {
        let experts = match &c.secondary_expert_name {
            Some(second) => format!("{} / {}", c.primary_expert_name, second),
            None => c.primary_expert_name.clone(),
        };
        println!(
            "{:<40}  {:<6}  {:<16}  {:<3}  {:<36}  {}",
            c.id.as_deref().unwrap_or("-"),
            c.content_type.to_string(),
            c.created_at.format("%Y-%m-%d %H:%M").to_string(),
            if c.vector_embedding.is_some() { "yes" } else { "no" },
            truncate(&c.title_or_topic, 36),
            truncate(&experts, 30)
        );
    }
}
