use crate::cli::{print_rule, DebateArgs, EmbedArgs, EssayArgs, OutputFormat, TopicsArgs};
use anyhow::{Context, Result};
use polymath_core::{AppContext, ComposedContent, DebateRequest, EssayRequest};

pub async fn topics(args: TopicsArgs, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let (expert, topics) = ctx
        .composer()
        .suggest_topics(&args.field, args.expert.as_deref())
        .await
        .context("Could not get topic suggestions")?;

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({
                "field": args.field,
                "expert": expert.name,
                "topics": topics,
            })
        );
        return Ok(());
    }

    println!("Topics for {} ({})", expert.name, expert.expertise);
    print_rule(60);
    for (i, t) in topics.iter().enumerate() {
        println!("{}. {}", i + 1, t.topic);
        if let Some(description) = &t.brief_description {
            println!("   {}", description);
        }
    }
    Ok(())
}

pub async fn essay(args: EssayArgs, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let composed = ctx
        .composer()
        .compose_essay(EssayRequest {
            field: args.field,
            expert: args.expert,
            topic: args.topic,
            embed: args.embed,
        })
        .await
        .context("Essay generation failed")?;

    print_composed(&composed, format)
}

pub async fn debate(args: DebateArgs, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let composed = ctx
        .composer()
        .compose_debate(DebateRequest {
            field_1: args.field_1,
            field_2: args.field_2,
            expert_1: args.expert_1,
            expert_2: args.expert_2,
            title: args.title,
            embed: args.embed,
        })
        .await
        .context("Debate generation failed")?;

    print_composed(&composed, format)
}

pub async fn embed(args: EmbedArgs, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let dimension = ctx
        .composer()
        .embed_content(&args.id)
        .await
        .with_context(|| format!("Could not embed {}", args.id))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::json!({ "id": args.id, "dimension": dimension }));
    } else {
        println!("Attached {}-dimensional embedding to {}", dimension, args.id);
    }
    Ok(())
}

fn print_composed(composed: &ComposedContent, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&composed.content)?);
        return Ok(());
    }

    let content = &composed.content;
    let authors = match &content.secondary_expert_name {
        Some(second) => format!("{} vs {}", content.primary_expert_name, second),
        None => content.primary_expert_name.clone(),
    };
    println!("{}: {}", content.content_type, content.title_or_topic);
    println!("{}", authors);
    print_rule(80);
    println!("{}", content.content);
    print_rule(80);
    println!(
        "Saved as {}{}",
        composed.id,
        if composed.embedded { " (embedded)" } else { "" }
    );
    Ok(())
}
