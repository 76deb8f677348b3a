use crate::cli::{print_rule, truncate, ExpertsArgs, OutputFormat};
use anyhow::Result;
use polymath_core::{AppContext, Expert, FieldOfExpertise};

pub async fn fields(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let fields = ctx.store.list_fields_of_expertise().await;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
    } else {
        print_field_table(&fields);
    }
    Ok(())
}

pub async fn experts(args: ExpertsArgs, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let experts = ctx.store.list_experts_by_field(&args.field).await;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&experts)?);
    } else {
        print_expert_table(&experts);
    }
    Ok(())
}

fn print_field_table(fields: &[FieldOfExpertise]) {
    if fields.is_empty() {
        println!("(no fields)");
        return;
    }
    println!("{:<18}  {}", "FIELD", "SUBFIELDS");
    print_rule(80);
    for f in fields {
        println!("{:<18}  {}", f.name, truncate(&f.subfields.join(", "), 60));
    }
}

fn print_expert_table(experts: &[Expert]) {
    if experts.is_empty() {
        println!("(no experts)");
        return;
    }
    println!("{:<22}  {:<26}  {}", "NAME", "SUBFIELD", "ALSO INTERESTED IN");
    print_rule(100);
    for e in experts {
        let interests = e
            .also_interested_in
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<22}  {:<26}  {}",
            truncate(&e.name, 22),
            truncate(&e.expertise.subfield, 26),
            truncate(&interests, 48)
        );
    }
}
