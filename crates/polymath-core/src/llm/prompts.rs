//! Prompt construction. Every function here is pure and deterministic.

use crate::types::{Expert, FieldOfExpertise};

/// Rendering used when an expert has no secondary interests.
pub const NO_OTHER_INTERESTS: &str = "None";

/// Flatten `also_interested_in` into `"field: subfield"` pairs.
pub fn render_interests(expert: &Expert) -> String {
    if expert.also_interested_in.is_empty() {
        return NO_OTHER_INTERESTS.to_string();
    }
    expert
        .also_interested_in
        .iter()
        .map(|interest| interest.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn essay_topics(field: &FieldOfExpertise, expert: &Expert) -> String {
    format!(
        r#"You are an academic advisor.
Propose 3 specific, original essay topics suitable for an undergraduate essay.
The essay belongs to the field of "{field}", seen through the subfield or perspective of "{subfield}".
The topics should match the interests and known views of an expert such as "{expert}".
Their other interests are: {interests}.

Respond ONLY with a valid JSON array of objects. Each object has these keys:
- "topic": the essay title.
- "brief_description": one sentence describing the angle of the essay.

Example:
```json
[
  {{ "topic": "Topic 1", "brief_description": "Description 1." }},
  {{ "topic": "Topic 2", "brief_description": "Description 2." }},
  {{ "topic": "Topic 3", "brief_description": "Description 3." }}
]
```"#,
        field = field.name,
        subfield = expert.expertise.subfield,
        expert = expert.name,
        interests = render_interests(expert),
    )
}

pub fn debate_topic(
    field_1: &FieldOfExpertise,
    expert_1: &Expert,
    field_2: &FieldOfExpertise,
    expert_2: &Expert,
) -> String {
    format!(
        r#"Propose one compelling, clearly debatable title for an academic debate between two experts.

Expert 1: {e1}
Primary field / subfield: {f1} / {s1}
Other interests: {i1}

Expert 2: {e2}
Primary field / subfield: {f2} / {s2}
Other interests: {i2}

The topic should set the likely perspectives of these two experts against each other. Phrase the title as a question or a provocative statement.

Respond ONLY with a valid JSON object with these keys:
- "title": the debate title.
- "perspective_1_summary": one sentence on the likely stance of {e1}.
- "perspective_2_summary": one sentence on the likely stance of {e2}.

Example:
```json
{{
  "title": "Is [concept from field 1] incompatible with [concept from field 2]?",
  "perspective_1_summary": "{e1} would likely argue that...",
  "perspective_2_summary": "{e2} would likely stress that..."
}}
```"#,
        e1 = expert_1.name,
        f1 = field_1.name,
        s1 = expert_1.expertise.subfield,
        i1 = render_interests(expert_1),
        e2 = expert_2.name,
        f2 = field_2.name,
        s2 = expert_2.expertise.subfield,
        i2 = render_interests(expert_2),
    )
}

pub fn essay(topic: &str, field: &FieldOfExpertise, expert: &Expert) -> String {
    format!(
        r#"Write an academic essay.
Adopt the style, tone and likely perspective of "{expert}", an expert in "{field}" who focuses on "{subfield}".
Their other interests are: {interests}.

Essay topic: "{topic}"

Write a coherent essay of roughly 500-700 words that addresses the topic from this perspective.
Keep the arguments consistent with the ideas and school of thought associated with {expert} and {subfield}.
Use an introduction, body paragraphs with supporting points, and a conclusion.

Do not add meta-commentary such as "Here is the essay:".
Output only the text of the essay."#,
        expert = expert.name,
        field = field.name,
        subfield = expert.expertise.subfield,
        interests = render_interests(expert),
        topic = topic,
    )
}

pub fn debate(
    title: &str,
    field_1: &FieldOfExpertise,
    expert_1: &Expert,
    field_2: &FieldOfExpertise,
    expert_2: &Expert,
) -> String {
    format!(
        r#"You are an academic moderator and writer.
Write the text of a structured debate titled: "{title}"

Perspective 1 is argued by "{e1}" from "{f1}" / "{s1}".
Perspective 2 is argued by "{e2}" from "{f2}" / "{s2}".

Structure the debate in five parts:
1. Introduction: present the topic "{title}" and both perspectives.
2. Arguments for perspective 1 ({e1}): 2-3 key arguments consistent with their field and subfield.
3. Arguments for perspective 2 ({e2}): 2-3 key arguments consistent with their field and subfield.
4. Rebuttals (optional): how each side might answer the other.
5. Conclusion: summarise the points of contention and close with a thought on the complexity of the issue.

Aim for roughly 600-800 words in an academic tone. Keep the two sides distinct and faithful to their fields.

Do not add meta-commentary such as "Here is the debate:".
Output only the text of the debate."#,
        title = title,
        e1 = expert_1.name,
        f1 = field_1.name,
        s1 = expert_1.expertise.subfield,
        e2 = expert_2.name,
        f2 = field_2.name,
        s2 = expert_2.expertise.subfield,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExpertiseRef;

    fn jung() -> (FieldOfExpertise, Expert) {
        (
            FieldOfExpertise::new("psychology", vec!["Psychoanalysis".into()]),
            Expert::new("Carl Jung", ExpertiseRef::new("psychology", "Psychoanalysis"))
                .with_interest(ExpertiseRef::new("philosophy", "Metaphysics"))
                .with_interest(ExpertiseRef::new("theology", "Comparative Religion")),
        )
    }

    fn deren() -> (FieldOfExpertise, Expert) {
        (
            FieldOfExpertise::new("cinematography", vec!["Framing and Composition".into()]),
            Expert::new(
                "Maya Deren",
                ExpertiseRef::new("cinematography", "Framing and Composition"),
            ),
        )
    }

    #[test]
    fn test_render_interests() {
        let (_, jung) = jung();
        assert_eq!(
            render_interests(&jung),
            "philosophy: Metaphysics, theology: Comparative Religion"
        );

        let (_, deren) = deren();
        assert_eq!(render_interests(&deren), NO_OTHER_INTERESTS);
    }

    #[test]
    fn test_essay_topics_prompt_embeds_records() {
        let (field, expert) = jung();
        let prompt = essay_topics(&field, &expert);

        assert!(prompt.contains("\"psychology\""));
        assert!(prompt.contains("\"Psychoanalysis\""));
        assert!(prompt.contains("\"Carl Jung\""));
        assert!(prompt.contains("philosophy: Metaphysics, theology: Comparative Religion"));
        assert!(prompt.contains("\"brief_description\""));
        assert!(prompt.contains("```json"));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let (f1, e1) = jung();
        let (f2, e2) = deren();

        assert_eq!(essay_topics(&f1, &e1), essay_topics(&f1, &e1));
        assert_eq!(debate_topic(&f1, &e1, &f2, &e2), debate_topic(&f1, &e1, &f2, &e2));
        assert_eq!(essay("T", &f1, &e1), essay("T", &f1, &e1));
        assert_eq!(debate("T", &f1, &e1, &f2, &e2), debate("T", &f1, &e1, &f2, &e2));
    }

    #[test]
    fn test_debate_topic_renders_empty_interests() {
        let (f1, e1) = jung();
        let (f2, e2) = deren();
        let prompt = debate_topic(&f1, &e1, &f2, &e2);

        assert!(prompt.contains("Expert 2: Maya Deren"));
        assert!(prompt.contains("Other interests: None"));
        assert!(prompt.contains("\"perspective_2_summary\""));
    }

    #[test]
    fn test_debate_prompt_has_five_parts() {
        let (f1, e1) = jung();
        let (f2, e2) = deren();
        let prompt = debate("Is the frame an archetype?", &f1, &e1, &f2, &e2);

        for part in ["1. Introduction", "2. Arguments", "3. Arguments", "4. Rebuttals", "5. Conclusion"] {
            assert!(prompt.contains(part), "missing {part}");
        }
        assert!(prompt.contains("600-800 words"));
    }

    #[test]
    fn test_essay_prompt() {
        let (field, expert) = jung();
        let prompt = essay("Archetypes in cinema", &field, &expert);

        assert!(prompt.contains("Essay topic: \"Archetypes in cinema\""));
        assert!(prompt.contains("500-700 words"));
        assert!(prompt.contains("Output only the text of the essay."));
    }
}
