//! Prompt templates for the three advisor calls.

use crate::models::LabPanel;

pub const INSIGHTS_SYSTEM_PROMPT: &str = r#"
You are an AI assistant specializing in providing health insights based on
medical data. You receive the analysis results of a liver CT scan and a blood
report. Identify potential health issues, suggest lifestyle improvements and
advise on when to consult a specialist (hepatologist, oncologist, etc.).

RULES:
1. Be concise and use plain language.
2. Clearly state that this is AI-assisted and not medical advice.
3. Output ONLY a JSON object wrapped in ```json``` fences.
"#;

pub const CHAT_SYSTEM_PROMPT: &str = r#"
You are a helpful and cautious AI health assistant chatting with a user about
their health. Provide general, helpful information based on the user's
question and their blood report, but you MUST NOT provide medical advice,
diagnoses, or prescribe remedies. ALWAYS include a disclaimer to consult a
healthcare professional for any medical advice or treatment. Use simple,
non-technical language. Be empathetic and supportive.
"#;

pub const EXPLANATION_SYSTEM_PROMPT: &str = r#"
You are an AI assistant explaining blood report results to a patient in
simple, non-technical language. Keep explanations to 1-3 sentences. Your goal
is to inform, not to diagnose.
"#;

/// Build the combined-insight prompt.
pub fn build_insights_prompt(scan_summary: &str, abnormal_tests: &str) -> String {
    format!(
        r#"CT Scan Analysis: {scan_summary}
Blood Report Analysis: {abnormal_tests}

Based on this information, provide a concise summary of potential health issues,
lifestyle improvements, and when to consult a specialist.

```json
{{
  "potential_issues": "Potential health issues based on the combined analysis",
  "lifestyle_advice": "Suggested lifestyle improvements (diet, exercise, etc.)",
  "specialist_guidance": "When to consult a specialist"
}}
```"#
    )
}

/// Build the chat prompt, embedding the panel when there is one.
pub fn build_chat_prompt(panel: Option<&LabPanel>, question: &str) -> String {
    let report = match panel {
        Some(panel) if !panel.is_empty() => panel
            .observations()
            .iter()
            .map(|o| {
                let unit = if o.unit.is_empty() {
                    String::new()
                } else {
                    format!(" {}", o.unit)
                };
                format!("- {}: {}{} (Status: {})", o.test, o.value, unit, o.status)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(_) => "The blood report contains no values.".to_string(),
        None => "No blood report provided.".to_string(),
    };

    format!(
        r#"User's blood report:
{report}

User's question: "{question}"

Based on this, answer the user's question. If they ask for remedies, suggest general
healthy lifestyle changes (like a balanced diet, regular exercise) and strongly advise
them to speak with a doctor before making any changes or trying new remedies."#
    )
}

/// Build the explanation prompt.
pub fn build_explanation_prompt(abnormal_values: &[String]) -> String {
    let values = if abnormal_values.is_empty() {
        "None".to_string()
    } else {
        abnormal_values.join(", ")
    };

    format!(
        r#"- If there are no abnormal values, be reassuring. Example: "All your liver function tests are within the normal range. This is a great sign that your liver is working well!"
- If there are abnormal values, briefly explain what it might suggest in simple terms. Always end by advising a consultation with a doctor. Example for high bilirubin: "Your bilirubin level is elevated. This can sometimes indicate liver stress or other issues. It's best to discuss this with your doctor to find out the cause."

Explain these abnormal values: {values}."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{build_panel, PanelForm};

    #[test]
    fn insights_prompt_embeds_both_analyses() {
        let prompt = build_insights_prompt(
            "CT scan shows: No tumor detected with 91.00% confidence.",
            "Abnormal values found: None.",
        );
        assert!(prompt.contains("CT Scan Analysis: CT scan shows: No tumor detected"));
        assert!(prompt.contains("Blood Report Analysis: Abnormal values found: None."));
        assert!(prompt.contains("\"specialist_guidance\""));
    }

    #[test]
    fn chat_prompt_lists_panel_rows() {
        let panel = build_panel(&PanelForm::new().with("ALT", "200").with("AGRatio", "1.5"));
        let prompt = build_chat_prompt(Some(&panel), "Is my ALT bad?");
        assert!(prompt.contains("- ALT: 200 U/L (Status: Abnormal)"));
        assert!(prompt.contains("- AGRatio: 1.5 (Status: Normal)"));
        assert!(prompt.contains("\"Is my ALT bad?\""));
    }

    #[test]
    fn chat_prompt_without_panel() {
        let prompt = build_chat_prompt(None, "hello");
        assert!(prompt.contains("No blood report provided."));
    }

    #[test]
    fn explanation_prompt_joins_values_or_says_none() {
        let prompt = build_explanation_prompt(&["ALT (Alanine Aminotransferase (SGPT))".into()]);
        assert!(prompt.ends_with("Explain these abnormal values: ALT (Alanine Aminotransferase (SGPT))."));
        assert!(build_explanation_prompt(&[]).ends_with("Explain these abnormal values: None."));
    }
}
