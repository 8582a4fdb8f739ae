// ATS analysis prompt. The wording shapes the model output the frontend
// renders, so changes here are user visible.

/// Renders the ATS analysis prompt for one resume / job description pair.
///
/// Both inputs are inserted verbatim in a single pass, so brace or
/// placeholder-looking text in either input is never re-expanded.
pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        r#"You are an ATS system for technical hiring. Analyze the resume and compare it to the job description.

**Resume Content:**
{resume_text}

**Job Description:**
{job_description}

Now, perform the following:
1. **List all matching keywords** (skills, technologies, tools).
2. **List missing keywords** that should be added.
3. **Calculate ATS Score (%)** based on keyword matching.
4. **Give improvement suggestions** in bullet points (-1, -2).
5. **Summarize the resume** in under 100 words.

Important rules:
- **Strict keyword matching** for accurate ATS score.
- **No unnecessary sentences**; only structured output.
- **Format output cleanly with new lines for readability.**
- **No extra special characters apart from (",", ".", "-").**"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Skilled in Go and distributed systems";
    const JD: &str = "Looking for a Go developer with distributed systems experience";

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_analysis_prompt(RESUME, JD), build_analysis_prompt(RESUME, JD));
    }

    #[test]
    fn test_prompt_embeds_inputs_under_headings() {
        let prompt = build_analysis_prompt(RESUME, JD);
        assert!(prompt.contains(&format!("**Resume Content:**\n{RESUME}\n")));
        assert!(prompt.contains(&format!("**Job Description:**\n{JD}\n")));
        assert!(prompt.find(RESUME).unwrap() < prompt.find(JD).unwrap());
    }

    #[test]
    fn test_prompt_lists_all_output_sections_and_rules() {
        let prompt = build_analysis_prompt(RESUME, JD);
        for section in [
            "1. **List all matching keywords**",
            "2. **List missing keywords**",
            "3. **Calculate ATS Score (%)**",
            "4. **Give improvement suggestions**",
            "5. **Summarize the resume** in under 100 words.",
        ] {
            assert!(prompt.contains(section), "missing section: {section}");
        }
        for rule in [
            "**Strict keyword matching**",
            "**No unnecessary sentences**",
            "**Format output cleanly with new lines for readability.**",
            r#"**No extra special characters apart from (",", ".", "-").**"#,
        ] {
            assert!(prompt.contains(rule), "missing rule: {rule}");
        }
    }

    #[test]
    fn test_placeholder_text_in_inputs_is_not_expanded() {
        let prompt = build_analysis_prompt("uses {job_description} literally", "{resume_text}");
        assert!(prompt.contains("uses {job_description} literally"));
        assert!(prompt.contains("**Job Description:**\n{resume_text}\n"));
    }

    #[test]
    fn test_distinct_inputs_give_distinct_prompts() {
        assert_ne!(
            build_analysis_prompt(RESUME, JD),
            build_analysis_prompt(RESUME, "Looking for a Rust developer")
        );
    }
}
