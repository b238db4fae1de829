use super::{RefineRequest, RefinementKind};
use crate::params::{EmailParameters, Length, OutputFormat};

/// System prompt shared by every direct-provider call.
pub const SYSTEM_PROMPT: &str =
    "You are an expert B2B sales copywriter. Follow the requested output \
     format exactly and reply with the email body only, no commentary.";

fn format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Markdown => "Markdown",
        OutputFormat::Html => "HTML",
        OutputFormat::Plain => "plain text",
    }
}

fn length_guidance(length: Length) -> &'static str {
    match length {
        Length::Short => "short (under 120 words)",
        Length::Medium => "medium (roughly 200 words)",
        Length::Long => "long (300 words or more)",
    }
}

/// Build the generation prompt from the full parameter set.
pub fn generate_prompt(params: &EmailParameters) -> String {
    format!(
        "Write a sales email in {format}.\n\
         \n\
         Sender: {sales_name}, {sales_title} (phone {sales_phone}, email {sales_email}).\n\
         Recipient: {cust_name}, {cust_title} at {cust_company} \
         (phone {cust_phone}, email {cust_email}).\n\
         \n\
         Context: {context}\n\
         \n\
         Tone: {tone}. Target length: {length}.\n\
         Include a subject line and sign off with the sender's contact details.",
        format = format_label(params.output_format),
        sales_name = params.sales_info.name,
        sales_title = params.sales_info.title,
        sales_phone = params.sales_info.contact.phone,
        sales_email = params.sales_info.contact.email,
        cust_name = params.customer_info.name,
        cust_title = params.customer_info.title,
        cust_company = params.customer_info.company,
        cust_phone = params.customer_info.contact.phone,
        cust_email = params.customer_info.contact.email,
        context = params.email_context,
        tone = params.tone,
        length = length_guidance(params.length),
    )
}

/// Build the refinement prompt for a named rewrite dimension.
pub fn refine_prompt(request: &RefineRequest<'_>) -> String {
    let instruction = match request.kind {
        RefinementKind::Professional => {
            "Rewrite this email to sound more professional while keeping its intent.".to_string()
        }
        RefinementKind::Shorter => {
            "Rewrite this email to be noticeably shorter without losing the key points."
                .to_string()
        }
        RefinementKind::Personalized => {
            "Rewrite this email to feel more personal to the recipient.".to_string()
        }
        RefinementKind::Improvement => format!(
            "Rewrite this email, applying these reviewer suggestions:\n{}",
            request.suggestions.unwrap_or_default()
        ),
    };

    format!(
        "{instruction}\n\
         Keep the {format} format. Reply with the rewritten email only.\n\
         \n\
         Email:\n{content}",
        format = format_label(request.output_format),
        content = request.content,
    )
}

/// Build the scoring prompt.
///
/// The model sees the exact expected field set and numeric ranges; its reply
/// is still independently re-validated rather than trusted.
pub fn score_prompt(content: &str, format: OutputFormat) -> String {
    format!(
        "Evaluate the following {format} sales email against five criteria.\n\
         \n\
         Reply with a single JSON object and nothing else, shaped exactly as:\n\
         {{\"scores\":{{\"subjectLine\":N,\"writingStyle\":N,\"content\":N,\
         \"structure\":N,\"personalization\":N}},\"suggestions\":\"...\"}}\n\
         \n\
         Every score must be a number between 0 and 10. \"suggestions\" must \
         be a non-empty string with concrete improvements.\n\
         \n\
         Email:\n{content}",
        format = format_label(format),
    )
}

/// Build the format-conversion prompt.
pub fn convert_prompt(content: &str, from: OutputFormat, to: OutputFormat) -> String {
    format!(
        "Convert the following email from {from} to {to}. Preserve the \
         wording and structure; change only the markup. Reply with the \
         converted email only.\n\
         \n\
         Email:\n{content}",
        from = format_label(from),
        to = format_label(to),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::EmailParameters;

    #[test]
    fn generate_prompt_carries_every_parameter() {
        let params = EmailParameters::sample();
        let prompt = generate_prompt(&params);
        assert!(prompt.contains("Alex Nguyen"));
        assert!(prompt.contains("Jordan Tran"));
        assert!(prompt.contains("ABC Corp"));
        assert!(prompt.contains("professional"));
        assert!(prompt.contains("roughly 200 words"));
        assert!(prompt.contains("Markdown"));
        assert!(prompt.contains("Fastwork"));
    }

    #[test]
    fn score_prompt_spells_out_schema_and_range() {
        let prompt = score_prompt("Hello", OutputFormat::Markdown);
        for field in crate::validate::SCORE_FIELDS {
            assert!(prompt.contains(field), "missing field {field}");
        }
        assert!(prompt.contains("between 0 and 10"));
        assert!(prompt.contains("suggestions"));
    }

    #[test]
    fn improvement_prompt_embeds_suggestions() {
        let request = RefineRequest {
            content: "Hi",
            kind: RefinementKind::Improvement,
            suggestions: Some("add a call to action"),
            model: "gemma",
            output_format: OutputFormat::Plain,
            temperature: 0.7,
        };
        let prompt = refine_prompt(&request);
        assert!(prompt.contains("add a call to action"));
        assert!(prompt.contains("plain text"));
    }

    #[test]
    fn shorter_prompt_names_the_dimension() {
        let request = RefineRequest {
            content: "Hi",
            kind: RefinementKind::Shorter,
            suggestions: None,
            model: "gemma",
            output_format: OutputFormat::Markdown,
            temperature: 0.7,
        };
        let prompt = refine_prompt(&request);
        assert!(prompt.contains("shorter"));
        assert!(prompt.contains("Hi"));
    }

    #[test]
    fn convert_prompt_names_both_formats() {
        let prompt = convert_prompt("<p>Hi</p>", OutputFormat::Html, OutputFormat::Markdown);
        assert!(prompt.contains("from HTML to Markdown"));
        assert!(prompt.contains("<p>Hi</p>"));
    }
}
