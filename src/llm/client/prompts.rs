//! Fixed prompt for agenda structuring.

/// Instruction template; `{text}` is replaced verbatim with the document text.
pub const AGENDA_EXTRACTION_PROMPT: &str = r#"
Please analyze the following document text and extract key information into a structured JSON format.

Return an object with the following fields:

- meeting_title
- date
- location
- supervisors (list of names and districts)

- all_section_titles: a list of all agenda section titles in the document

- social_services_items: a list of detailed items specifically related to Social Services. These may appear in a section titled "Social Services" or be items that address social services topics such as welfare, benefits, homelessness, housing support, child services, etc.

Each item in social_services_items should strictly include:
  - item_number
  - title or summary
  - districts (if specified)
  - type (e.g. "Consent", "Public Hearing", "Presentation", etc.)
do not include anything else for an item.

Return only valid JSON. Do not include any explanatory text.

Document text:
{text}
"#;

/// Build the extraction prompt for a document.
pub fn build_extraction_prompt(text: &str) -> String {
    // Single substitution: `{text}` appearing inside the document is left alone.
    match AGENDA_EXTRACTION_PROMPT.split_once("{text}") {
        Some((head, tail)) => {
            let mut prompt = String::with_capacity(head.len() + text.len() + tail.len());
            prompt.push_str(head);
            prompt.push_str(text);
            prompt.push_str(tail);
            prompt
        }
        None => AGENDA_EXTRACTION_PROMPT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text_verbatim() {
        let text = "Board Meeting\nJan 5, 2024\n";
        let prompt = build_extraction_prompt(text);
        assert!(prompt.contains("Document text:\nBoard Meeting\nJan 5, 2024\n"));
        assert!(prompt.contains("social_services_items"));
        assert!(!prompt.contains("{text}"));
    }

    #[test]
    fn test_prompt_does_not_escape_or_reexpand() {
        let text = "Item {text} \"quoted\" \\ {braces}";
        let prompt = build_extraction_prompt(text);
        assert!(prompt.contains(text));
        assert_eq!(prompt.matches("{text}").count(), 1);
    }
}
