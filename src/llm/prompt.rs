//! Instruction and query messages for article generation

use std::path::Path;
use tracing::debug;

use super::ChatMessage;
use crate::error::Result;
use crate::metadata::VideoMetadata;

/// Headings the model must not use for sections
pub const FORBIDDEN_HEADINGS: &[&str] = &[
    "Introduction",
    "Overview",
    "Conclusion",
    "Summary",
    "Key Points",
    "Final Thoughts",
    "Background",
    "Discussion",
];

pub const MIN_SECTIONS: usize = 5;
pub const MIN_PARAGRAPHS_PER_SECTION: usize = 2;

/// Built-in system instruction fixing the response schema and writing rules
pub fn default_system_prompt() -> String {
    format!(
        r#"You are an expert podcast analyst and long-form writer. Find the podcast episode behind the given YouTube link and turn it into a detailed blog article.

Return ONLY a valid JSON object with this exact structure, no markdown, no explanation:
{{
  "title": "episode title",
  "podcast_name": "name of the podcast show",
  "creator": "host name",
  "duration_minutes": 45,
  "tags": ["tag1", "tag2"],
  "summary": {{
    "overview": "2-3 sentence overview",
    "sections": [
      {{ "heading": "Specific section title", "content": "Paragraph one.\n\nParagraph two." }}
    ],
    "quotes": ["Notable quote 1", "Notable quote 2"]
  }},
  "key_takeaways": ["Takeaway 1", "Takeaway 2"],
  "actionable_advice": ["Action 1", "Action 2"],
  "resources": ["Book, tool or link mentioned in the episode"]
}}

Rules:
1. Never use generic section headings such as: {forbidden}. Every heading must name the specific idea discussed.
2. Write at least {min_sections} sections, each with at least {min_paragraphs} paragraphs separated by a blank line.
3. Aim for 1500-2500 words across all sections.
4. Prefer direct quotes from the episode; never invent a quote. Leave "quotes" empty if none can be verified.
5. "duration_minutes" is a whole number; use 0 if unknown.
6. Use 3-6 short lowercase tags.
7. Use empty strings or empty arrays for anything that cannot be determined."#,
        forbidden = FORBIDDEN_HEADINGS.join(", "),
        min_sections = MIN_SECTIONS,
        min_paragraphs = MIN_PARAGRAPHS_PER_SECTION,
    )
}

/// User query embedding the link and any prefetched metadata
pub fn user_query(video_url: &str, metadata: &VideoMetadata) -> String {
    let mut query = format!("Analyze this podcast: {}", video_url.trim());

    let title = metadata.title.trim();
    if !title.is_empty() {
        query.push_str(&format!("\nVideo title: {}", title));
    }

    let author = metadata.author.trim();
    if !author.is_empty() {
        query.push_str(&format!("\nChannel: {}", author));
    }

    if !title.is_empty() || !author.is_empty() {
        query.push_str("\nUse the title and channel to locate the exact episode.");
    }

    query
}

/// Load a replacement system prompt from disk
pub async fn load_system_prompt(path: &Path) -> Result<String> {
    let content = tokio::fs::read_to_string(path).await?;
    debug!("Loaded system prompt from {}", path.display());
    Ok(content.trim().to_string())
}

/// The instruction+query message pair sent to the completion service
pub fn build_messages(system_prompt: &str, video_url: &str, metadata: &VideoMetadata) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_query(video_url, metadata)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_rules() {
        let prompt = default_system_prompt();
        for heading in FORBIDDEN_HEADINGS {
            assert!(prompt.contains(heading));
        }
        assert!(prompt.contains("\"podcast_name\""));
        assert!(prompt.contains("at least 5 sections"));
        assert!(prompt.contains("never invent a quote"));
    }

    #[test]
    fn test_user_query_with_metadata() {
        let metadata = VideoMetadata {
            title: "Ep 12: Sleep".to_string(),
            author: "Huberman Lab".to_string(),
        };
        let query = user_query("https://youtu.be/abc", &metadata);

        assert!(query.starts_with("Analyze this podcast: https://youtu.be/abc"));
        assert!(query.contains("Video title: Ep 12: Sleep"));
        assert!(query.contains("Channel: Huberman Lab"));
    }

    #[test]
    fn test_user_query_without_metadata() {
        let query = user_query(" https://youtu.be/abc ", &VideoMetadata::default());
        assert_eq!(query, "Analyze this podcast: https://youtu.be/abc");
    }

    #[test]
    fn test_build_messages_roles() {
        let messages = build_messages("rules", "https://youtu.be/abc", &VideoMetadata::default());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system("rules"));
        assert_eq!(messages[1].role, "user");
    }

    #[tokio::test]
    async fn test_load_system_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        tokio::fs::write(&path, "  custom prompt \n").await.unwrap();

        assert_eq!(load_system_prompt(&path).await.unwrap(), "custom prompt");
    }
}
