//! Prompt text shared by the adapters.

use crate::types::{ImageRef, SummaryRequest};

/// Base system instruction for every provider.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that summarizes web content clearly and concisely.";

const IMAGE_HINT: &str = "Images from the page are attached. Use them when they add \
                          context, but base the summary primarily on the text.";

/// System instruction, extended with the image hint when images are attached.
pub fn system_instruction(with_images: bool) -> String {
    if with_images {
        format!("{SYSTEM_INSTRUCTION} {IMAGE_HINT}")
    } else {
        SYSTEM_INSTRUCTION.to_string()
    }
}

/// User prompt: template, title, content, and captions for attached images.
pub fn user_prompt(request: &SummaryRequest, attached: &[&ImageRef]) -> String {
    let mut prompt = String::with_capacity(request.content().len() + 512);
    prompt.push_str(request.summary_type().prompt_template());
    prompt.push_str("\n\n");

    let title = request.title().trim();
    if !title.is_empty() {
        prompt.push_str(&format!("Title: {title}\n\n"));
    }

    prompt.push_str("Content:\n");
    prompt.push_str(request.content());

    if !attached.is_empty() {
        prompt.push_str("\n\nAttached images:");
        for (index, image) in attached.iter().enumerate() {
            let caption = image.alt_text.trim();
            let caption = if caption.is_empty() { "(no description)" } else { caption };
            prompt.push_str(&format!("\n{}. {caption}", index + 1));
        }
    }

    prompt
}
