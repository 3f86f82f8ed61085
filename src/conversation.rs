use crate::llm::Message;
use crate::selection::SelectionSet;

pub const REFUSAL: &str =
    "Sorry, I can only help with skincare, haircare, makeup, fragrance, and beauty routine questions.";

pub const EMPTY_SELECTION_NOTICE: &str = "Select at least one product to build a routine.";

fn system_prompt() -> String {
    format!(
        "You are a friendly, knowledgeable beauty advisor. Only answer questions about \
         skincare, haircare, makeup, fragrance, and beauty routines, including questions \
         about a routine you already generated. If the user asks about anything else, \
         reply exactly: \"{REFUSAL}\" Keep answers concise. Use short headings ending \
         with a colon, numbered steps, and bullet points where they help."
    )
}

/// Full transcript sent with every completion call.
///
/// Append-only: turns are never edited, removed or truncated.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::system(system_prompt())],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the "generate routine" user message from the current selection.
///
/// Returns `None` when nothing is selected.
pub fn routine_prompt(selection: &SelectionSet) -> Option<String> {
    if selection.is_empty() {
        return None;
    }

    let mut prompt = String::from(
        "Create a personalized beauty routine using only these selected products:\n",
    );
    for (_, item) in selection.iter() {
        let label = if item.brand.is_empty() {
            item.name.clone()
        } else {
            format!("{} {}", item.brand, item.name)
        };
        prompt.push_str(&format!("- {}\n", label));
    }
    prompt.push_str(
        "\nOrganize it into Morning and Evening sections with numbered steps. \
         For each step, say which product to use and how, and add any tips \
         about order of application or frequency.",
    );

    Some(prompt)
}
