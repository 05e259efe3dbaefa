use trip_planner_model::{ModelMessage, ModelRequest, ModelTool};

/// The messages exchanged during one agent run.
#[derive(Clone, Default, Debug)]
pub(crate) struct Conversation {
    items: Vec<Item>,
}

#[derive(Clone, Debug)]
struct Item {
    msg: ModelMessage,
    // Readable form of `msg`; opaque messages have no other text form.
    transcript: String,
}

impl Conversation {
    #[inline]
    pub fn push<S: Into<String>>(&mut self, msg: ModelMessage, transcript: S) {
        self.items.push(Item {
            msg,
            transcript: transcript.into(),
        });
    }

    pub fn to_request(&self, tools: Vec<ModelTool>) -> ModelRequest {
        ModelRequest {
            messages: self.items.iter().map(|i| i.msg.clone()).collect(),
            tools,
        }
    }

    /// Renders the whole exchange, one line per message.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            let role = match item.msg {
                ModelMessage::System(_) => "system",
                ModelMessage::User(_) => "user",
                ModelMessage::Assistant(_) | ModelMessage::Opaque(_) => {
                    "assistant"
                }
                ModelMessage::Tool(_) => "tool",
            };
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(role);
            out.push_str(": ");
            out.push_str(&item.transcript);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use trip_planner_model::ToolCallResult;

    use super::*;

    #[test]
    fn test_request_and_transcript() {
        let mut conversation = Conversation::default();
        conversation.push(ModelMessage::User("Plan Rome".to_owned()), "Plan Rome");
        conversation.push(
            ModelMessage::Tool(ToolCallResult {
                id: "call_1".to_owned(),
                content: "Metro".to_owned(),
            }),
            "Metro",
        );

        let request = conversation.to_request(vec![]);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(conversation.transcript(), "user: Plan Rome\ntool: Metro");
    }
}
