//! Records and messages, keeping every field they were read with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a conversation. `fields` holds the object as read (including
/// any keys beyond role/content) so it can be written back in the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    role: Role,
    content: String,
    fields: Map<String, Value>,
}

impl Message {
    #[cfg(test)]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        let mut fields = Map::new();
        fields.insert("role".to_string(), Value::String(role.as_str().to_string()));
        fields.insert("content".to_string(), Value::String(content.clone()));
        Self {
            role,
            content,
            fields,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub(super) fn set_content(&mut self, content: String) {
        self.content = content;
    }

    pub(super) fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(fields) = value else {
            return Err("message is not an object".to_string());
        };
        let role_value = fields.get("role").ok_or("message has no \"role\"")?;
        let role: Role = serde_json::from_value(role_value.clone())
            .map_err(|_| format!("unknown message role {}", role_value))?;
        let content = match fields.get("content") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => return Err(format!("message content is not text: {}", other)),
        };
        Ok(Self {
            role,
            content,
            fields,
        })
    }

    pub(super) fn to_value(&self) -> Value {
        let mut fields = self.fields.clone();
        let unchanged = match fields.get("content") {
            Some(Value::String(s)) => *s == self.content,
            Some(Value::Null) | None => self.content.is_empty(),
            Some(_) => false,
        };
        if !unchanged {
            // Existing keys keep their position (preserve_order).
            fields.insert("content".to_string(), Value::String(self.content.clone()));
        }
        Value::Object(fields)
    }
}

/// One line of the dataset: a conversation plus whatever else the line carried.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRecord {
    messages: Vec<Message>,
    fields: Map<String, Value>,
}

impl ConversationRecord {
    #[cfg(test)]
    pub fn new(messages: Vec<Message>) -> Self {
        let mut fields = Map::new();
        fields.insert("messages".to_string(), Value::Array(vec![]));
        Self { messages, fields }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(super) fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    pub(super) fn from_line(line: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(line).map_err(RecordError::Json)?;
        let Value::Object(mut fields) = value else {
            return Err(RecordError::Invalid("record is not a JSON object".to_string()));
        };
        let raw_messages = match fields.get_mut("messages") {
            Some(Value::Array(items)) => std::mem::take(items),
            Some(_) => {
                return Err(RecordError::Invalid(
                    "\"messages\" is not an array".to_string(),
                ));
            }
            None => {
                return Err(RecordError::Invalid(
                    "record has no \"messages\" field".to_string(),
                ));
            }
        };
        let messages = raw_messages
            .into_iter()
            .enumerate()
            .map(|(i, v)| Message::from_value(v).map_err(|e| format!("message {}: {}", i, e)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(RecordError::Invalid)?;
        Ok(Self { messages, fields })
    }

    pub(super) fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut fields = self.fields.clone();
        fields.insert(
            "messages".to_string(),
            Value::Array(self.messages.iter().map(Message::to_value).collect()),
        );
        serde_json::to_string(&Value::Object(fields))
    }
}

#[derive(Debug)]
pub(super) enum RecordError {
    Json(serde_json::Error),
    Invalid(String),
}
