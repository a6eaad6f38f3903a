use reqwest::multipart::{Form, Part};

use super::error::NotifyError;
use super::types::ComposedMessage;

pub const ROOM_FIELD: &str = "roomId";
pub const TEXT_FIELD: &str = "text";
pub const FILES_FIELD: &str = "files";
pub const ATTACHMENT_FILE_NAME: &str = "log";
pub const ATTACHMENT_MIME: &str = "text/plain";

/// Value of a single multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File {
        file_name: &'static str,
        mime: &'static str,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub value: FieldValue,
}

/// Transport-neutral multipart body, kept in memory until it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPayload {
    fields: Vec<FormField>,
}

impl MultipartPayload {
    /// Build the payload: `roomId`, `text` and, with an attachment, `files`.
    pub fn build(message: ComposedMessage, room_id: &str) -> Self {
        let mut fields = vec![
            FormField {
                name: ROOM_FIELD,
                value: FieldValue::Text(room_id.to_string()),
            },
            FormField {
                name: TEXT_FIELD,
                value: FieldValue::Text(message.text),
            },
        ];
        if let Some(bytes) = message.attachment {
            fields.push(FormField {
                name: FILES_FIELD,
                value: FieldValue::File {
                    file_name: ATTACHMENT_FILE_NAME,
                    mime: ATTACHMENT_MIME,
                    bytes,
                },
            });
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Convert into a `reqwest` form sent as one `multipart/form-data` request.
    pub fn into_form(self) -> Result<Form, NotifyError> {
        self.fields
            .into_iter()
            .try_fold(Form::new(), |form, field| match field.value {
                FieldValue::Text(text) => Ok(form.text(field.name, text)),
                FieldValue::File {
                    file_name,
                    mime,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(mime)
                        .map_err(|e| {
                            NotifyError::Config(format!("invalid attachment mime {mime}: {e}"))
                        })?;
                    Ok(form.part(field.name, part))
                }
            })
    }
}
