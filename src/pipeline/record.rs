//! The log record and its wire shape.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Write as _;

use crate::context::TraceContext;
use crate::pipeline::level::Level;
use crate::pipeline::template::{render_value, MessageTemplate};

/// A single log emission.
///
/// Fields are private so a record cannot change after enrichment; sinks only
/// ever see it behind a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    timestamp: DateTime<Utc>,
    level: Level,
    template: MessageTemplate,
    message_template: String,
    properties: Map<String, Value>,
    trace_id: Option<String>,
    span_id: Option<String>,
    parent_id: Option<String>,
}

impl LogRecord {
    pub(crate) fn new(
        timestamp: DateTime<Utc>,
        level: Level,
        message_template: &str,
        template: MessageTemplate,
        properties: Map<String, Value>,
        context: Option<&TraceContext>,
    ) -> Self {
        Self {
            timestamp,
            level,
            template,
            message_template: message_template.to_string(),
            properties,
            trace_id: context.map(|c| c.trace_id().to_string()),
            span_id: context.map(|c| c.span_id().to_string()),
            parent_id: context.and_then(|c| c.parent_id().map(str::to_string)),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_deref()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// The template with property values substituted.
    pub fn render_message(&self) -> String {
        self.template.render(&self.properties)
    }

    /// The collector payload view of this record.
    pub fn to_event(&self) -> CollectorEvent<'_> {
        CollectorEvent {
            timestamp: self
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            level: self.level,
            message: self.render_message(),
            properties: &self.properties,
            trace_id: self.trace_id(),
            span_id: self.span_id(),
            parent_id: self.parent_id(),
        }
    }

    /// JSON body sent to collectors.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.to_event())
    }

    /// One human-readable console line, without the trailing newline.
    pub fn console_line(&self) -> String {
        let mut line = format!(
            "[{} {}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level.short(),
            self.render_message()
        );

        if !self.properties.is_empty() {
            line.push_str(" {");
            for (i, (key, value)) in self.properties.iter().enumerate() {
                if i > 0 {
                    line.push_str(", ");
                }
                let _ = write!(line, "{}=", key);
                render_value(value, &mut line);
            }
            line.push('}');
        }

        if let (Some(trace_id), Some(span_id)) = (&self.trace_id, &self.span_id) {
            let _ = write!(line, " (traceId={}, spanId={}", trace_id, span_id);
            if let Some(parent_id) = &self.parent_id {
                let _ = write!(line, ", parentId={}", parent_id);
            }
            line.push(')');
        }

        line
    }
}

/// Serialized form of a [`LogRecord`] as posted to a collector.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorEvent<'a> {
    pub timestamp: String,
    pub level: Level,
    pub message: String,
    pub properties: &'a Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<&'a str>,
}
