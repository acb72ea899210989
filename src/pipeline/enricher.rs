//! Record enrichment.
//!
//! Turns a caller's template and arguments into a [`LogRecord`], merging in
//! the startup-configured static properties and the active trace ids.
//! Precedence when names collide: caller arguments, then static properties.
//! Trace ids are top-level record fields and never collide with properties.

use serde_json::{Map, Value};

use crate::context::TraceContext;
use crate::pipeline::args::Args;
use crate::pipeline::clock;
use crate::pipeline::level::Level;
use crate::pipeline::record::LogRecord;
use crate::pipeline::template::MessageTemplate;

/// Builds records. Pure and non-blocking; never fails.
#[derive(Debug, Clone, Default)]
pub struct Enricher {
    static_properties: Map<String, Value>,
}

impl Enricher {
    pub fn new(static_properties: Map<String, Value>) -> Self {
        Self { static_properties }
    }

    pub fn static_properties(&self) -> &Map<String, Value> {
        &self.static_properties
    }

    pub fn enrich(
        &self,
        level: Level,
        template: &str,
        args: Args,
        context: Option<&TraceContext>,
    ) -> LogRecord {
        let timestamp = clock::now();
        let parsed = MessageTemplate::parse(template);
        let (named, positional) = args.into_parts();

        let mut properties = Map::new();
        for (name, value) in named {
            properties.insert(name, value);
        }

        if !positional.is_empty() {
            let unbound: Vec<String> = parsed
                .hole_names()
                .into_iter()
                .filter(|name| !properties.contains_key(*name))
                .map(str::to_string)
                .collect();
            for (name, value) in unbound.into_iter().zip(positional) {
                properties.insert(name, value);
            }
        }

        for (name, value) in &self.static_properties {
            if !properties.contains_key(name) {
                properties.insert(name.clone(), value.clone());
            }
        }

        LogRecord::new(timestamp, level, template, parsed, properties, context)
    }
}
