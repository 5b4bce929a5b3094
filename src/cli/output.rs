//! Output handlers for CLI commands
//!
//! Supports console (pretty), JSON, and quiet output modes.

use crate::relations::{EntityId, SaveReport, Settings};
use crate::store::Product;
use serde::Serialize;

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

/// A registered callback, as listed by `related hooks`
#[derive(Debug, Clone, Serialize)]
pub struct HookInfo {
    pub name: String,
    pub priority: i32,
}

/// Results emitted by commands
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    RelatedList {
        entity: EntityId,
        /// False when the attribute was never set
        present: bool,
        ids: Vec<EntityId>,
    },
    Saved {
        report: SaveReport,
    },
    Decision {
        hook: String,
        entity: EntityId,
        host_value: bool,
        value: bool,
    },
    Query {
        entity: EntityId,
        sql: String,
    },
    RelatedProducts {
        entity: EntityId,
        ids: Vec<EntityId>,
    },
    Settings {
        settings: Settings,
    },
    SettingsSaved {
        settings: Settings,
    },
    Token {
        action: String,
        token: String,
    },
    Markup {
        html: String,
    },
    Catalog {
        products: Vec<Product>,
    },
    Hooks {
        hooks: Vec<HookInfo>,
    },
    Info {
        message: String,
    },
}

/// Output handler trait
pub trait OutputHandler {
    /// Emit an event
    fn emit(&self, event: OutputEvent);
}

/// Console output handler
pub struct ConsoleHandler;

impl ConsoleHandler {
    fn join_ids(ids: &[EntityId]) -> String {
        if ids.is_empty() {
            "(none)".to_string()
        } else {
            ids.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    fn format(event: &OutputEvent) -> String {
        match event {
            OutputEvent::RelatedList {
                entity,
                present,
                ids,
            } => {
                if *present {
                    format!("{}: {}", entity, Self::join_ids(ids))
                } else {
                    format!("{}: (not set)", entity)
                }
            }
            OutputEvent::Saved { report } => {
                let mut lines = Vec::new();
                match &report.stored {
                    Some(list) => lines.push(format!(
                        "✓ Saved {} related products for {}",
                        list.len(),
                        report.entity
                    )),
                    None => lines.push(format!("✓ Cleared related products for {}", report.entity)),
                }
                if !report.dropped.is_empty() {
                    lines.push(format!("  ignored: {}", report.dropped.join(", ")));
                }
                if !report.reciprocated.is_empty() {
                    lines.push(format!(
                        "  reciprocated on: {}",
                        Self::join_ids(&report.reciprocated)
                    ));
                }
                lines.join("\n")
            }
            OutputEvent::Decision {
                hook,
                entity,
                host_value,
                value,
            } => format!("{} for {}: {} (host: {})", hook, entity, value, host_value),
            OutputEvent::Query { sql, .. } => sql.clone(),
            OutputEvent::RelatedProducts { entity, ids } => {
                format!("related to {}: {}", entity, Self::join_ids(ids))
            }
            OutputEvent::Settings { settings } | OutputEvent::SettingsSaved { settings } => {
                let mut text = String::new();
                if matches!(event, OutputEvent::SettingsSaved { .. }) {
                    text.push_str("✓ Settings saved\n");
                }
                text.push_str(&format!(
                    "empty behavior: {}\nreciprocate: {}",
                    settings.empty_behavior.option_value().unwrap_or("default"),
                    settings.reciprocate
                ));
                text
            }
            OutputEvent::Token { token, .. } => token.clone(),
            OutputEvent::Markup { html } => html.clone(),
            OutputEvent::Catalog { products } => {
                if products.is_empty() {
                    "(no products)".to_string()
                } else {
                    products
                        .iter()
                        .map(|p| format!("{} {} [{}]", p.id, p.formatted_name(), p.status))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            OutputEvent::Hooks { hooks } => hooks
                .iter()
                .map(|h| format!("{} (priority {})", h.name, h.priority))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputEvent::Info { message } => message.clone(),
        }
    }
}

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        println!("{}", Self::format(&event));
    }
}

/// JSON output handler
pub struct JsonHandler {
    pretty: bool,
}

impl JsonHandler {
    /// Create a new JSON handler
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn print_json<T: Serialize>(&self, value: &T) {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };

        if let Ok(s) = json {
            println!("{}", s);
        }
    }
}

impl OutputHandler for JsonHandler {
    fn emit(&self, event: OutputEvent) {
        self.print_json(&event);
    }
}

/// Quiet handler that emits nothing
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, _event: OutputEvent) {}
}

/// Create an output handler based on mode
pub fn create_handler(mode: OutputMode) -> Box<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Box::new(ConsoleHandler),
        OutputMode::Json => Box::new(JsonHandler::new(true)),
        OutputMode::Quiet => Box::new(QuietHandler),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::relations::{EmptyBehavior, RelatedList};
    use std::cell::RefCell;

    /// Collects events for inspection
    #[derive(Default)]
    pub(crate) struct MockHandler {
        events: RefCell<Vec<OutputEvent>>,
    }

    impl MockHandler {
        pub(crate) fn events(&self) -> Vec<OutputEvent> {
            self.events.borrow().clone()
        }
    }

    impl OutputHandler for MockHandler {
        fn emit(&self, event: OutputEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    fn id(n: u64) -> EntityId {
        EntityId::new(n).unwrap()
    }

    #[test]
    fn test_console_related_list() {
        let event = OutputEvent::RelatedList {
            entity: id(10),
            present: true,
            ids: vec![id(3), id(7)],
        };
        assert_eq!(ConsoleHandler::format(&event), "10: 3, 7");

        let event = OutputEvent::RelatedList {
            entity: id(10),
            present: false,
            ids: vec![],
        };
        assert_eq!(ConsoleHandler::format(&event), "10: (not set)");
    }

    #[test]
    fn test_console_save_report() {
        let (list, dropped) = RelatedList::from_submitted(&["3", "abc"]);
        let event = OutputEvent::Saved {
            report: SaveReport {
                entity: id(10),
                stored: Some(list),
                dropped,
                reciprocated: vec![id(3)],
            },
        };

        let text = ConsoleHandler::format(&event);
        assert!(text.contains("Saved 1 related products for 10"));
        assert!(text.contains("ignored: abc"));
        assert!(text.contains("reciprocated on: 3"));
    }

    #[test]
    fn test_console_settings() {
        let event = OutputEvent::SettingsSaved {
            settings: Settings {
                empty_behavior: EmptyBehavior::None,
                reciprocate: true,
            },
        };
        let text = ConsoleHandler::format(&event);
        assert!(text.starts_with("✓ Settings saved"));
        assert!(text.contains("empty behavior: none"));
        assert!(text.contains("reciprocate: true"));
    }

    #[test]
    fn test_json_event_shape() {
        let event = OutputEvent::RelatedProducts {
            entity: id(1),
            ids: vec![id(5), id(9)],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "related_products");
        assert_eq!(json["ids"], serde_json::json!([5, 9]));
    }

    #[test]
    fn test_mock_handler_captures_events() {
        let handler = MockHandler::default();
        handler.emit(OutputEvent::Info {
            message: "test".into(),
        });
        assert_eq!(handler.events().len(), 1);
    }
}
