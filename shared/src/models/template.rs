//! Print Template Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Characters per line on 80mm paper
pub const DEFAULT_LINE_WIDTH: u16 = 48;

/// Template purpose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Receipt,
    #[default]
    Kitchen,
    Bar,
}

/// Print template
///
/// Parameterizes the encoder. Only `width` is applied today; the content
/// flags are stored and round-tripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrintTemplate {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    /// Characters per line
    #[serde(default = "default_width")]
    #[validate(range(min = 16, max = 80))]
    pub width: u16,
    #[serde(default = "default_font_size")]
    #[validate(range(min = 8, max = 32))]
    pub font_size: u8,
    #[serde(default = "default_true")]
    pub show_prices: bool,
    #[serde(default = "default_true")]
    pub show_customer: bool,
    #[serde(default = "default_true")]
    pub show_table: bool,
    #[serde(default = "default_true")]
    pub show_special_instructions: bool,
    #[serde(default = "default_true")]
    pub show_timestamp: bool,
    #[serde(default)]
    pub header_text: String,
    #[serde(default)]
    pub footer_text: String,
}

fn default_width() -> u16 {
    DEFAULT_LINE_WIDTH
}

fn default_font_size() -> u8 {
    12
}

fn default_true() -> bool {
    true
}

impl PrintTemplate {
    fn with_kind(id: &str, name: &str, kind: TemplateKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            width: DEFAULT_LINE_WIDTH,
            font_size: default_font_size(),
            show_prices: true,
            show_customer: true,
            show_table: true,
            show_special_instructions: true,
            show_timestamp: true,
            header_text: String::new(),
            footer_text: String::new(),
        }
    }

    /// Built-in templates used when no configuration exists
    pub fn defaults() -> Vec<Self> {
        let mut kitchen = Self::with_kind("kitchen", "Kitchen Ticket", TemplateKind::Kitchen);
        kitchen.show_prices = false;
        kitchen.header_text = "KITCHEN ORDER".to_string();

        let mut receipt = Self::with_kind("receipt", "Customer Receipt", TemplateKind::Receipt);
        receipt.footer_text = "Thank you!".to_string();

        vec![kitchen, receipt]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_on_deserialize() {
        let json = r#"{"id":"bar","name":"Bar","type":"bar"}"#;
        let template: PrintTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.kind, TemplateKind::Bar);
        assert_eq!(template.width, 48);
        assert!(template.show_customer);
        assert!(template.header_text.is_empty());
    }

    #[test]
    fn test_builtin_templates() {
        let templates = PrintTemplate::defaults();
        assert!(templates.iter().any(|t| t.kind == TemplateKind::Kitchen));
        assert!(templates.iter().all(|t| t.validate().is_ok()));
    }

    #[test]
    fn test_width_out_of_range() {
        let mut template = PrintTemplate::defaults().remove(0);
        template.width = 4;
        assert!(template.validate().is_err());
    }
}
