//! Kitchen ticket renderer
//!
//! Renders OrderData into ESC/POS bytes for thermal printers, or into a
//! plain-text ticket for relays and human review. Both outputs share one
//! layout routine, so the emission order is identical:
//!
//! header, order id, time, customer, table, order type, items,
//! special instructions, total, cut.

use galley_printer::{EscPosBuilder, PlainTextBuilder, TextLayout};
use shared::models::{DEFAULT_LINE_WIDTH, OrderData, PrintTemplate, TemplateKind};

/// Kitchen ticket renderer
pub struct KitchenTicketRenderer {
    width: usize,
}

impl KitchenTicketRenderer {
    /// Create a new renderer with specified paper width
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Renderer sized by the first kitchen template, if any
    pub fn for_templates(templates: &[PrintTemplate]) -> Self {
        let width = templates
            .iter()
            .find(|t| t.kind == TemplateKind::Kitchen)
            .map(|t| t.width)
            .unwrap_or(DEFAULT_LINE_WIDTH);
        Self::new(width as usize)
    }

    /// Render an order to ESC/POS bytes
    pub fn encode(&self, order: &OrderData) -> Vec<u8> {
        let mut b = EscPosBuilder::new(self.width);
        self.render(&mut b, order);
        b.build()
    }

    /// Render an order to plain text
    pub fn encode_text(&self, order: &OrderData) -> String {
        let mut b = PlainTextBuilder::new(self.width);
        self.render(&mut b, order);
        b.finalize()
    }

    fn render<L: TextLayout>(&self, b: &mut L, order: &OrderData) {
        self.render_header(b, order);
        self.render_items(b, order);
        self.render_footer(b, order);
    }

    fn render_header<L: TextLayout>(&self, b: &mut L, order: &OrderData) {
        b.center().bold().double_size();
        b.line("KITCHEN ORDER");
        b.reset_size().bold_off().left();
        b.sep_double();

        b.line(&format!("Order: {}", order.id));
        b.line(&format!(
            "Time: {}",
            order.order_time.format("%Y-%m-%d %H:%M:%S")
        ));

        if let Some(customer) = present(&order.customer_name) {
            b.line(&format!("Customer: {}", customer));
        }
        if let Some(table) = present(&order.table_number) {
            b.line(&format!("Table: {}", table));
        }
        b.line(&format!("Type: {}", order.order_type));
        b.sep_single();
    }

    fn render_items<L: TextLayout>(&self, b: &mut L, order: &OrderData) {
        for item in &order.items {
            b.bold();
            b.line(&format!("{}x {}", item.quantity, item.name));
            b.bold_off();

            if let Some(note) = present(&item.special_instructions) {
                b.line(&format!("   * {}", note));
            }
        }

        if let Some(note) = present(&order.special_instructions) {
            b.sep_single();
            b.bold();
            b.line("SPECIAL INSTRUCTIONS:");
            b.bold_off();
            b.line(note);
        }
        b.sep_single();
    }

    fn render_footer<L: TextLayout>(&self, b: &mut L, order: &OrderData) {
        b.center().bold();
        b.line(&format!("TOTAL: ${:.2}", order.total));
        b.bold_off().left();

        b.feed(3);
        b.cut();
    }
}

impl Default for KitchenTicketRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_WIDTH as usize)
    }
}

/// Blank optional text is treated as absent
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shared::models::{OrderItem, OrderType};

    const BOLD_ON: [u8; 3] = [0x1B, 0x45, 0x01];
    const BOLD_OFF: [u8; 3] = [0x1B, 0x45, 0x00];
    const CENTER: [u8; 3] = [0x1B, 0x61, 0x01];
    const LEFT: [u8; 3] = [0x1B, 0x61, 0x00];
    const CUT: [u8; 3] = [0x1D, 0x56, 0x00];

    fn create_test_order() -> OrderData {
        OrderData {
            id: "T1".to_string(),
            customer_name: None,
            items: vec![OrderItem {
                name: "Burger".to_string(),
                quantity: 2,
                special_instructions: Some("No pickles".to_string()),
                price: Decimal::new(5, 0),
            }],
            total: Decimal::new(10, 0),
            order_time: Utc.with_ymd_and_hms(2024, 1, 22, 14, 32, 15).unwrap(),
            special_instructions: None,
            table_number: Some("12".to_string()),
            order_type: OrderType::DineIn,
        }
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("missing {:?} in {:?}", needle, haystack))
    }

    #[test]
    fn test_emission_order() {
        let mut order = create_test_order();
        order.customer_name = Some("Ana".to_string());
        order.special_instructions = Some("Allergy: nuts".to_string());

        let text = KitchenTicketRenderer::default().encode_text(&order);

        let steps = [
            "KITCHEN ORDER",
            "Order: T1",
            "Time: 2024-01-22 14:32:15",
            "Customer: Ana",
            "Table: 12",
            "Type: Dine-in",
            "2x Burger",
            "   * No pickles",
            "SPECIAL INSTRUCTIONS:",
            "Allergy: nuts",
            "TOTAL: $10.00",
        ];
        let positions: Vec<usize> = steps.iter().map(|s| position(&text, s)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", text);
    }

    #[test]
    fn test_escpos_framing() {
        let data = KitchenTicketRenderer::default().encode(&create_test_order());

        // ESC @ then ESC t 16
        assert_eq!(&data[..5], &[0x1B, 0x40, 0x1B, 0x74, 16]);
        assert!(data.ends_with(&CUT));
    }

    #[test]
    fn test_styles_are_paired() {
        let mut order = create_test_order();
        order.special_instructions = Some("Rush".to_string());
        let data = KitchenTicketRenderer::default().encode(&order);

        assert_eq!(count(&data, &BOLD_ON), count(&data, &BOLD_OFF));
        assert_eq!(count(&data, &CENTER), count(&data, &LEFT));
        assert_eq!(count(&data, &[0x1D, 0x21, 0x11]), count(&data, &[0x1D, 0x21, 0x00]));
    }

    #[test]
    fn test_order_text_cannot_inject_commands() {
        let mut order = create_test_order();
        order.items[0].name = "Burger\x1bE\x01\x1dV\x00".to_string();
        order.customer_name = Some("Ana\x1b@".to_string());
        order.special_instructions = Some("Rush\x1d!\x11".to_string());
        let data = KitchenTicketRenderer::default().encode(&order);

        assert_eq!(count(&data, &BOLD_ON), count(&data, &BOLD_OFF));
        assert_eq!(count(&data, &CUT), 1);
        assert_eq!(count(&data, &[0x1B, 0x40]), 1);
        assert_eq!(count(&data, &[0x1D, 0x21, 0x11]), count(&data, &[0x1D, 0x21, 0x00]));

        let text = KitchenTicketRenderer::default().encode_text(&order);
        assert!(text.contains("2x Burger?E??V?"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_zero_items_still_renders() {
        let mut order = create_test_order();
        order.items.clear();

        let renderer = KitchenTicketRenderer::default();
        let text = renderer.encode_text(&order);
        assert!(text.contains("KITCHEN ORDER"));
        assert!(text.contains("TOTAL: $10.00"));
        assert!(renderer.encode(&order).ends_with(&CUT));
    }

    #[test]
    fn test_absent_optionals_omit_lines() {
        let mut order = create_test_order();
        order.table_number = Some("  ".to_string());

        let text = KitchenTicketRenderer::default().encode_text(&order);
        assert!(!text.contains("Customer:"));
        assert!(!text.contains("Table:"));
        assert!(!text.contains("SPECIAL INSTRUCTIONS"));
    }

    #[test]
    fn test_template_width() {
        let mut templates = PrintTemplate::defaults();
        templates[0].width = 32;

        let text = KitchenTicketRenderer::for_templates(&templates).encode_text(&create_test_order());
        assert!(text.contains(&format!("{}\n", "=".repeat(32))));
        assert!(!text.contains(&"=".repeat(33)));
    }
}
