use std::path::PathBuf;

use super::*;
use crate::acquire::SourceKind;
use crate::model::WordBox;

fn word(x0: f64, x1: f64, y: f64, text: &str) -> WordBox {
    WordBox {
        x0,
        y0: y,
        x1,
        y1: y + 12.0,
        text: text.to_string(),
    }
}

fn pdf_source() -> DocumentSource {
    DocumentSource {
        path: PathBuf::from("invoice.pdf"),
        kind: SourceKind::Pdf,
    }
}

#[test]
fn header_bands_require_all_four_hint_categories() {
    let missing_qty = vec![
        word(60.0, 110.0, 100.0, "Product"),
        word(250.0, 300.0, 100.0, "Price"),
        word(440.0, 500.0, 100.0, "Subtotal"),
    ];
    assert!(grid::detect_header_bands(&missing_qty).is_none());

    let complete = vec![
        word(20.0, 35.0, 100.0, "No"),
        word(60.0, 110.0, 100.0, "Product"),
        word(150.0, 210.0, 100.0, "Variation"),
        word(250.0, 300.0, 100.0, "Product"),
        word(305.0, 340.0, 100.0, "Price"),
        word(380.0, 405.0, 100.0, "Qty"),
        word(440.0, 500.0, 100.0, "Subtotal"),
    ];
    let bands = grid::detect_header_bands(&complete).expect("header qualifies");
    assert_eq!(bands.len(), 6);
    // Two-word "Product Price" label anchors the price band at its first word.
    assert_eq!(bands[3].left, 250.0);
    assert!(bands.windows(2).all(|pair| pair[0].left < pair[1].left));
    assert!(bands.windows(2).all(|pair| pair[0].right <= pair[1].left));
}

#[test]
fn words_are_assigned_by_midpoint_into_item_rows() {
    let lines = vec![
        vec![
            word(20.0, 35.0, 100.0, "No"),
            word(60.0, 110.0, 100.0, "Product"),
            word(150.0, 210.0, 100.0, "Variation"),
            word(250.0, 300.0, 100.0, "Product"),
            word(305.0, 340.0, 100.0, "Price"),
            word(380.0, 405.0, 100.0, "Qty"),
            word(440.0, 500.0, 100.0, "Subtotal"),
        ],
        vec![
            word(22.0, 28.0, 130.0, "1"),
            word(60.0, 95.0, 130.0, "Widget"),
            word(100.0, 108.0, 130.0, "A"),
            word(150.0, 170.0, 130.0, "Red"),
            word(255.0, 300.0, 130.0, "₱100.00"),
            word(385.0, 390.0, 130.0, "2"),
            word(445.0, 490.0, 130.0, "₱200.00"),
        ],
        vec![
            word(60.0, 200.0, 160.0, "Merchandise"),
            word(205.0, 260.0, 160.0, "Subtotal"),
            word(445.0, 490.0, 160.0, "₱200.00"),
        ],
    ];

    let rows = grid::rows_from_word_lines(&lines);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sequence_number, Some(1));
    assert_eq!(rows[0].description, "Widget A");
    assert_eq!(rows[0].variation.as_deref(), Some("Red"));
    assert_eq!(rows[0].unit_price, Some(100.0));
    assert_eq!(rows[0].quantity, Some(2));
    assert_eq!(rows[0].line_subtotal, Some(200.0));
}

#[test]
fn region_heuristic_reads_rows_between_markers() {
    let lines = vec![
        vec![
            word(40.0, 90.0, 80.0, "Order"),
            word(95.0, 150.0, 80.0, "Details"),
        ],
        vec![
            word(60.0, 95.0, 110.0, "Widget"),
            word(100.0, 108.0, 110.0, "A"),
            word(255.0, 300.0, 110.0, "₱100.00"),
            word(385.0, 390.0, 110.0, "2"),
            word(445.0, 490.0, 110.0, "₱200.00"),
        ],
        vec![
            word(60.0, 200.0, 140.0, "Subtotal"),
            word(445.0, 490.0, 140.0, "₱200.00"),
        ],
        vec![
            word(60.0, 95.0, 170.0, "Ghost"),
            word(445.0, 490.0, 170.0, "₱999.00"),
        ],
    ];

    let rows = grid::region_rows(&lines);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Widget A");
    assert_eq!(rows[0].unit_price, Some(100.0));
    assert_eq!(rows[0].quantity, Some(2));
    assert_eq!(rows[0].line_subtotal, Some(200.0));
}

#[test]
fn line_grouping_respects_vertical_tolerance() {
    let words = vec![
        word(10.0, 30.0, 100.0, "a"),
        word(40.0, 60.0, 102.0, "b"),
        word(10.0, 30.0, 130.0, "c"),
    ];

    let lines = grid::group_into_lines(words, grid::LINE_GROUP_TOLERANCE);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), 2);
    assert_eq!(lines[1][0].text, "c");
}

#[test]
fn ruled_pass_maps_pipe_separated_tables() {
    let layout_text = concat!(
        "Order Details\n",
        "No | Product  | Variation | Product Price | Qty | Subtotal\n",
        "1  | Widget A | Red       | ₱100.00       | 2   | ₱200.00\n",
        "Grand Total: ₱200.00\n"
    );

    let rows = layout::parse_layout_tables(layout_text);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sequence_number, Some(1));
    assert_eq!(rows[0].description, "Widget A");
    assert_eq!(rows[0].variation.as_deref(), Some("Red"));
    assert_eq!(rows[0].unit_price, Some(100.0));
    assert_eq!(rows[0].quantity, Some(2));
    assert_eq!(rows[0].line_subtotal, Some(200.0));
}

#[test]
fn ruled_pass_appends_continuation_rows_to_previous_product() {
    let layout_text = concat!(
        "Order Details\n",
        "No | Product  | Qty | Subtotal\n",
        "1  | Widget A | 2   | ₱200.00\n",
        "   | long tail name |     |\n",
        "Grand Total: ₱200.00\n"
    );

    let rows = layout::parse_layout_tables(layout_text);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Widget A long tail name");
}

#[test]
fn alignment_pass_reads_space_separated_tables() {
    let layout_text = concat!(
        "Seller: Acme Store\n",
        "Order Details\n",
        "No   Product     Variation   Product Price   Qty   Subtotal\n",
        "1    Widget A    Red         ₱100.00         2     ₱200.00\n",
        "Grand Total: ₱200.00\n"
    );

    let rows = layout::parse_layout_tables(layout_text);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Widget A");
    assert_eq!(rows[0].variation.as_deref(), Some("Red"));
    assert_eq!(rows[0].unit_price, Some(100.0));
    assert_eq!(rows[0].quantity, Some(2));
    assert_eq!(rows[0].line_subtotal, Some(200.0));
}

#[test]
fn bbox_xml_parses_into_page_word_lists() {
    let xml = concat!(
        "<doc>\n",
        "<page width=\"612.0\" height=\"792.0\">\n",
        "<word xMin=\"60.0\" yMin=\"100.0\" xMax=\"110.0\" yMax=\"112.0\">Product</word>\n",
        "<word xMin=\"380.0\" yMin=\"100.0\" xMax=\"405.0\" yMax=\"112.0\">Qty</word>\n",
        "</page>\n",
        "<page width=\"612.0\" height=\"792.0\">\n",
        "<word xMin=\"60.0\" yMin=\"90.0\" xMax=\"120.0\" yMax=\"102.0\">Thanks&amp;Bye</word>\n",
        "</page>\n",
        "</doc>\n"
    );

    let pages = word_grid::pages_from_bbox_xml(xml);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].len(), 2);
    assert_eq!(pages[0][0].text, "Product");
    assert_eq!(pages[1][0].text, "Thanks&Bye");
}

struct FixedStrategy {
    name: &'static str,
    rows: Vec<ItemRow>,
}

impl TableStrategy for FixedStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, _source: &DocumentSource, _acquired: &AcquiredDocument) -> Vec<ItemRow> {
        self.rows.clone()
    }
}

fn row(description: &str, subtotal: f64) -> ItemRow {
    ItemRow {
        description: description.to_string(),
        line_subtotal: Some(subtotal),
        ..ItemRow::default()
    }
}

#[test]
fn cascade_returns_first_non_empty_result_only() {
    let strategies: Vec<Box<dyn TableStrategy>> = vec![
        Box::new(FixedStrategy {
            name: "first",
            rows: Vec::new(),
        }),
        Box::new(FixedStrategy {
            name: "second",
            rows: vec![row("Widget A", 200.0)],
        }),
        Box::new(FixedStrategy {
            name: "third",
            rows: vec![row("Ghost Item", 999.0)],
        }),
    ];

    let rows = run_cascade(&strategies, &pdf_source(), &AcquiredDocument::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Widget A");
}

#[test]
fn cascade_discards_rows_violating_the_item_invariant() {
    let strategies: Vec<Box<dyn TableStrategy>> = vec![
        Box::new(FixedStrategy {
            name: "invalid",
            rows: vec![ItemRow {
                description: "No numbers here".to_string(),
                ..ItemRow::default()
            }],
        }),
        Box::new(FixedStrategy {
            name: "valid",
            rows: vec![row("Widget A", 200.0)],
        }),
    ];

    let rows = run_cascade(&strategies, &pdf_source(), &AcquiredDocument::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Widget A");
}
