use super::*;
use crate::model::AcquiredDocument;

fn document(text: &str) -> AcquiredDocument {
    AcquiredDocument {
        text: text.to_string(),
        page_images: Vec::new(),
        bold_total_lines: Vec::new(),
    }
}

#[test]
fn date_takes_the_first_matching_line() {
    let mut found = FieldSet::default();
    date::fill(
        &mut found,
        "Acme Trading\nDate Issued: April 1, 2024\nOrder Paid: 2024-04-02",
    );
    assert_eq!(found.date.as_deref(), Some("April 1, 2024"));
}

#[test]
fn date_recognizes_iso_and_day_first_forms() {
    let mut found = FieldSet::default();
    date::fill(&mut found, "Printed 2024-04-02");
    assert_eq!(found.date.as_deref(), Some("2024-04-02"));

    let mut found = FieldSet::default();
    date::fill(&mut found, "Printed 02/04/2024");
    assert_eq!(found.date.as_deref(), Some("02/04/2024"));
}

#[test]
fn identifiers_first_writer_wins() {
    let mut found = FieldSet::default();
    identifiers::fill(
        &mut found,
        "Order ID: A-1001\nOrder ID: B-2002\nInvoice No: INV-7\nPayment Method: GCash",
    );
    assert_eq!(found.order_id.as_deref(), Some("A-1001"));
    assert_eq!(found.invoice_number.as_deref(), Some("INV-7"));
    assert_eq!(found.payment_method.as_deref(), Some("GCash"));
}

#[test]
fn label_map_harvests_label_value_lines() {
    let mut found = FieldSet::default();
    identifiers::fill(
        &mut found,
        "Mode of Payment: Maya\nTracking No: 123456\nMode of Payment: Later Entry",
    );
    assert_eq!(
        found.labels.get("mode of payment").map(String::as_str),
        Some("Maya")
    );
    assert_eq!(
        found.labels.get("tracking no").map(String::as_str),
        Some("123456")
    );
}

#[test]
fn seller_name_drops_trailing_parenthetical_notes() {
    let mut found = FieldSet::default();
    parties::fill(&mut found, "Sold By: Acme Trading (Online Shop)\n");
    assert_eq!(found.seller.as_deref(), Some("Acme Trading"));
}

#[test]
fn address_blocks_capture_following_lines_until_next_section() {
    let mut found = FieldSet::default();
    parties::fill(
        &mut found,
        "Buyer Address:\n123 Mabini St\nQuezon City\nOrder Details\nNo Product",
    );
    assert_eq!(
        found.buyer_address.as_deref(),
        Some("123 Mabini St, Quezon City")
    );
}

#[test]
fn platform_block_layout_fills_buyer_and_seller() {
    let text = concat!(
        "Delivery Details\n",
        "Juan Dela Cruz\n",
        "456 Rizal Ave\n",
        "Makati City\n",
        "Sold By\n",
        "Acme Trading\n",
        "789 Bonifacio Rd\n",
        "Order Details\n"
    );
    let mut found = FieldSet::default();
    parties::fill(&mut found, text);

    assert_eq!(found.buyer.as_deref(), Some("Juan Dela Cruz"));
    assert_eq!(
        found.buyer_address.as_deref(),
        Some("456 Rizal Ave, Makati City")
    );
    assert_eq!(found.seller.as_deref(), Some("Acme Trading"));
    assert_eq!(found.seller_address.as_deref(), Some("789 Bonifacio Rd"));
}

#[test]
fn bold_grand_total_beats_a_plain_subtotal_line() {
    let mut found = FieldSet::default();
    total::fill(
        &mut found,
        "Subtotal: ₱450.00\nGrand Total: ₱500.00",
        &["Grand Total: ₱500.00".to_string()],
    );
    assert_eq!(found.total, Some(500.0));
}

#[test]
fn explicit_grand_total_line_wins_without_bold_hints() {
    let mut found = FieldSet::default();
    total::fill(&mut found, "Subtotal: ₱450.00\nGrand Total: ₱500.00", &[]);
    assert_eq!(found.total, Some(500.0));
}

#[test]
fn grand_total_amount_may_sit_on_a_following_line() {
    let mut found = FieldSet::default();
    total::fill(&mut found, "Grand Total (includes VAT)\n\n₱1,234.50", &[]);
    assert_eq!(found.total, Some(1234.5));
}

#[test]
fn component_context_lines_are_excluded_from_keyword_totals() {
    let mut found = FieldSet::default();
    total::fill(
        &mut found,
        "Shipping Total: ₱50.00\nAmount Due: ₱500.00",
        &[],
    );
    assert_eq!(found.total, Some(500.0));
}

#[test]
fn amount_in_words_resolves_when_no_numeric_total_exists() {
    let mut found = FieldSet::default();
    total::fill(
        &mut found,
        "Amount in Words: Three Hundred Forty Four Pesos and 60/100",
        &[],
    );
    assert_eq!(found.total, Some(344.6));
}

#[test]
fn number_words_cover_larger_magnitudes() {
    assert_eq!(
        number_words::parse_amount("One Thousand Two Hundred Thirty Four Pesos"),
        Some(1234.0)
    );
    assert_eq!(
        number_words::parse_amount("Two Million Five Hundred Thousand"),
        Some(2_500_000.0)
    );
    assert_eq!(number_words::parse_amount("no numbers here at all"), None);
}

#[test]
fn largest_currency_amount_is_the_absolute_fallback() {
    let mut found = FieldSet::default();
    total::fill(
        &mut found,
        "Ref 123\nPaid ₱300.00 cash\nChange ₱50.00",
        &[],
    );
    assert_eq!(found.total, Some(300.0));
}

#[test]
fn misspelled_shipping_fee_label_matches_fuzzily() {
    let mut found = FieldSet::default();
    breakdown::fill_labels(&mut found, "Shiping Fe : ₱50.00");
    assert_eq!(found.shipping_fee, Some(50.0));
}

#[test]
fn label_line_without_an_amount_settles_nothing() {
    let mut found = FieldSet::default();
    breakdown::fill_labels(&mut found, "Shipping discount note: see policy\nno amounts here");
    assert_eq!(found.shipping_discount, None);
}

#[test]
fn discounts_are_stored_negative() {
    let mut found = FieldSet::default();
    breakdown::fill_labels(
        &mut found,
        "Merchandise Subtotal ₱900.00\nShipping Discount -₱50.00\nPlatform Voucher ₱20.00",
    );
    assert_eq!(found.subtotal, Some(900.0));
    assert_eq!(found.shipping_discount, Some(-50.0));
    assert_eq!(found.voucher, Some(-20.0));
}

#[test]
fn metadata_lines_never_settle_components() {
    let mut found = FieldSet::default();
    breakdown::fill_labels(&mut found, "Subtotal tracking 9876543210 ₱900.00");
    assert_eq!(found.subtotal, None);
}

#[test]
fn derived_shipping_fee_follows_the_arithmetic_guard() {
    let mut found = FieldSet {
        total: Some(1000.0),
        subtotal: Some(900.0),
        shipping_discount: Some(-50.0),
        ..FieldSet::default()
    };
    breakdown::derive(&mut found);

    assert_eq!(found.shipping_fee, Some(150.0));
    assert!(found.derived_fields.iter().any(|name| name == "shippingFee"));
}

#[test]
fn derived_shipping_fee_beyond_the_cap_is_rejected() {
    let mut found = FieldSet {
        total: Some(100_000.0),
        subtotal: Some(10_000.0),
        ..FieldSet::default()
    };
    breakdown::derive(&mut found);

    // 90 000 exceeds max(total * 0.5, 20 000) = 50 000.
    assert_eq!(found.shipping_fee, None);
    assert!(found.derived_fields.is_empty());
}

#[test]
fn derived_voucher_fills_a_negative_residual() {
    let mut found = FieldSet {
        total: Some(930.0),
        subtotal: Some(900.0),
        shipping_fee: Some(50.0),
        ..FieldSet::default()
    };
    breakdown::derive(&mut found);

    assert_eq!(found.voucher, Some(-20.0));
    assert!(found.derived_fields.iter().any(|name| name == "voucher"));
}

#[test]
fn subtotal_derives_from_item_row_sums() {
    let mut found = FieldSet {
        items: vec![
            ItemRow {
                description: "Widget A".to_string(),
                line_subtotal: Some(200.0),
                ..ItemRow::default()
            },
            ItemRow {
                description: "Gadget B".to_string(),
                line_subtotal: Some(50.0),
                ..ItemRow::default()
            },
        ],
        ..FieldSet::default()
    };
    breakdown::derive(&mut found);

    assert_eq!(found.subtotal, Some(250.0));
    assert!(found.derived_fields.iter().any(|name| name == "subtotal"));
}

#[test]
fn disproportionate_components_are_discarded() {
    let mut found = FieldSet {
        total: Some(100.0),
        shipping_fee: Some(5_000.0),
        subtotal: Some(90.0),
        ..FieldSet::default()
    };
    breakdown::cleanup(&mut found);

    assert_eq!(found.shipping_fee, None);
    assert_eq!(found.subtotal, Some(90.0));
}

#[test]
fn fixed_pattern_rows_parse_under_a_product_qty_header() {
    let text = concat!(
        "No  Product  Price  Qty  Subtotal\n",
        "1   Widget A   ₱100.00   2   ₱200.00\n",
        "2   Gadget B   ₱50.00    1   ₱50.00\n",
        "    Red Large\n",
        "Merchandise Subtotal ₱250.00\n"
    );
    let mut found = FieldSet::default();
    items::fill(&mut found, text, &[]);

    assert_eq!(found.items.len(), 2);
    assert_eq!(found.items[0].description, "Widget A");
    assert_eq!(found.items[0].unit_price, Some(100.0));
    assert_eq!(found.items[0].quantity, Some(2));
    assert_eq!(found.items[1].variation.as_deref(), Some("Red Large"));
}

#[test]
fn multiplier_form_rows_parse_qty_times_price() {
    let text = concat!(
        "Product list with Qty\n",
        "1. Widget A 2 x ₱100.00 = ₱200.00\n",
        "Grand Total ₱200.00\n"
    );
    let mut found = FieldSet::default();
    items::fill(&mut found, text, &[]);

    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].quantity, Some(2));
    assert_eq!(found.items[0].unit_price, Some(100.0));
    assert_eq!(found.items[0].line_subtotal, Some(200.0));
}

#[test]
fn cascade_rows_take_precedence_over_the_regex_ladder() {
    let cascade = vec![ItemRow {
        description: "From Cascade".to_string(),
        variation: Some("Red".to_string()),
        line_subtotal: Some(200.0),
        ..ItemRow::default()
    }];
    let text = "No Product Price Qty Subtotal\n1 Widget A ₱100.00 2 ₱200.00\n";

    let mut found = FieldSet::default();
    items::fill(&mut found, text, &cascade);

    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].description, "From Cascade");
}

#[test]
fn order_details_block_reconstructs_rows_with_variations() {
    let text = concat!(
        "Order Details\n",
        "1 Alpha Gel Pen (Blue) 2 x ₱25.00 ₱50.00\n",
        "2 Notebook Hardcover\n",
        "  ₱120.00\n",
        "Merchandise Subtotal ₱170.00\n"
    );
    let mut found = FieldSet::default();
    items::fill(&mut found, text, &[]);

    assert_eq!(found.items.len(), 2);
    assert_eq!(found.items[0].description, "Alpha Gel Pen");
    assert_eq!(found.items[0].variation.as_deref(), Some("Blue"));
    assert_eq!(found.items[0].quantity, Some(2));
    assert_eq!(found.items[0].unit_price, Some(25.0));
    assert_eq!(found.items[0].line_subtotal, Some(50.0));
    assert_eq!(found.items[1].description, "Notebook Hardcover");
    assert_eq!(found.items[1].line_subtotal, Some(120.0));
}

#[test]
fn labeled_blocks_read_price_qty_subtotal_lines() {
    let text = concat!(
        "Alpha Gel Pen\n",
        "Product Price: ₱25.00\n",
        "Qty: 2\n",
        "Subtotal: ₱50.00\n"
    );
    let mut found = FieldSet::default();
    items::fill(&mut found, text, &[]);

    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].description, "Alpha Gel Pen");
    assert_eq!(found.items[0].unit_price, Some(25.0));
    assert_eq!(found.items[0].quantity, Some(2));
    assert_eq!(found.items[0].line_subtotal, Some(50.0));
}

#[test]
fn description_quantity_pairs_guard_against_unit_counts() {
    let text = concat!(
        "Premium Ballpen Set\n",
        "3\n",
        "Sticker Pack 20 pcs\n",
        "20\n"
    );
    let mut found = FieldSet::default();
    items::fill(&mut found, text, &[]);

    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].description, "Premium Ballpen Set");
    assert_eq!(found.items[0].quantity, Some(3));
}

#[test]
fn cleanup_discards_noise_and_numberless_rows() {
    let mut found = FieldSet {
        items: vec![
            ItemRow {
                description: "Widget A".to_string(),
                quantity: Some(2),
                ..ItemRow::default()
            },
            ItemRow {
                description: "Tracking 98765432109".to_string(),
                quantity: Some(1),
                ..ItemRow::default()
            },
            ItemRow {
                description: "No numeric evidence".to_string(),
                ..ItemRow::default()
            },
        ],
        ..FieldSet::default()
    };
    items::cleanup(&mut found);

    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].description, "Widget A");
}

#[test]
fn full_extraction_resolves_a_one_page_order_document() {
    let text = concat!(
        "Acme Trading (Main Branch)\n",
        "Invoice No: INV-2024-001\n",
        "Date Issued: April 1, 2024\n",
        "Sold By: Acme Trading (Online)\n",
        "Payment Method: Cash on Delivery\n",
        "Order Details\n",
        "No  Product  Price  Qty  Subtotal\n",
        "1   Widget A  ₱100.00  2  ₱200.00\n",
        "Merchandise Subtotal ₱200.00\n",
        "Shipping Fee ₱45.00\n",
        "Shipping Discount -₱45.00\n",
        "Grand Total: ₱200.00\n"
    );

    let found = extract(&document(text), &[]);

    assert_eq!(found.date.as_deref(), Some("April 1, 2024"));
    assert_eq!(found.invoice_number.as_deref(), Some("INV-2024-001"));
    assert_eq!(found.seller.as_deref(), Some("Acme Trading"));
    assert_eq!(found.payment_method.as_deref(), Some("Cash on Delivery"));
    assert_eq!(found.currency.as_deref(), Some("PHP"));
    assert_eq!(found.subtotal, Some(200.0));
    assert_eq!(found.shipping_fee, Some(45.0));
    assert_eq!(found.shipping_discount, Some(-45.0));
    assert_eq!(found.total, Some(200.0));
    assert_eq!(found.grand_total, Some(200.0));
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].description, "Widget A");
    assert!(found.derived_fields.is_empty());
}

#[test]
fn extraction_is_deterministic_for_identical_input() {
    let text = "Order ID: A-1001\nGrand Total: ₱500.00\n";
    let first = extract(&document(text), &[]);
    let second = extract(&document(text), &[]);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn grand_total_aliases_total_after_extraction() {
    let found = extract(&document("TOTAL: ₱500.00\n"), &[]);
    assert_eq!(found.total, Some(500.0));
    assert_eq!(found.grand_total, Some(500.0));
}
