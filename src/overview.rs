use std::collections::BTreeMap;

use crate::model::{
    FieldSet, OrderSummary, OverviewItem, PartyIdentity, PaymentBreakdown, StandardOverview,
};

const INVOICE_NUMBER_KEYS: &[&str] = &["invoice no", "invoice no.", "invoice number", "invoice #", "inv no"];
const ORDER_SUMMARY_KEYS: &[&str] = &["order summary no", "order summary no.", "order summary number"];
const ORDER_ID_KEYS: &[&str] = &["order id", "order no", "order no.", "order number"];
const DATE_KEYS: &[&str] = &["date", "invoice date", "order date", "order placed"];
const DATE_ISSUED_KEYS: &[&str] = &["date issued", "issue date", "issued"];
const PAID_DATE_KEYS: &[&str] = &["order paid date", "order paid", "paid date", "payment date"];
const PAYMENT_METHOD_KEYS: &[&str] = &["payment method", "mode of payment", "paid via", "payment"];

/// Pure mapping from the field set onto the externally consumed overview.
/// Order-summary fields resolve from the field set first, then from the
/// harvested label map; no new inference happens here.
pub fn build(found: &FieldSet) -> StandardOverview {
    StandardOverview {
        seller: PartyIdentity {
            name: found.seller.clone(),
            address: found.seller_address.clone(),
        },
        buyer: PartyIdentity {
            name: found.buyer.clone(),
            address: found.buyer_address.clone(),
        },
        order: OrderSummary {
            invoice_number: found
                .invoice_number
                .clone()
                .or_else(|| from_labels(&found.labels, INVOICE_NUMBER_KEYS)),
            order_summary_no: found
                .order_summary_no
                .clone()
                .or_else(|| from_labels(&found.labels, ORDER_SUMMARY_KEYS)),
            order_id: found
                .order_id
                .clone()
                .or_else(|| from_labels(&found.labels, ORDER_ID_KEYS)),
            date: found
                .date
                .clone()
                .or_else(|| from_labels(&found.labels, DATE_KEYS)),
            date_issued: found
                .date_issued
                .clone()
                .or_else(|| from_labels(&found.labels, DATE_ISSUED_KEYS)),
            order_paid_date: found
                .order_paid_date
                .clone()
                .or_else(|| from_labels(&found.labels, PAID_DATE_KEYS)),
            payment_method: found
                .payment_method
                .clone()
                .or_else(|| from_labels(&found.labels, PAYMENT_METHOD_KEYS)),
        },
        items: found
            .items
            .iter()
            .map(|row| OverviewItem {
                no: row.sequence_number,
                product: row.description.clone(),
                variation: row.variation.clone(),
                product_price: row.unit_price,
                qty: row.quantity,
                subtotal: row.line_subtotal,
            })
            .collect(),
        payment: PaymentBreakdown {
            merchandise_subtotal: found.subtotal,
            shipping_fee: found.shipping_fee,
            shipping_discount: found.shipping_discount.map(f64::abs),
            voucher_discount: found.voucher.map(f64::abs),
            grand_total: found.grand_total.or(found.total),
            currency: found.currency.clone(),
        },
    }
}

fn from_labels(labels: &BTreeMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| labels.get(*key).map(|value| value.trim().to_string()))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemRow;

    #[test]
    fn discounts_surface_as_positive_magnitudes() {
        let found = FieldSet {
            shipping_discount: Some(-50.0),
            voucher: Some(-20.0),
            total: Some(500.0),
            grand_total: Some(500.0),
            ..FieldSet::default()
        };

        let overview = build(&found);
        assert_eq!(overview.payment.shipping_discount, Some(50.0));
        assert_eq!(overview.payment.voucher_discount, Some(20.0));
        assert_eq!(overview.payment.grand_total, Some(500.0));
    }

    #[test]
    fn order_fields_fall_back_to_the_label_map() {
        let mut found = FieldSet::default();
        found
            .labels
            .insert("payment method".to_string(), "GCash".to_string());
        found
            .labels
            .insert("order no".to_string(), "A-1002".to_string());

        let overview = build(&found);
        assert_eq!(overview.order.payment_method.as_deref(), Some("GCash"));
        assert_eq!(overview.order.order_id.as_deref(), Some("A-1002"));
    }

    #[test]
    fn direct_fields_win_over_label_map_entries() {
        let mut found = FieldSet {
            payment_method: Some("Cash on Delivery".to_string()),
            ..FieldSet::default()
        };
        found
            .labels
            .insert("payment method".to_string(), "GCash".to_string());

        let overview = build(&found);
        assert_eq!(
            overview.order.payment_method.as_deref(),
            Some("Cash on Delivery")
        );
    }

    #[test]
    fn items_are_recased_to_the_external_schema() {
        let found = FieldSet {
            items: vec![ItemRow {
                sequence_number: Some(1),
                description: "Widget A".to_string(),
                variation: Some("Red".to_string()),
                unit_price: Some(100.0),
                quantity: Some(2),
                line_subtotal: Some(200.0),
            }],
            ..FieldSet::default()
        };

        let overview = build(&found);
        assert_eq!(overview.items.len(), 1);
        assert_eq!(overview.items[0].product, "Widget A");
        assert_eq!(overview.items[0].qty, Some(2));
        assert_eq!(overview.items[0].product_price, Some(100.0));
    }

    #[test]
    fn missing_fields_surface_as_null() {
        let overview = build(&FieldSet::default());
        assert!(overview.seller.name.is_none());
        assert!(overview.payment.grand_total.is_none());
        assert!(overview.items.is_empty());
    }
}
