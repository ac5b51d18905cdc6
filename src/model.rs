use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

/// One row of a document's itemized product/quantity/price table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub sequence_number: Option<i64>,
    pub description: String,
    pub variation: Option<String>,
    pub unit_price: Option<f64>,
    pub quantity: Option<i64>,
    pub line_subtotal: Option<f64>,
}

impl ItemRow {
    pub fn has_numeric_evidence(&self) -> bool {
        self.unit_price.is_some() || self.quantity.is_some() || self.line_subtotal.is_some()
    }

    /// Row invariant: non-empty description plus at least one numeric field.
    pub fn is_acceptable(&self) -> bool {
        !self.description.trim().is_empty() && self.has_numeric_evidence()
    }
}

/// Word bounding box from whichever text or OCR source is in use.
/// Consumed within one extractor invocation, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct WordBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub text: String,
}

impl WordBox {
    pub fn mid_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }
}

/// A rasterized page kept on disk for the lifetime of one pipeline run.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page_number: usize,
    pub png_path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct AcquiredDocument {
    pub text: String,
    pub page_images: Vec<PageImage>,
    pub bold_total_lines: Vec<String>,
}

/// Flat record of every heuristically extracted metadata field.
/// Passes fill only fields still unset; discounts are stored negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSet {
    pub date: Option<String>,
    pub invoice_number: Option<String>,
    pub order_summary_no: Option<String>,
    pub order_id: Option<String>,
    pub date_issued: Option<String>,
    pub order_paid_date: Option<String>,
    pub payment_method: Option<String>,
    pub seller: Option<String>,
    pub seller_address: Option<String>,
    pub buyer: Option<String>,
    pub buyer_address: Option<String>,
    pub currency: Option<String>,
    pub subtotal: Option<f64>,
    pub shipping_fee: Option<f64>,
    pub shipping_discount: Option<f64>,
    pub voucher: Option<f64>,
    pub total: Option<f64>,
    pub grand_total: Option<f64>,
    pub items: Vec<ItemRow>,
    pub labels: BTreeMap<String, String>,
    pub derived_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyIdentity {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub invoice_number: Option<String>,
    pub order_summary_no: Option<String>,
    pub order_id: Option<String>,
    pub date: Option<String>,
    pub date_issued: Option<String>,
    pub order_paid_date: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewItem {
    pub no: Option<i64>,
    pub product: String,
    pub variation: Option<String>,
    pub product_price: Option<f64>,
    pub qty: Option<i64>,
    pub subtotal: Option<f64>,
}

/// Discount fields carry positive magnitudes for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub merchandise_subtotal: Option<f64>,
    pub shipping_fee: Option<f64>,
    pub shipping_discount: Option<f64>,
    pub voucher_discount: Option<f64>,
    pub grand_total: Option<f64>,
    pub currency: Option<String>,
}

/// The externally consumed record: created once at the end of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardOverview {
    pub seller: PartyIdentity,
    pub buyer: PartyIdentity,
    pub order: OrderSummary,
    pub items: Vec<OverviewItem>,
    pub payment: PaymentBreakdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub success: bool,
    pub error: Option<String>,
    pub text: String,
    pub structured: FieldSet,
    pub standard_overview: StandardOverview,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub success: bool,
    pub error: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolVersions {
    pub pdftotext: Option<String>,
    pub tesseract: Option<String>,
    pub pdftoppm: Option<String>,
    pub pdftocairo: Option<String>,
    pub pdftohtml: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityReport {
    pub generated_at: String,
    pub tools: ToolVersions,
    pub vision_configured: bool,
    pub ocr_space_configured: bool,
}
