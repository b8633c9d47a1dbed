//! Envelope payload construction.
//!
//! One submission job carries one envelope body. An `update` of a tenant's
//! batch needs three bodies (product data, pricing, inventory availability),
//! a `delete` needs one. Message ids are 1-based and follow input order; the
//! poller and the logs correlate on that ordering.

use serde::{Deserialize, Serialize};

use marketfeed_inventory::InventoryRecord;

use crate::condition::map_condition;
use crate::job::FeedKind;
use crate::FeedError;

const DOCUMENT_VERSION: &str = "1.01";

/// What the caller wants done with the batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedOperation {
    Update,
    Delete,
}

/// One ready-to-submit envelope body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPayload {
    pub kind: FeedKind,
    pub body: Vec<u8>,
}

/// Build the payload set for one tenant batch.
///
/// `update` yields exactly three payloads in submission order (product,
/// price, inventory); `delete` yields one. Fails without producing anything
/// if any record carries an unmappable condition or a non-numeric
/// quantity/handling time.
pub fn build_feeds(
    operation: FeedOperation,
    seller_id: &str,
    records: &[InventoryRecord],
) -> Result<Vec<FeedPayload>, FeedError> {
    match operation {
        FeedOperation::Update => Ok(vec![
            FeedPayload {
                kind: FeedKind::ProductData,
                body: product_body(seller_id, records)?,
            },
            FeedPayload {
                kind: FeedKind::Pricing,
                body: price_body(seller_id, records),
            },
            FeedPayload {
                kind: FeedKind::InventoryAvailability,
                body: inventory_body(seller_id, records)?,
            },
        ]),
        FeedOperation::Delete => Ok(vec![FeedPayload {
            kind: FeedKind::ProductDelete,
            body: delete_body(seller_id, records),
        }]),
    }
}

/// "Parse as float, then truncate": the coercion the upstream rows rely on
/// for quantity/handling values like "4.0".
fn to_whole_number(field: &'static str, value: &str) -> Result<i64, FeedError> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| FeedError::InvalidNumber {
            field,
            value: value.to_string(),
        })?;
    Ok(parsed as i64)
}

fn envelope(seller_id: &str, message_type: &str, messages: &str) -> Vec<u8> {
    let mut body = String::new();
    body.push_str(r#"<?xml version="1.0" ?>"#);
    body.push_str(
        r#"<AmazonEnvelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="amznenvelope.xsd">"#,
    );
    body.push_str("<Header>");
    body.push_str(&format!("<DocumentVersion>{DOCUMENT_VERSION}</DocumentVersion>"));
    body.push_str(&format!("<MerchantIdentifier>{seller_id}</MerchantIdentifier>"));
    body.push_str("</Header>");
    body.push_str(&format!("<MessageType>{message_type}</MessageType>"));
    if message_type == "Product" {
        body.push_str("<PurgeAndReplace>false</PurgeAndReplace>");
    }
    body.push_str(messages);
    body.push_str("</AmazonEnvelope>");
    body.into_bytes()
}

fn product_body(seller_id: &str, records: &[InventoryRecord]) -> Result<Vec<u8>, FeedError> {
    let mut messages = String::new();
    for (index, record) in records.iter().enumerate() {
        let condition = map_condition(&record.condition)?;
        messages.push_str(&format!(
            "<Message><MessageID>{id}</MessageID><Product>\
             <SKU>{sku}</SKU>\
             <StandardProductID><Type>UPC</Type><Value>{upc}</Value></StandardProductID>\
             <Condition><ConditionType>{condition}</ConditionType></Condition>\
             </Product></Message>",
            id = index + 1,
            sku = record.sku,
            upc = record.upc,
        ));
    }
    Ok(envelope(seller_id, "Product", &messages))
}

fn price_body(seller_id: &str, records: &[InventoryRecord]) -> Vec<u8> {
    let mut messages = String::new();
    for (index, record) in records.iter().enumerate() {
        messages.push_str(&format!(
            "<Message><MessageID>{id}</MessageID><Price>\
             <SKU>{sku}</SKU>\
             <StandardPrice currency=\"USD\">{price}</StandardPrice>\
             </Price></Message>",
            id = index + 1,
            sku = record.sku,
            price = record.standard_price,
        ));
    }
    envelope(seller_id, "Price", &messages)
}

fn inventory_body(seller_id: &str, records: &[InventoryRecord]) -> Result<Vec<u8>, FeedError> {
    let mut messages = String::new();
    for (index, record) in records.iter().enumerate() {
        let quantity = to_whole_number("quantity", &record.quantity)?;
        let handling = to_whole_number("handling_time", &record.handling_time)?;
        messages.push_str(&format!(
            "<Message><MessageID>{id}</MessageID><OperationType>Update</OperationType><Inventory>\
             <SKU>{sku}</SKU>\
             <Quantity>{quantity}</Quantity>\
             <FulfillmentLatency>{handling}</FulfillmentLatency>\
             </Inventory></Message>",
            id = index + 1,
            sku = record.sku,
        ));
    }
    Ok(envelope(seller_id, "Inventory", &messages))
}

fn delete_body(seller_id: &str, records: &[InventoryRecord]) -> Vec<u8> {
    let mut messages = String::new();
    for (index, record) in records.iter().enumerate() {
        messages.push_str(&format!(
            "<Message><MessageID>{id}</MessageID><OperationType>Delete</OperationType><Product>\
             <SKU>{sku}</SKU>\
             </Product></Message>",
            id = index + 1,
            sku = record.sku,
        ));
    }
    envelope(seller_id, "Product", &messages)
}
