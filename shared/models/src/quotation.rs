//! Quotation draft models persisted by the draft store.
//!
//! Wire format is camelCase to match what the portal front end sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SalesStatus {
    #[default]
    Pending,
    Negotiating,
    Won,
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub project_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct QuotationItem {
    pub product_code: String,
    pub description: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub quantity: f64,
    pub unit_price: f64,
}

impl QuotationItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Full draft record, stored under its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct QuotationDraft {
    pub id: String,
    pub status: QuotationStatus,
    pub customer_info: CustomerInfo,
    pub items: Vec<QuotationItem>,
    pub additional_info: serde_json::Value,
    pub sales_status: SalesStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Index entry kept in the side list for list screens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuotationSummary {
    pub id: String,
    pub customer_name: String,
    pub date: String,
    pub items: usize,
    pub status: QuotationStatus,
    pub sales_status: SalesStatus,
    pub total: f64,
}

impl QuotationDraft {
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("QT-{}-{}", now.format("%Y%m%d"), suffix[..8].to_uppercase())
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(QuotationItem::line_total).sum()
    }

    /// Assigns an id when missing and stamps timestamps.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        if self.id.trim().is_empty() {
            self.id = Self::generate_id(now);
        }
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
    }

    pub fn summary(&self) -> QuotationSummary {
        let customer_name = if self.customer_info.name.is_empty() {
            self.customer_info.company.clone()
        } else {
            self.customer_info.name.clone()
        };

        QuotationSummary {
            id: self.id.clone(),
            customer_name,
            date: self
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            items: self.items.len(),
            status: self.status,
            sales_status: self.sales_status,
            total: self.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(quantity: f64, unit_price: f64) -> QuotationItem {
        QuotationItem {
            product_code: "APW330-SL".to_string(),
            quantity,
            unit_price,
            ..QuotationItem::default()
        }
    }

    #[test]
    fn test_stamp_assigns_id_once() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        let mut draft = QuotationDraft::default();
        draft.stamp(now);
        assert!(draft.id.starts_with("QT-20240305-"));
        assert_eq!(draft.created_at, Some(now));

        let id = draft.id.clone();
        let later = now + chrono::Duration::hours(1);
        draft.stamp(later);
        assert_eq!(draft.id, id);
        assert_eq!(draft.created_at, Some(now));
        assert_eq!(draft.updated_at, Some(later));
    }

    #[test]
    fn test_summary_totals_items() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        let mut draft = QuotationDraft {
            customer_info: CustomerInfo {
                company: "Sunrise Homes".to_string(),
                ..CustomerInfo::default()
            },
            items: vec![item(2.0, 1500.0), item(1.0, 250.5)],
            ..QuotationDraft::default()
        };
        draft.stamp(now);

        let summary = draft.summary();
        assert_eq!(summary.customer_name, "Sunrise Homes");
        assert_eq!(summary.items, 2);
        assert_eq!(summary.total, 3250.5);
        assert_eq!(summary.date, "2024-03-05");
    }

    #[test]
    fn test_partial_payload_deserializes() {
        let draft: QuotationDraft = serde_json::from_str(
            r#"{"customerInfo":{"name":"Aiko"},"items":[{"productCode":"X1","quantity":3,"unitPrice":10}],"salesStatus":"negotiating"}"#,
        )
        .unwrap();
        assert_eq!(draft.customer_info.name, "Aiko");
        assert_eq!(draft.sales_status, SalesStatus::Negotiating);
        assert_eq!(draft.status, QuotationStatus::Draft);
        assert_eq!(draft.total(), 30.0);
    }
}
