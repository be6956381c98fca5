use serde::{Deserialize, Serialize};

// ============================================================================
// CFDI CREATION PAYLOAD
// ============================================================================
//
// Field names follow the Facturama wire format (PascalCase). No business
// validation happens here; the upstream API is the authority on tax rules.

/// Invoice sent to `POST /3/cfdis`. Covers both regular and global invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfdiRequest {
    pub cfdi_type: String,
    pub payment_form: String,
    pub payment_method: String,
    pub expedition_place: String,
    /// Only present on global invoices (consolidated sales to the general public).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_information: Option<GlobalInformation>,
    pub receiver: Receiver,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalInformation {
    pub periodicity: String, // "04" = mensual
    pub months: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Receiver {
    pub rfc: String,
    pub cfdi_use: String,
    pub name: String,
    pub fiscal_regime: String,
    pub tax_zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub product_code: String,
    pub description: String,
    pub unit_code: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub subtotal: f64,
    pub tax_object: String,
    pub taxes: Vec<Tax>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tax {
    pub name: String,
    pub rate: f64,
    pub base: f64,
    pub total: f64,
    pub is_retention: bool,
    pub is_federal_tax: bool,
}
