use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// LISTING FILTERS
// ============================================================================

/// Filters accepted by `GET /api/cfdi`. Every value is forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfdiListQuery {
    pub folio_start: Option<String>,
    pub folio_end: Option<String>,
    pub rfc: Option<String>,
    pub tax_entity_name: Option<String>,
    /// dd/mm/yyyy
    pub date_start: Option<String>,
    /// dd/mm/yyyy
    pub date_end: Option<String>,
    pub status: Option<String>,
    pub order_number: Option<String>,
    pub page: Option<String>,
}

impl CfdiListQuery {
    /// Builds the filters from raw query pairs. A repeated key keeps its
    /// first value.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            folio_start: first_value(pairs, "folioStart"),
            folio_end: first_value(pairs, "folioEnd"),
            rfc: first_value(pairs, "rfc"),
            tax_entity_name: first_value(pairs, "taxEntityName"),
            date_start: first_value(pairs, "dateStart"),
            date_end: first_value(pairs, "dateEnd"),
            status: first_value(pairs, "status"),
            order_number: first_value(pairs, "orderNumber"),
            page: first_value(pairs, "page"),
        }
    }

    /// Upstream query string (without the leading `?`). Always starts with
    /// `type=issued`; empty filters are skipped and the order is fixed.
    pub fn upstream_query(&self) -> String {
        let filters = [
            ("folioStart", &self.folio_start),
            ("folioEnd", &self.folio_end),
            ("rfc", &self.rfc),
            ("taxEntityName", &self.tax_entity_name),
            ("dateStart", &self.date_start),
            ("dateEnd", &self.date_end),
            ("status", &self.status),
            ("orderNumber", &self.order_number),
            ("page", &self.page),
        ];

        let mut query = String::from("type=issued");
        for (key, value) in filters {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push('&');
                query.push_str(key);
                query.push('=');
                query.push_str(&urlencoding::encode(value));
            }
        }
        query
    }
}

// ============================================================================
// FILE DOWNLOAD
// ============================================================================

/// Raw query for `GET /api/cfdi/:id/download`. Both fields are checked by the
/// handler so that bad values come back as `{"error": ...}` bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadQuery {
    pub format: Option<String>,
    #[serde(rename = "type")]
    pub cfdi_type: Option<String>,
}

impl DownloadQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            format: first_value(pairs, "format"),
            cfdi_type: first_value(pairs, "type"),
        }
    }
}

fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

/// Ids end up inside `filename="..."`, so quotes, backslashes and control
/// characters are refused.
pub fn is_valid_file_id(id: &str) -> bool {
    !id.is_empty() && !id.chars().any(|c| c == '"' || c == '\\' || c.is_control())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xml,
    Pdf,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Xml => "xml",
            FileFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            FileFormat::Xml => "application/xml",
            FileFormat::Pdf => "application/pdf",
        }
    }

    pub fn attachment_header(&self, id: &str) -> String {
        format!("attachment; filename=\"{}.{}\"", id, self.as_str())
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFileFormat(pub String);

impl FromStr for FileFormat {
    type Err = InvalidFileFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xml" => Ok(FileFormat::Xml),
            "pdf" => Ok(FileFormat::Pdf),
            other => Err(InvalidFileFormat(other.to_string())),
        }
    }
}

/// JSON wrapper Facturama uses for file downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileEnvelope {
    #[serde(default)]
    pub content_encoding: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_length: Option<u64>,
    /// base64
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_only_send_type() {
        assert_eq!(CfdiListQuery::default().upstream_query(), "type=issued");
    }

    #[test]
    fn filters_keep_fixed_order() {
        let query = CfdiListQuery {
            rfc: Some("ABC123".into()),
            folio_start: Some("10".into()),
            ..Default::default()
        };
        assert_eq!(query.upstream_query(), "type=issued&folioStart=10&rfc=ABC123");

        let query = CfdiListQuery {
            page: Some("2".into()),
            order_number: Some("true".into()),
            status: Some("active".into()),
            date_end: Some("31/07/2025".into()),
            date_start: Some("01/07/2025".into()),
            tax_entity_name: Some("PUBLICO EN GENERAL".into()),
            folio_end: Some("20".into()),
            ..Default::default()
        };
        assert_eq!(
            query.upstream_query(),
            "type=issued&folioEnd=20&taxEntityName=PUBLICO%20EN%20GENERAL\
             &dateStart=01%2F07%2F2025&dateEnd=31%2F07%2F2025&status=active&orderNumber=true&page=2"
        );
    }

    #[test]
    fn empty_values_are_skipped() {
        let query = CfdiListQuery {
            rfc: Some(String::new()),
            page: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(query.upstream_query(), "type=issued&page=1");
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn repeated_keys_keep_first_value() {
        let query = CfdiListQuery::from_pairs(&pairs(&[
            ("rfc", "A"),
            ("folioStart", "10"),
            ("rfc", "B"),
            ("type", "received"),
        ]));
        assert_eq!(query.rfc.as_deref(), Some("A"));
        assert_eq!(query.upstream_query(), "type=issued&folioStart=10&rfc=A");

        let download = DownloadQuery::from_pairs(&pairs(&[
            ("format", "xml"),
            ("format", "pdf"),
            ("type", "issued"),
        ]));
        assert_eq!(download.format.as_deref(), Some("xml"));
        assert_eq!(download.cfdi_type.as_deref(), Some("issued"));
    }

    #[test]
    fn file_ids_with_header_breaking_characters_are_invalid() {
        assert!(is_valid_file_id("42"));
        assert!(is_valid_file_id("Jc9N2cU1K1F5vPzWvXq2Gw2"));
        assert!(!is_valid_file_id(""));
        assert!(!is_valid_file_id("a\"b"));
        assert!(!is_valid_file_id("a\\b"));
        assert!(!is_valid_file_id("a\nb"));
        assert!(!is_valid_file_id("a\u{7f}b"));
    }

    #[test]
    fn query_deserializes_camel_case_names() {
        let query: CfdiListQuery =
            serde_json::from_value(serde_json::json!({"folioStart": "10", "taxEntityName": "X"})).unwrap();
        assert_eq!(query.folio_start.as_deref(), Some("10"));
        assert_eq!(query.tax_entity_name.as_deref(), Some("X"));
    }

    #[test]
    fn file_format_parsing_and_headers() {
        assert_eq!("xml".parse::<FileFormat>(), Ok(FileFormat::Xml));
        assert_eq!("pdf".parse::<FileFormat>(), Ok(FileFormat::Pdf));
        assert!("gif".parse::<FileFormat>().is_err());
        assert!("PDF".parse::<FileFormat>().is_err());

        assert_eq!(FileFormat::Pdf.content_type(), "application/pdf");
        assert_eq!(FileFormat::Xml.attachment_header("42"), "attachment; filename=\"42.xml\"");
    }

    #[test]
    fn envelope_only_requires_content() {
        let envelope: FileEnvelope = serde_json::from_str(r#"{"Content":"PDFtZXNzYWdl"}"#).unwrap();
        assert_eq!(envelope.content, "PDFtZXNzYWdl");
        assert!(envelope.content_type.is_none());

        let full: FileEnvelope = serde_json::from_str(
            r#"{"ContentEncoding":"base64","ContentType":"pdf","ContentLength":9,"Content":"PDFtZXNzYWdl"}"#,
        )
        .unwrap();
        assert_eq!(full.content_length, Some(9));
    }
}
