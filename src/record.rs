use crate::level::Severity;
use serde::Serialize;
use std::collections::BTreeMap;

/// Normalized snapshot of one log event, serialized as the document body.
///
/// `service`, `version` and `host` are fixed when the hook is constructed;
/// everything else is derived fresh per event. A record is never mutated
/// after assembly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogRecord {
    pub service: String,
    pub version: String,
    pub host: String,
    pub file: String,
    pub func_name: String,
    pub line: u32,
    pub timestamp: String,
    pub message: String,
    pub level: Severity,
    pub data: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_document_field_names() {
        let record = LogRecord {
            service: "billing".to_string(),
            version: "1.4.2".to_string(),
            host: "web-1".to_string(),
            file: "checkout.rs".to_string(),
            func_name: "charge".to_string(),
            line: 88,
            timestamp: "2026-02-11T09:30:00.000000000Z".to_string(),
            message: "card declined".to_string(),
            level: Severity::Error,
            data: BTreeMap::from([("order".to_string(), serde_json::json!(1234))]),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Service"], "billing");
        assert_eq!(value["Version"], "1.4.2");
        assert_eq!(value["Host"], "web-1");
        assert_eq!(value["File"], "checkout.rs");
        assert_eq!(value["FuncName"], "charge");
        assert_eq!(value["Line"], 88);
        assert_eq!(value["Level"], "error");
        assert_eq!(value["Message"], "card declined");
        assert_eq!(value["Data"]["order"], 1234);
        assert_eq!(value.as_object().unwrap().len(), 10);
    }
}
