use serde_json::Value;

/// Strip backend-internal metadata that is not part of the public contract.
///
/// Removes `meta.createdAt` when present; any other shape passes through
/// unchanged. Idempotent: applying it twice yields the same result as once.
pub fn strip_internal_meta(mut resource: Value) -> Value {
    if let Some(meta) = resource.get_mut("meta").and_then(Value::as_object_mut) {
        meta.remove("createdAt");
    }
    resource
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_removes_created_at() {
        let resource = json!({
            "resourceType": "Patient",
            "id": "123",
            "meta": {
                "versionId": "1",
                "createdAt": "2024-01-01T00:00:00Z"
            }
        });

        let cleaned = strip_internal_meta(resource);
        assert!(cleaned["meta"].get("createdAt").is_none());
        assert_eq!(cleaned["meta"]["versionId"], "1");
        assert_eq!(cleaned["id"], "123");
    }

    #[test]
    fn test_payload_without_meta_unchanged() {
        let resource = json!({"resourceType": "Patient", "id": "123"});
        assert_eq!(strip_internal_meta(resource.clone()), resource);
    }

    #[test]
    fn test_payload_without_created_at_unchanged() {
        let resource = json!({
            "resourceType": "Patient",
            "meta": {"versionId": "1"}
        });
        assert_eq!(strip_internal_meta(resource.clone()), resource);
    }

    #[test]
    fn test_non_object_meta_unchanged() {
        let resource = json!({"resourceType": "Patient", "meta": "opaque"});
        assert_eq!(strip_internal_meta(resource.clone()), resource);
    }

    #[test]
    fn test_idempotent() {
        let resource = json!({
            "resourceType": "Patient",
            "meta": {"createdAt": "2024-01-01T00:00:00Z", "versionId": "2"}
        });

        let once = strip_internal_meta(resource);
        let twice = strip_internal_meta(once.clone());
        assert_eq!(once, twice);
    }
}
