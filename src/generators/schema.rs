//! Schema-document generators
//!
//! OpenAPI component schemas (target family) and JSON Schema
//! documents (spec-format family), derived from the same manifest
//! shape as the SDK generators.

use crate::error::{SpecforgeError, SpecforgeResult};
use crate::generator::{GeneratedFile, Generator};
use crate::router::Family;
use crate::spec::SpecDocument;
use async_trait::async_trait;
use serde_json::json;

fn schema_type(spec_type: &str) -> (&'static str, Option<&'static str>) {
    match spec_type {
        "int" => ("integer", None),
        "float" => ("number", None),
        "bool" => ("boolean", None),
        "uuid" => ("string", Some("uuid")),
        "timestamp" => ("string", Some("date-time")),
        _ => ("string", None),
    }
}

fn properties_of(spec: &SpecDocument, generator: &str) -> SpecforgeResult<serde_json::Value> {
    let mut properties = serde_json::Map::new();

    if let Some(fields) = spec.manifest.get("fields") {
        let map = fields
            .as_object()
            .ok_or_else(|| SpecforgeError::GeneratorFailed {
                name: generator.to_string(),
                spec: spec.name.clone(),
                reason: "'fields' must be an object of name → type".to_string(),
            })?;

        let mut names: Vec<&String> = map.keys().collect();
        names.sort();
        for name in names {
            let spec_type = map[name].as_str().unwrap_or("string");
            let (ty, format) = schema_type(spec_type);
            let mut prop = serde_json::Map::new();
            prop.insert("type".to_string(), json!(ty));
            if let Some(f) = format {
                prop.insert("format".to_string(), json!(f));
            }
            properties.insert(name.clone(), serde_json::Value::Object(prop));
        }
    }

    Ok(serde_json::Value::Object(properties))
}

/// OpenAPI 3.1 component-schema document, one per spec
pub struct OpenApiGenerator;

#[async_trait]
impl Generator for OpenApiGenerator {
    fn name(&self) -> &str {
        "openapi"
    }

    fn family(&self) -> Family {
        Family::Target
    }

    async fn generate(&self, spec: &SpecDocument) -> SpecforgeResult<Vec<GeneratedFile>> {
        let entity = spec
            .manifest
            .get("entity")
            .and_then(|v| v.as_str())
            .unwrap_or(&spec.name);

        let document = json!({
            "openapi": "3.1.0",
            "info": {
                "title": format!("{} schema", entity),
                "version": "1.0.0",
            },
            "components": {
                "schemas": {
                    entity: {
                        "type": "object",
                        "description": spec.manifest.get("description").cloned()
                            .unwrap_or(json!(format!("{} entity", entity))),
                        "properties": properties_of(spec, "openapi")?,
                    }
                }
            }
        });

        Ok(vec![GeneratedFile {
            path: format!("openapi/{}.json", spec.name),
            content: serde_json::to_string_pretty(&document)? + "\n",
        }])
    }
}

/// Draft 2020-12 JSON Schema document, one per spec
pub struct JsonSchemaGenerator;

#[async_trait]
impl Generator for JsonSchemaGenerator {
    fn name(&self) -> &str {
        "jsonschema"
    }

    fn family(&self) -> Family {
        Family::SpecFormat
    }

    async fn generate(&self, spec: &SpecDocument) -> SpecforgeResult<Vec<GeneratedFile>> {
        let document = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$id": format!("urn:specforge:{}", spec.name),
            "type": "object",
            "properties": properties_of(spec, "jsonschema")?,
        });

        Ok(vec![GeneratedFile {
            path: format!("specs/jsonschema/{}.schema.json", spec.name),
            content: serde_json::to_string_pretty(&document)? + "\n",
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn user_spec() -> SpecDocument {
        SpecDocument::parse(
            "user",
            Path::new("user.json"),
            r#"{"entity": "User", "fields": {"id": "uuid", "created": "timestamp", "age": "int"}}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn openapi_document_shape() {
        let files = OpenApiGenerator.generate(&user_spec()).await.unwrap();
        assert_eq!(files[0].path, "openapi/user.json");

        let doc: serde_json::Value = serde_json::from_str(&files[0].content).unwrap();
        assert_eq!(doc["openapi"], "3.1.0");
        let props = &doc["components"]["schemas"]["User"]["properties"];
        assert_eq!(props["id"]["format"], "uuid");
        assert_eq!(props["created"]["format"], "date-time");
        assert_eq!(props["age"]["type"], "integer");
    }

    #[tokio::test]
    async fn jsonschema_document_shape() {
        let files = JsonSchemaGenerator.generate(&user_spec()).await.unwrap();
        assert_eq!(files[0].path, "specs/jsonschema/user.schema.json");

        let doc: serde_json::Value = serde_json::from_str(&files[0].content).unwrap();
        assert_eq!(doc["$id"], "urn:specforge:user");
        assert_eq!(doc["properties"]["age"]["type"], "integer");
    }

    #[tokio::test]
    async fn bad_fields_fail() {
        let spec = SpecDocument::parse("bad", Path::new("bad.json"), r#"{"fields": 3}"#).unwrap();
        assert!(OpenApiGenerator.generate(&spec).await.is_err());
    }
}
