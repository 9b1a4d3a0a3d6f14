//! SDK binding generators
//!
//! Emit typed bindings for a spec's entity and fields. The manifest
//! shape consumed here:
//!
//! ```json
//! {
//!   "entity": "User",
//!   "description": "A registered user",
//!   "fields": { "id": "uuid", "name": "string", "age": "int" }
//! }
//! ```

use crate::error::{SpecforgeError, SpecforgeResult};
use crate::generator::{GeneratedFile, Generator};
use crate::router::Family;
use crate::spec::SpecDocument;
use async_trait::async_trait;

/// Field list extracted from a spec manifest, sorted by name
fn fields_of(spec: &SpecDocument) -> SpecforgeResult<Vec<(String, String)>> {
    let Some(fields) = spec.manifest.get("fields") else {
        return Ok(vec![]);
    };
    let map = fields
        .as_object()
        .ok_or_else(|| SpecforgeError::GeneratorFailed {
            name: "sdk".to_string(),
            spec: spec.name.clone(),
            reason: "'fields' must be an object of name → type".to_string(),
        })?;

    let mut out: Vec<(String, String)> = map
        .iter()
        .map(|(k, v)| (k.clone(), v.as_str().unwrap_or("string").to_string()))
        .collect();
    out.sort();
    Ok(out)
}

fn entity_of(spec: &SpecDocument) -> String {
    spec.manifest
        .get("entity")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let mut chars = spec.name.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => spec.name.clone(),
            }
        })
}

/// Rust type bindings: one module per spec
pub struct RustSdkGenerator;

fn rust_type(spec_type: &str) -> &'static str {
    match spec_type {
        "int" => "i64",
        "float" => "f64",
        "bool" => "bool",
        "timestamp" => "chrono::DateTime<chrono::Utc>",
        // uuid, string, and anything unrecognized stay as strings
        _ => "String",
    }
}

#[async_trait]
impl Generator for RustSdkGenerator {
    fn name(&self) -> &str {
        "rust"
    }

    fn family(&self) -> Family {
        Family::Sdk
    }

    async fn generate(&self, spec: &SpecDocument) -> SpecforgeResult<Vec<GeneratedFile>> {
        let entity = entity_of(spec);
        let fields = fields_of(spec)?;

        let mut body = String::new();
        if let Some(description) = spec.manifest.get("description").and_then(|v| v.as_str()) {
            body.push_str(&format!("/// {}\n", description));
        }
        body.push_str("#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]\n");
        body.push_str(&format!("pub struct {} {{\n", entity));
        for (name, spec_type) in &fields {
            body.push_str(&format!("    pub {}: {},\n", name, rust_type(spec_type)));
        }
        body.push_str("}\n");

        Ok(vec![GeneratedFile {
            path: format!("sdk/rust/{}/mod.rs", spec.name),
            content: body,
        }])
    }
}

/// TypeScript type bindings: one module per spec
pub struct TypeScriptSdkGenerator;

fn ts_type(spec_type: &str) -> &'static str {
    match spec_type {
        "int" | "float" => "number",
        "bool" => "boolean",
        _ => "string",
    }
}

#[async_trait]
impl Generator for TypeScriptSdkGenerator {
    fn name(&self) -> &str {
        "typescript"
    }

    fn family(&self) -> Family {
        Family::Sdk
    }

    async fn generate(&self, spec: &SpecDocument) -> SpecforgeResult<Vec<GeneratedFile>> {
        let entity = entity_of(spec);
        let fields = fields_of(spec)?;

        let mut body = String::new();
        if let Some(description) = spec.manifest.get("description").and_then(|v| v.as_str()) {
            body.push_str(&format!("/** {} */\n", description));
        }
        body.push_str(&format!("export interface {} {{\n", entity));
        for (name, spec_type) in &fields {
            body.push_str(&format!("  {}: {};\n", name, ts_type(spec_type)));
        }
        body.push_str("}\n");

        Ok(vec![GeneratedFile {
            path: format!("sdk/typescript/{}.ts", spec.name),
            content: body,
        }])
    }
}
