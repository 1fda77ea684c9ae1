//! WASM bindings for the `bytecraft` structure engine.
//!
//! This crate exposes a compact API to JavaScript for decoding fixed-layout
//! binary structures described in JSON, and for inspecting PE headers.
//!
//! At a high level you:
//! - **Describe your structures** in JSON using the shape in
//!   `bytecraft::serde::SchemaDefs` (structure names, fields, scalar kinds,
//!   nested structures, array lengths, byte runs).
//! - **Compile** the document once, picking the structure to decode.
//! - **Decode** or **render** binary payloads many times from JavaScript.
//!
//! ```text
//! // Pseudo TypeScript example
//! //
//! // const schemaJson = JSON.stringify({
//! //   structures: [
//! //     { name: "DIR", fields: [
//! //         { name: "virtual_address", kind: "Dword" },
//! //         { name: "size", kind: "Dword" } ] }
//! //   ]
//! // });
//! //
//! // const dir = new WasmSchema(schemaJson, "DIR");
//! // const result = dir.decode(someUint8Array);
//! // // result is a JS object: { size: 16, virtual_address: 4096 }
//! ```
//!
//! Errors are converted to `JsValue` strings holding the error message.

mod convert;

use std::sync::Arc;

use bytecraft::{registry::Registry, render::render, schema::Schema};
use bytecraft_pe::PeImage;
use wasm_bindgen::prelude::*;

/// Compiled structure schema that can be used from JavaScript to decode binary data.
#[wasm_bindgen]
pub struct WasmSchema {
    schema: Arc<Schema>,
}

#[wasm_bindgen]
impl WasmSchema {
    /// Compiles every structure in `schema_json` and selects `structure` for decoding.
    #[wasm_bindgen(constructor)]
    pub fn new(schema_json: &str, structure: &str) -> Result<WasmSchema, JsValue> {
        let registry = Registry::from_json(schema_json).map_err(convert::error_to_js)?;
        let schema = registry
            .get(structure)
            .ok_or_else(|| JsValue::from_str(&format!("unknown structure `{structure}`")))?;
        Ok(WasmSchema { schema })
    }

    /// Exact payload length in bytes.
    pub fn size(&self) -> usize {
        self.schema.size()
    }

    pub fn format(&self) -> String {
        self.schema.format().to_string()
    }

    /// Decodes `data` into a JavaScript object keyed by field name.
    pub fn decode(&self, data: &[u8]) -> Result<JsValue, JsValue> {
        let structure = Schema::decode(&self.schema, data).map_err(convert::error_to_js)?;
        convert::structure_to_js(&structure)
    }

    /// Decodes `data` and returns the aligned text form.
    pub fn render(&self, data: &[u8]) -> Result<String, JsValue> {
        let structure = Schema::decode(&self.schema, data).map_err(convert::error_to_js)?;
        Ok(render(&structure, ""))
    }
}

/// Decodes the headers of a PE image and returns the text report.
#[wasm_bindgen]
pub fn parse_pe(data: &[u8]) -> Result<String, JsValue> {
    let image = PeImage::parse(data.to_vec()).map_err(convert::error_to_js)?;
    Ok(image.render())
}

/// Splits `value` into bit groups, most significant group first.
#[wasm_bindgen]
pub fn extract_bits(value: u64, groups: Vec<u32>) -> Vec<u64> {
    bytecraft::bits::extract(value, &groups)
}
