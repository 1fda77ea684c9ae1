use std::collections::BTreeMap;

use bytecraft::value::{Structure, Value};
use serde::Serialize;
use wasm_bindgen::JsValue;

#[derive(Serialize)]
#[serde(untagged)]
pub enum JsValueOut {
    U64(u64),
    I64(i64),
    Bytes(Vec<u8>),
    Array(Vec<JsValueOut>),
    Object(BTreeMap<String, JsValueOut>),
}

fn value_to_js(v: &Value) -> JsValueOut {
    match v {
        Value::U64(x) => JsValueOut::U64(*x),
        Value::I64(x) => JsValueOut::I64(*x),
        Value::Bytes(bytes) => JsValueOut::Bytes(bytes.clone()),
        Value::Struct(structure) => structure_to_out(structure),
        Value::Array(xs) => JsValueOut::Array(xs.iter().map(value_to_js).collect()),
    }
}

fn structure_to_out(structure: &Structure) -> JsValueOut {
    JsValueOut::Object(
        structure
            .fields()
            .map(|(name, value)| (name.to_string(), value_to_js(value)))
            .collect(),
    )
}

pub fn structure_to_js(structure: &Structure) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&structure_to_out(structure))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

pub fn error_to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
