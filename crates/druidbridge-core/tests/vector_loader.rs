//! JSON test vector loader shared by batch tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TestVector {
    pub description: String,
    pub body: BodyData,
    #[serde(default)]
    pub expect: Option<serde_json::Value>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct BodyData {
    pub encoding: String,
    pub data: serde_json::Value,
}

impl BodyData {
    pub fn bytes(&self) -> Vec<u8> {
        match self.encoding.as_str() {
            "json" => serde_json::to_vec(&self.data).expect("vector data must serialize"),
            "raw" => self
                .data
                .as_str()
                .expect("raw vector data must be a string")
                .as_bytes()
                .to_vec(),
            other => panic!("unsupported encoding: {other}"),
        }
    }
}
