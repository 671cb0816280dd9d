#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value as JsonValue};

/// Mirrors `serde_json::Value`'s shape so `arbitrary` can generate it, then
/// hands the built tree to `serde_json` for serialization into fuzzer input
/// text.
#[derive(Debug)]
struct ArbitraryValue(JsonValue);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let node_type = u.choose_index(21)?;
        let value = match node_type {
            0 => JsonValue::Null,
            1 => JsonValue::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                JsonValue::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3..=10 => JsonValue::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                JsonValue::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                JsonValue::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => return Err(arbitrary::Error::IncorrectFormat),
        };
        Ok(ArbitraryValue(value))
    }
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the lane: either feed raw (likely malformed) bytes
    // straight to the parser, or generate a structurally valid document and
    // check it round-trips.
    let (lane, rest) = data.split_at(1);

    if lane[0] & 1 == 0 {
        if let Ok(text) = core::str::from_utf8(rest) {
            // Must never panic, regardless of how malformed `text` is.
            let _ = minijson::parse(text);
        }
        return;
    }

    let Ok(ArbitraryValue(generated)) =
        ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(rest))
    else {
        return;
    };
    let Ok(text) = serde_json::to_string(&generated) else {
        return;
    };

    let parsed = minijson::parse(&text).unwrap_or_else(|e| {
        panic!("failed to parse a document serde_json itself produced: {e} in {text:?}")
    });

    let rendered = minijson::stringify(&parsed);
    let reparsed = minijson::parse(&rendered).expect("stringify output must itself parse");
    assert_eq!(parsed, reparsed, "stringify output did not round-trip");
});
