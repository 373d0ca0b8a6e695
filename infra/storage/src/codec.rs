use crate::error::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;

const INDENT: &[u8] = b"\t";

/// Pretty JSON, one tab per nesting level.
pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut ser)
        .map_err(|source| StoreError::SerializationFailed { source, context: None })?;
    Ok(buf)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8], path: &Path) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::DecodeFailed {
        path: path.to_path_buf(),
        source,
        context: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Fish {
        #[serde(rename = "type")]
        kind: String,
        fins: Vec<u8>,
    }

    #[test]
    fn test_encode_uses_tabs() {
        let fish = Fish { kind: "red".to_owned(), fins: vec![1] };
        let text = String::from_utf8(encode(&fish).unwrap()).unwrap();
        assert_eq!(text, "{\n\t\"type\": \"red\",\n\t\"fins\": [\n\t\t1\n\t]\n}");
    }

    #[test]
    fn test_decode_accepts_encoded_form() {
        let fish = Fish { kind: "blue".to_owned(), fins: vec![2, 3] };
        let bytes = encode(&fish).unwrap();
        assert_eq!(decode::<Fish>(&bytes, Path::new("fish/0")).unwrap(), fish);
    }

    #[test]
    fn test_non_string_map_keys_fail_to_serialize() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1);
        assert!(matches!(encode(&map), Err(StoreError::SerializationFailed { .. })));
    }

    #[test]
    fn test_decode_reports_path() {
        let err = decode::<Fish>(b"{\"type\": 1}", Path::new("fish/bad")).unwrap_err();
        match err {
            StoreError::DecodeFailed { path, .. } => assert_eq!(path, Path::new("fish/bad")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
