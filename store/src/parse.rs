use anyhow::{Result, anyhow};
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

pub fn parse_string_field(item: &HashMap<String, AttributeValue>, field: &str) -> Result<String> {
    match item.get(field) {
        Some(AttributeValue::S(s)) => Ok(s.clone()),
        Some(AttributeValue::N(n)) => Ok(n.clone()),
        _ => Err(anyhow!("Missing or invalid '{}' field", field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_string_field_yields_value() {
        let expected = "Green".to_string();
        let item = HashMap::from([("value".to_string(), AttributeValue::S(expected.clone()))]);
        assert_eq!(parse_string_field(&item, "value").unwrap(), expected);
    }

    #[test]
    fn parse_string_field_rejects_missing_field() {
        let item: HashMap<String, AttributeValue> = HashMap::new();
        let err = parse_string_field(&item, "value").unwrap_err();
        assert!(err.to_string().contains("'value'"));
    }

    #[test]
    fn parse_string_field_rejects_wrong_type() {
        let item = HashMap::from([("value".to_string(), AttributeValue::Bool(true))]);
        assert!(parse_string_field(&item, "value").is_err());
    }
}
