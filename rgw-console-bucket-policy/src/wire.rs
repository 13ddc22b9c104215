//! Serde helpers for the loosely typed parts of the policy document schema.
//!
//! Policy documents allow a single value wherever a list is expected
//! (`"Action": "s3:GetObject"`), so these helpers accept both shapes on read.
//! On write, lists are always emitted as arrays, except a provider with a
//! single principal id which is written as a plain string.
//!
//! Principals are read back grouped by provider and conditions sorted by
//! operator and key, the same order [`Statement`](crate::types::Statement)'s
//! builders keep them in.

use std::collections::BTreeMap;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize either a single `T` or an array of `T`.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| T::deserialize(item).map_err(de::Error::custom))
            .collect(),
        value => T::deserialize(value)
            .map(|one| vec![one])
            .map_err(de::Error::custom),
    }
}

fn string_list(value: Value, what: &str) -> Result<Vec<String>, String> {
    let scalar = |value: Value| match value {
        Value::String(text) => Ok(text),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(format!("{what} must be a string or a list of strings, got {other}")),
    };

    match value {
        Value::Array(items) => items.into_iter().map(scalar).collect(),
        value => scalar(value).map(|one| vec![one]),
    }
}

/// `"Principal": "*"` or `"Principal": {"<provider>": "<id>" | ["<id>", ...]}`
pub(crate) mod principal_format {
    use super::{string_list, BTreeMap, Value};
    use crate::types::{sort_principals, Principal};
    use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

    pub(crate) fn serialize<S>(principals: &[Principal], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if matches!(principals, [only] if only.is_everyone()) {
            return serializer.serialize_str(Principal::WILDCARD);
        }
        if principals.iter().any(Principal::is_everyone) {
            return Err(ser::Error::custom(
                "The wildcard principal \"*\" cannot be combined with other principals",
            ));
        }

        let mut by_provider: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for principal in principals {
            by_provider
                .entry(principal.provider.as_str())
                .or_default()
                .push(principal.id.as_str());
        }

        let document: BTreeMap<&str, Value> = by_provider
            .into_iter()
            .map(|(provider, ids)| {
                let ids = match ids.as_slice() {
                    [single] => Value::from(*single),
                    many => Value::from(many.to_vec()),
                };
                (provider, ids)
            })
            .collect();
        document.serialize(serializer)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Principal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(wildcard) if wildcard == Principal::WILDCARD => {
                Ok(vec![Principal::everyone()])
            }
            Value::Object(providers) => {
                let mut principals = Vec::new();
                for (provider, ids) in providers {
                    let ids = string_list(ids, "Principal id").map_err(de::Error::custom)?;
                    principals.extend(ids.into_iter().map(|id| Principal::new(&provider, id)));
                }
                Ok(sort_principals(principals))
            }
            other => Err(de::Error::custom(format!(
                "Principal must be \"*\" or a provider map, got {other}"
            ))),
        }
    }
}

/// `"Condition": {"<type>": {"<key>": "<value>" | ["<value>", ...]}}`
///
/// A document holds one value list per type and key, so two conditions sharing
/// a type and key cannot be written.
pub(crate) mod condition_format {
    use std::collections::btree_map::Entry;

    use super::{string_list, BTreeMap, Value};
    use crate::types::{sort_conditions, Condition};
    use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

    pub(crate) fn serialize<S>(conditions: &[Condition], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut document: BTreeMap<&str, BTreeMap<&str, &[String]>> = BTreeMap::new();
        for condition in conditions {
            let block = document
                .entry(condition.condition_type.as_str())
                .or_default();
            match block.entry(condition.condition_key.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(&condition.values);
                }
                Entry::Occupied(_) => {
                    return Err(ser::Error::custom(format!(
                        "Duplicate condition `{}` on key `{}`",
                        condition.condition_type, condition.condition_key
                    )));
                }
            }
        }
        document.serialize(serializer)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Condition>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let document = match Value::deserialize(deserializer)? {
            Value::Object(document) => document,
            other => {
                return Err(de::Error::custom(format!(
                    "Condition must be a map of condition operators, got {other}"
                )))
            }
        };

        let mut conditions = Vec::new();
        for (condition_type, block) in document {
            let Value::Object(block) = block else {
                return Err(de::Error::custom(format!(
                    "Condition operator `{condition_type}` must map condition keys to values"
                )));
            };
            for (condition_key, values) in block {
                let values = string_list(values, "Condition value").map_err(de::Error::custom)?;
                conditions.push(Condition::new(condition_type.as_str(), condition_key, values));
            }
        }
        Ok(sort_conditions(conditions))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::PolicyError;
    use crate::types::{Condition, Effect, Policy, Principal, S3Action, Statement};
    use serde_json::json;

    #[test]
    fn test_principals_grouped_by_provider() {
        let statement = Statement::new(Effect::Allow)
            .with_actions([S3Action::GetObject])
            .with_principals([
                Principal::user("a"),
                Principal::new("Service", "logging.s3.amazonaws.com"),
                Principal::user("b"),
            ]);
        let value = serde_json::to_value(statement).unwrap();
        assert_eq!(
            value["Principal"],
            json!({
                "AWS": ["arn:aws:iam:::user/a", "arn:aws:iam:::user/b"],
                "Service": "logging.s3.amazonaws.com"
            })
        );
    }

    #[test]
    fn test_principals_read_back_in_builder_order() {
        let statement = Statement::new(Effect::Allow)
            .with_actions([S3Action::GetObject])
            .with_principals([
                Principal::new("Service", "s"),
                Principal::user("a"),
            ]);
        assert_eq!(
            statement.principals,
            vec![Principal::user("a"), Principal::new("Service", "s")]
        );

        let policy = Policy::new("p").with_statement(statement);
        let parsed = Policy::from_json(&policy.to_json().unwrap()).unwrap();
        assert_eq!(parsed, policy);
    }

    #[test]
    fn test_wildcard_principal_must_stand_alone() {
        let statement = Statement::new(Effect::Allow)
            .with_actions([S3Action::GetObject])
            .with_principals([Principal::everyone(), Principal::user("a")]);
        let err = Policy::new("p").with_statement(statement).to_json().unwrap_err();
        assert!(matches!(err, PolicyError::MalformedPolicy(message) if message.contains("wildcard")));
    }

    #[test]
    fn test_conditions_sharing_type_and_key_are_rejected() {
        // Two IpAddress conditions on one key must both hold; one merged list
        // would let either range through.
        let statement = Statement::new(Effect::Allow)
            .with_actions([S3Action::GetObject])
            .with_conditions([
                Condition::source_ip("10.0.0.0/8"),
                Condition::source_ip("10.1.0.0/16"),
            ]);
        let err = Policy::new("p").with_statement(statement).to_json().unwrap_err();
        match err {
            PolicyError::MalformedPolicy(message) => {
                assert!(message.contains("Duplicate condition `IpAddress` on key `aws:SourceIp`"));
            }
            other => panic!("Expected MalformedPolicy, got {other:?}"),
        }
    }

    #[test]
    fn test_conditions_read_back_in_builder_order() {
        let statement = Statement::new(Effect::Allow)
            .with_actions([S3Action::GetObject])
            .with_conditions([
                Condition::source_ip("10.0.0.1"),
                Condition::new("Bool", "aws:SecureTransport", ["true"]),
                Condition::new("IpAddress", "aws:VpcSourceIp", ["10.2.0.0/16"]),
            ]);
        let keys: Vec<_> = statement
            .conditions
            .iter()
            .map(|c| (c.condition_type.as_str(), c.condition_key.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Bool", "aws:SecureTransport"),
                ("IpAddress", "aws:SourceIp"),
                ("IpAddress", "aws:VpcSourceIp"),
            ]
        );

        let policy = Policy::new("p").with_statement(statement);
        let parsed = Policy::from_json(&policy.to_json().unwrap()).unwrap();
        assert_eq!(parsed, policy);
    }

    #[test]
    fn test_condition_block_must_be_object() {
        let text = r#"{"Statement":[{"Effect":"Allow","Action":"s3:GetObject","Condition":{"IpAddress":"10.0.0.1"}}]}"#;
        assert!(Policy::from_json(text).is_err());
    }

    #[test]
    fn test_nested_condition_values_rejected() {
        let text = r#"{"Statement":[{"Effect":"Allow","Action":"s3:GetObject","Condition":{"IpAddress":{"aws:SourceIp":[["10.0.0.1"]]}}}]}"#;
        assert!(Policy::from_json(text).is_err());
    }
}
