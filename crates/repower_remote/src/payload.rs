//! Wire format for the record import API.

use repower_core::EavTuple;
use serde::Serialize;

/// One tuple as the import API expects it in EAV mode.
///
/// The project is implied by the API token, so it is not sent.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WireTuple<'a> {
    /// Record id.
    pub record: &'a str,
    /// Unique event name; omitted for classic projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redcap_event_name: Option<&'a str>,
    /// Storage field name.
    pub field_name: &'a str,
    /// Value.
    pub value: &'a str,
}

impl<'a> From<&'a EavTuple> for WireTuple<'a> {
    fn from(tuple: &'a EavTuple) -> Self {
        Self {
            record: &tuple.record_id,
            redcap_event_name: tuple.event_name.as_deref(),
            field_name: &tuple.field_name,
            value: &tuple.value,
        }
    }
}

/// Encodes tuples as the JSON array sent in the `data` form field.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_tuples(tuples: &[EavTuple]) -> serde_json::Result<String> {
    let wire: Vec<WireTuple<'_>> = tuples.iter().map(WireTuple::from).collect();
    serde_json::to_string(&wire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repower_core::ProjectId;

    #[test]
    fn classic_tuple_omits_event() {
        let tuples = [EavTuple::new(ProjectId::new(7), "1", "dob", "1990-01-01")];
        assert_eq!(
            encode_tuples(&tuples).unwrap(),
            r#"[{"record":"1","field_name":"dob","value":"1990-01-01"}]"#
        );
    }

    #[test]
    fn longitudinal_tuple_carries_event() {
        let tuples = [
            EavTuple::new(ProjectId::new(7), "1", "weight", "70").with_event("baseline_arm_1"),
        ];
        assert_eq!(
            encode_tuples(&tuples).unwrap(),
            r#"[{"record":"1","redcap_event_name":"baseline_arm_1","field_name":"weight","value":"70"}]"#
        );
    }

    #[test]
    fn values_are_escaped() {
        let tuples = [EavTuple::new(ProjectId::new(7), "1", "notes", "said \"hi\"\n")];
        let json = encode_tuples(&tuples).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["value"], "said \"hi\"\n");
    }

    #[test]
    fn empty_batch_is_empty_array() {
        assert_eq!(encode_tuples(&[]).unwrap(), "[]");
    }
}
