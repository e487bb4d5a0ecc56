//! Total mapping from the raw schema to [`SlotRecord`].
//!
//! One output record per input item, in input order. Missing or odd fields
//! degrade to defaults one at a time; a bad item never affects its neighbours.

use crate::model::{SlotRecord, StatusKind};
use crate::raw::{RawSlot, RawSlotItem, RawStatus, RawValue};

/// Normalize a whole query result.
pub fn normalize_slots<I>(items: I) -> Vec<SlotRecord>
where
    I: IntoIterator<Item = RawSlotItem>,
{
    items.into_iter().map(normalize_item).collect()
}

pub fn normalize_item(item: RawSlotItem) -> SlotRecord {
    let (record, key) = match item {
        RawSlotItem::Record(record) => (record, None),
        RawSlotItem::Pair { key, record } => (record.unwrap_or_default(), key),
        RawSlotItem::Unrecognized => (RawSlot::default(), None),
    };
    normalize_record(record, key)
}

fn normalize_record(record: RawSlot, key: Option<RawValue>) -> SlotRecord {
    let RawSlot {
        version,
        hash,
        url,
        status,
        approvals,
        creator,
    } = record;

    let (status, status_fields) = normalize_status(status);

    SlotRecord {
        version: version.or(key).map(|v| v.to_text()).unwrap_or_default(),
        hash: hash.map(|v| v.to_text()).unwrap_or_default(),
        url: url.map(|v| v.to_text()).unwrap_or_default(),
        status,
        status_fields,
        approvals: approvals
            .iter()
            .map(RawValue::to_address_text)
            .filter(|text| !text.is_empty())
            .collect(),
        creator: creator.as_ref().map(RawValue::to_address_text),
    }
}

fn normalize_status(status: Option<RawStatus>) -> (StatusKind, Vec<String>) {
    let Some(RawStatus { name, fields }) = status else {
        return (StatusKind::Unknown, Vec::new());
    };
    let kind = name
        .as_ref()
        .map(|name| StatusKind::from_tag(&name.to_text()))
        .unwrap_or(StatusKind::Unknown);
    let fields = fields
        .iter()
        .map(RawValue::to_text)
        .filter(|text| !text.is_empty())
        .collect();
    (kind, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use pretty_assertions::assert_eq;

    fn slot(version: &str, status: &str) -> RawSlot {
        RawSlot {
            version: Some(RawValue::Bytes(version.as_bytes().to_vec())),
            hash: Some(RawValue::Bytes(b"abc123".to_vec())),
            url: Some(RawValue::text("https://releases.example/fw.bin")),
            status: Some(RawStatus::named(status)),
            approvals: Vec::new(),
            creator: None,
        }
    }

    #[test]
    fn full_record_maps_every_field() {
        let approver = Address::new([9u8; 32]);
        let creator = Address::new([4u8; 32]);
        let mut raw = slot("1.2.0", "APPROVED");
        raw.status = Some(RawStatus {
            name: Some(RawValue::text("APPROVED")),
            fields: vec![RawValue::Number("3".into()), RawValue::text("")],
        });
        raw.approvals = vec![RawValue::Address(approver), RawValue::text("")];
        raw.creator = Some(RawValue::Address(creator));

        let record = normalize_item(RawSlotItem::Record(raw));

        assert_eq!(
            record,
            SlotRecord {
                version: "1.2.0".into(),
                hash: "abc123".into(),
                url: "https://releases.example/fw.bin".into(),
                status: StatusKind::Approved,
                status_fields: vec!["3".into()],
                approvals: vec![approver.to_bech32()],
                creator: Some(creator.to_bech32()),
            }
        );
    }

    #[test]
    fn pair_key_backs_up_missing_version() {
        let mut raw = slot("ignored", "PROPOSED");
        raw.version = None;
        let record = normalize_item(RawSlotItem::Pair {
            key: Some(RawValue::Bytes(b"2.0.1".to_vec())),
            record: Some(raw),
        });
        assert_eq!(record.version, "2.0.1");
        assert_eq!(record.status, StatusKind::Proposed);
    }

    #[test]
    fn record_version_wins_over_pair_key() {
        let record = normalize_item(RawSlotItem::Pair {
            key: Some(RawValue::text("9.9.9")),
            record: Some(slot("1.0.0", "PROPOSED")),
        });
        assert_eq!(record.version, "1.0.0");
    }

    #[test]
    fn empty_version_is_not_replaced_by_key() {
        let record = normalize_item(RawSlotItem::Pair {
            key: Some(RawValue::text("9.9.9")),
            record: Some(slot("", "PROPOSED")),
        });
        assert_eq!(record.version, "");
    }

    #[test]
    fn pair_without_record_keeps_only_the_key() {
        let record = normalize_item(RawSlotItem::Pair {
            key: Some(RawValue::text("0.1")),
            record: None,
        });
        assert_eq!(record, SlotRecord::new("0.1", StatusKind::Unknown));
    }

    #[test]
    fn unrecognized_item_degrades_to_defaults() {
        let record = normalize_item(RawSlotItem::Unrecognized);
        assert_eq!(record, SlotRecord::new("", StatusKind::Unknown));
        assert_eq!(record.creator, None);
    }

    #[test]
    fn unknown_or_missing_status_names_map_to_unknown() {
        for status in [
            Some(RawStatus::named("Approved")),
            Some(RawStatus::named("ARCHIVED")),
            Some(RawStatus::default()),
            Some(RawStatus {
                name: Some(RawValue::Number("1".into())),
                fields: Vec::new(),
            }),
            None,
        ] {
            let mut raw = slot("1.0.0", "PROPOSED");
            raw.status = status;
            assert_eq!(normalize_item(raw.into()).status, StatusKind::Unknown);
        }
    }

    #[test]
    fn present_but_empty_creator_stays_present() {
        let mut raw = slot("1.0.0", "PROPOSED");
        raw.creator = Some(RawValue::text(""));
        assert_eq!(normalize_item(raw.into()).creator, Some(String::new()));
    }

    #[test]
    fn duplicate_approvals_pass_through() {
        let approver = Address::new([1u8; 32]);
        let mut raw = slot("1.0.0", "PROPOSED");
        raw.approvals = vec![approver.into(), approver.into()];
        let record = normalize_item(raw.into());
        assert_eq!(record.approvals.len(), 2);
        assert_eq!(record.approvals[0], record.approvals[1]);
    }

    #[test]
    fn preserves_length_and_order() {
        let items = vec![
            RawSlotItem::Record(slot("3.0.0", "REJECTED")),
            RawSlotItem::Unrecognized,
            RawSlotItem::Record(slot("1.0.0", "APPROVED")),
            RawSlotItem::Pair {
                key: None,
                record: None,
            },
        ];
        let versions: Vec<String> = normalize_slots(items)
            .into_iter()
            .map(|record| record.version)
            .collect();
        assert_eq!(versions, vec!["3.0.0", "", "1.0.0", ""]);
    }
}
