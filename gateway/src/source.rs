//! Fetching the slot listing and reshaping it into the raw slot schema.

use std::sync::Arc;

use async_trait::async_trait;
use device_release_abi::{Abi, AbiValue};
use device_release_slots::{
    Address, GET_SLOTS_ENDPOINT, RawSlot, RawSlotItem, RawStatus, RawValue,
};
use tracing::debug;

use crate::error::Result;
use crate::executor::ContractQueryExecutor;

/// Supplies the current, unnormalized contents of the slot registry.
#[async_trait]
pub trait SlotSource: Send + Sync {
    async fn fetch_slots(&self) -> Result<Vec<RawSlotItem>>;
}

/// [`SlotSource`] that queries `getSlots` and decodes it with the contract ABI.
pub struct ContractSlotSource {
    abi: Arc<Abi>,
    executor: Arc<dyn ContractQueryExecutor>,
}

impl ContractSlotSource {
    pub fn new(abi: Arc<Abi>, executor: Arc<dyn ContractQueryExecutor>) -> Self {
        Self { abi, executor }
    }
}

#[async_trait]
impl SlotSource for ContractSlotSource {
    async fn fetch_slots(&self) -> Result<Vec<RawSlotItem>> {
        let return_data = self.executor.query(GET_SLOTS_ENDPOINT, &[]).await?;
        let outputs = self.abi.decode_outputs(GET_SLOTS_ENDPOINT, &return_data)?;

        // Only the first declared output carries the listing.
        let items = match outputs.into_iter().next() {
            Some(AbiValue::List(values)) => values.into_iter().map(slot_item).collect(),
            Some(value) => vec![slot_item(value)],
            None => Vec::new(),
        };
        debug!(
            entries = return_data.len(),
            slots = items.len(),
            "fetched slot listing"
        );
        Ok(items)
    }
}

/// Reshape one decoded listing entry. Never fails: shapes that do not look
/// like a slot become [`RawSlotItem::Unrecognized`].
pub fn slot_item(value: AbiValue) -> RawSlotItem {
    match value {
        AbiValue::Multi(parts) | AbiValue::Tuple(parts) => {
            let mut parts = parts.into_iter();
            let key = parts.next().and_then(raw_value);
            let record = parts.next().and_then(|part| match part {
                AbiValue::Struct { fields, .. } => Some(raw_slot(fields)),
                _ => None,
            });
            RawSlotItem::Pair { key, record }
        }
        AbiValue::Struct { fields, .. } => RawSlotItem::Record(raw_slot(fields)),
        _ => RawSlotItem::Unrecognized,
    }
}

fn raw_slot(fields: Vec<(String, AbiValue)>) -> RawSlot {
    let mut slot = RawSlot::default();
    for (name, value) in fields {
        match name.as_str() {
            "version" => slot.version = raw_value(value),
            "hash" => slot.hash = raw_value(value),
            "url" => slot.url = raw_value(value),
            "status" => slot.status = raw_status(value),
            "approvals" => {
                slot.approvals = match value {
                    AbiValue::List(items) => items.into_iter().filter_map(raw_value).collect(),
                    other => raw_value(other).into_iter().collect(),
                }
            }
            "creator" => slot.creator = raw_value(value),
            _ => {}
        }
    }
    slot
}

fn raw_status(value: AbiValue) -> Option<RawStatus> {
    match value {
        AbiValue::Enum {
            variant, fields, ..
        } => Some(RawStatus {
            name: Some(RawValue::Text(variant)),
            fields: fields
                .into_iter()
                .filter_map(|(_, value)| raw_value(value))
                .collect(),
        }),
        AbiValue::Option(inner) => inner.and_then(|inner| raw_status(*inner)),
        other => raw_value(other).map(|name| RawStatus {
            name: Some(name),
            fields: Vec::new(),
        }),
    }
}

fn raw_value(value: AbiValue) -> Option<RawValue> {
    if let Some(digits) = value.to_decimal_string() {
        return Some(RawValue::Number(digits));
    }
    match value {
        AbiValue::Bytes(bytes) => Some(RawValue::Bytes(bytes)),
        AbiValue::Address(bytes) => Some(RawValue::Address(Address::new(bytes))),
        AbiValue::Bool(flag) => Some(RawValue::Bool(flag)),
        AbiValue::Option(inner) => inner.and_then(|inner| raw_value(*inner)),
        AbiValue::Enum { variant, .. } => Some(RawValue::Text(variant)),
        AbiValue::List(items) | AbiValue::Tuple(items) | AbiValue::Multi(items) => Some(
            RawValue::List(items.into_iter().filter_map(raw_value).collect()),
        ),
        AbiValue::Struct { .. }
        | AbiValue::UInt(_)
        | AbiValue::Int(_)
        | AbiValue::BigUint(_)
        | AbiValue::BigInt(_) => None,
    }
}
