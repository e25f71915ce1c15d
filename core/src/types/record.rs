//! Record value types: a record's field map, the namespace-wide entry map,
//! and the encodings carried by the `Status` and `Media` fields.
//!
//! Both maps keep insertion order on disk and in memory so that listings and
//! the persisted JSON read the same way every time.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};


/// Canonical name of the ternary status field.
pub const STATUS_FIELD: &str = "Status";

/// Canonical name of the media list field.
pub const MEDIA_FIELD: &str = "Media";


// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One named entity: canonical field name to string value.
///
/// Serialized as a JSON object whose key order matches the field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create a record with every given field present and empty.
    pub fn with_fields<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut record = Record::default();
        for name in names {
            record.set(name, "");
        }
        record
    }

    /// Get a field value. `None` if the field is absent from the record.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    /// Set a field, replacing the value in place if it already exists.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    /// The record's status. A missing field reads as unset.
    pub fn status(&self) -> Status {
        Status::from_field(self.get(STATUS_FIELD).unwrap_or(""))
    }

    /// Decoded media items of the `Media` field.
    pub fn media(&self) -> Vec<MediaItem> {
        MediaItem::parse_list(self.get(MEDIA_FIELD).unwrap_or(""))
    }

    /// Append one media item to the raw `Media` string as `;{label} {url}`.
    pub fn push_media(&mut self, label: &str, url: &str) {
        let mut raw = self.get(MEDIA_FIELD).unwrap_or("").to_string();
        raw.push(';');
        raw.push_str(label);
        raw.push(' ');
        raw.push_str(url);
        self.set(MEDIA_FIELD, raw);
    }

    /// Iterate over `(field, value)` pairs in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = deserializer.deserialize_map(OrderedPairs::<String>::new("a field map"))?;
        let mut record = Record::default();
        for (k, v) in pairs {
            record.set(&k, v);
        }
        Ok(record)
    }
}


// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// The full state of one namespace: record name to record, in insertion
/// order. This is the unit persisted as both current state and backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries {
    records: Vec<(String, Record)>,
}

impl Entries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|(k, _)| k == name).map(|(_, r)| r)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Record> {
        self.records
            .iter_mut()
            .find(|(k, _)| k == name)
            .map(|(_, r)| r)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace a record. New names are appended at the end.
    pub fn insert(&mut self, name: &str, record: Record) {
        match self.get_mut(name) {
            Some(slot) => *slot = record,
            None => self.records.push((name.to_string(), record)),
        }
    }

    /// Remove a record, preserving the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Record> {
        let pos = self.records.iter().position(|(k, _)| k == name)?;
        Some(self.records.remove(pos).1)
    }

    /// Record names in stored order.
    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.records.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize to the persisted, human-diffable form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse the persisted form. Blank content reads as an empty store.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(content)
    }
}

impl Serialize for Entries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (k, r) in &self.records {
            map.serialize_entry(k, r)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = deserializer.deserialize_map(OrderedPairs::<Record>::new("an entry map"))?;
        let mut entries = Entries::new();
        for (k, r) in pairs {
            entries.insert(&k, r);
        }
        Ok(entries)
    }
}


/// Map visitor that keeps key order as it appears in the input.
pub(crate) struct OrderedPairs<V> {
    expecting: &'static str,
    marker: std::marker::PhantomData<V>,
}

impl<V> OrderedPairs<V> {
    pub(crate) fn new(expecting: &'static str) -> Self {
        OrderedPairs {
            expecting,
            marker: std::marker::PhantomData,
        }
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedPairs<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expecting)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((k, v)) = access.next_entry::<String, V>()? {
            pairs.push((k, v));
        }
        Ok(pairs)
    }
}


// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Ternary status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    On,
    Off,
    Unset,
}

impl Status {
    /// Decode the raw field value. Anything other than `on`/`off` is unset.
    pub fn from_field(raw: &str) -> Status {
        match raw {
            "on" => Status::On,
            "off" => Status::Off,
            _ => Status::Unset,
        }
    }

    /// The raw value stored in the `Status` field.
    pub fn as_field(&self) -> &'static str {
        match self {
            Status::On => "on",
            Status::Off => "off",
            Status::Unset => "",
        }
    }

    pub fn symbol(&self) -> StatusSymbol {
        match self {
            Status::On => StatusSymbol::Active,
            Status::Off => StatusSymbol::Inactive,
            Status::Unset => StatusSymbol::Neutral,
        }
    }
}


/// The marker shown next to an entry in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSymbol {
    Active,
    Inactive,
    Neutral,
}

impl StatusSymbol {
    pub fn glyph(&self) -> &'static str {
        match self {
            StatusSymbol::Active => "\u{1F7E2}",
            StatusSymbol::Inactive => "\u{1F534}",
            StatusSymbol::Neutral => "\u{26AA}",
        }
    }
}

impl fmt::Display for StatusSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}


// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// One `(label, url)` pair of the `Media` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub label: String,
    pub url: String,
}

impl MediaItem {
    /// Decode a raw `Media` string.
    ///
    /// Items are separated by `;`; empty segments are skipped. Within an
    /// item the url is the last whitespace-separated word and the label is
    /// everything before it, so a bare url decodes with an empty label.
    pub fn parse_list(raw: &str) -> Vec<MediaItem> {
        raw.split(';')
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(|seg| match seg.rsplit_once(char::is_whitespace) {
                Some((label, url)) => MediaItem {
                    label: label.trim().to_string(),
                    url: url.to_string(),
                },
                None => MediaItem {
                    label: String::new(),
                    url: seg.to_string(),
                },
            })
            .collect()
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.url)
        } else {
            write!(f, "{} {}", self.label, self.url)
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Entries {
        let mut a = Record::with_fields(["Location", "Rates", "Media", "Status"]);
        a.set("Location", "Roomy");
        a.set("Status", "on");
        a.push_media("front", "http://a/1.png");
        let b = Record::with_fields(["Location", "Rates", "Media", "Status"]);
        let mut entries = Entries::new();
        entries.insert("Zeta", a);
        entries.insert("Alpha", b);
        entries
    }

    #[test]
    fn with_fields_defaults_to_empty() {
        let r = Record::with_fields(["Location", "Info"]);
        assert_eq!(r.get("Location"), Some(""));
        assert_eq!(r.get("Info"), Some(""));
        assert_eq!(r.get("Rates"), None);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut r = Record::with_fields(["A", "B"]);
        r.set("A", "1");
        r.set("A", "2");
        let fields: Vec<_> = r.iter().collect();
        assert_eq!(fields, vec![("A", "2"), ("B", "")]);
    }

    #[test]
    fn persist_reload_is_byte_identical() {
        let entries = sample();
        let json = entries.to_json().unwrap();
        let back = Entries::from_json(&json).unwrap();
        assert_eq!(back, entries);
        assert_eq!(back.to_json().unwrap(), json);
    }

    #[test]
    fn insertion_order_survives_persistence() {
        let json = sample().to_json().unwrap();
        let back = Entries::from_json(&json).unwrap();
        assert_eq!(back.names(), vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn reads_foreign_json_shape() {
        let raw = json!({"Loc1": {"Location": "Roomy", "Rates": "9-5"}}).to_string();
        let entries = Entries::from_json(&raw).unwrap();
        assert_eq!(entries.get("Loc1").unwrap().get("Rates"), Some("9-5"));
    }

    #[test]
    fn blank_content_is_empty_store() {
        assert!(Entries::from_json("").unwrap().is_empty());
        assert!(Entries::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn non_string_values_are_rejected() {
        let raw = json!({"Loc1": {"Location": 3}}).to_string();
        assert!(Entries::from_json(&raw).is_err());
    }

    #[test]
    fn remove_keeps_order() {
        let mut entries = sample();
        entries.insert("Mid", Record::default());
        assert!(entries.remove("Alpha").is_some());
        assert_eq!(entries.names(), vec!["Zeta", "Mid"]);
        assert!(entries.remove("Alpha").is_none());
    }

    #[test]
    fn status_mapping() {
        let mut r = Record::with_fields(["Status"]);
        assert_eq!(r.status().symbol(), StatusSymbol::Neutral);
        r.set("Status", "on");
        assert_eq!(r.status().symbol(), StatusSymbol::Active);
        r.set("Status", "off");
        assert_eq!(r.status().symbol(), StatusSymbol::Inactive);
        r.set("Status", "maybe");
        assert_eq!(r.status().symbol(), StatusSymbol::Neutral);
    }

    #[test]
    fn missing_status_field_is_neutral() {
        let r = Record::with_fields(["Location"]);
        assert_eq!(r.status(), Status::Unset);
        assert_eq!(r.status().symbol().glyph(), "\u{26AA}");
    }

    #[test]
    fn push_media_appends_raw_segment() {
        let mut r = Record::with_fields(["Media"]);
        r.push_media("front", "http://a/1.png");
        r.push_media("back", "http://a/2.png");
        assert_eq!(r.get("Media"), Some(";front http://a/1.png;back http://a/2.png"));
        let items = r.media();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].label, "back");
        assert_eq!(items[1].url, "http://a/2.png");
    }

    #[test]
    fn media_parse_skips_empty_segments() {
        let items = MediaItem::parse_list(";;http://x/y.png; ;two words http://z");
        assert_eq!(
            items,
            vec![
                MediaItem { label: String::new(), url: "http://x/y.png".into() },
                MediaItem { label: "two words".into(), url: "http://z".into() },
            ]
        );
        assert!(MediaItem::parse_list("").is_empty());
    }
}
