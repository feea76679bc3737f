//! Record parsing for engine dump output
//!
//! The engine dumps entities as blank-line-delimited records: the first
//! line's leading token identifies the record (a name, or a positional id
//! assigned by dump order), every following line is a `key value` field
//! assignment. Parsing never fails; anything unrecognized is dropped at the
//! field level and a malformed positional header degrades to id 0.

use bosun_models::EngineObject;

/// Inflate every record of a dump blob, in blob order.
///
/// Blob order is the id-assignment source for positional entities, so the
/// output sequence must never be reordered. A record whose header is not a
/// valid integer inflates with id 0, which means one collection can hold
/// several id-0 entries; positional ids are only meaningful within the blob
/// they came from.
pub fn parse_collection<T: EngineObject>(blob: &str) -> Vec<T> {
    let mut items = Vec::new();
    for record in blob.split("\n\n") {
        if record.trim().is_empty() {
            continue;
        }
        let mut item = T::default();
        item.apply_header_token(header_token(record));
        apply_record_fields(record, &mut item);
        items.push(item);
    }
    items
}

/// Leading token of a record's header line.
pub fn header_token(record: &str) -> &str {
    record
        .trim_start()
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .unwrap_or("")
}

/// Apply every field line of a record, skipping the header line.
///
/// A line's first token is the key, the remainder the value; a line with no
/// remainder is a bare flag with an empty value.
pub fn apply_record_fields<T: EngineObject>(record: &str, item: &mut T) {
    for line in record.trim_start().lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(char::is_whitespace) {
            Some((key, value)) => item.set_field(key, value.trim()),
            None => item.set_field(line, ""),
        }
    }
}
