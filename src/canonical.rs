// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Canonical batch encoding.
//!
//! Produces compact JSON with a fixed key order. Nothing here depends on a serializer's
//! map ordering: every key is written explicitly, in ascending byte order.
//!
//! # Ordering rules
//! - `image_urls` and `image_hashes` are each sorted lexicographically.
//! - Stages are sorted by name, then by stage id.
//! - Numbers print in shortest round-trip decimal form, without exponent and without a
//!   trailing `.0` for integral values. Negative zero prints as `0`.
//!
//! # Layout
//! ```text
//! batch: batchCode, batchId, cropType, farmerId, farmerName, harvestDate, location,
//!        quantity, stages
//! stage: completedAt, imageHashes, imageUrls, name, stageId, verificationStatus
//! leaf:  completedAt, imageHashes, name, stageId, verificationStatus
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::types::snapshot::{BatchSnapshot, StageSnapshot};

/// Streaming writer for one JSON object. Tracks comma placement between members.
struct ObjectWriter<'a> {
    out: &'a mut String,
    first: bool,
}

impl<'a> ObjectWriter<'a> {
    fn open(out: &'a mut String) -> Self {
        out.push('{');
        Self { out, first: true }
    }

    fn key(&mut self, key: &str) -> &mut String {
        if !self.first {
            self.out.push(',');
        }
        self.first = false;
        write_str(&mut *self.out, key);
        self.out.push(':');
        &mut *self.out
    }

    fn string(&mut self, key: &str, value: &str) {
        let out = self.key(key);
        write_str(out, value);
    }

    fn number(&mut self, key: &str, value: f64) {
        let out = self.key(key);
        write_number(out, value);
    }

    fn sorted_strings(&mut self, key: &str, values: &[String]) {
        let out = self.key(key);
        write_sorted_strings(out, values);
    }

    fn close(self) {
        self.out.push('}');
    }
}

/// JSON string literal with standard escaping.
fn write_str(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_number(out: &mut String, value: f64) {
    // Validated snapshots never carry non-finite quantities.
    debug_assert!(value.is_finite(), "non-finite number reached the canonicalizer");
    if value == 0.0 {
        out.push('0');
    } else {
        let _ = write!(out, "{}", value);
    }
}

fn write_sorted_strings(out: &mut String, values: &[String]) {
    let mut sorted: Vec<&str> = values.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    out.push('[');
    for (i, v) in sorted.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_str(out, v);
    }
    out.push(']');
}

/// Stages in canonical order: by name, then stage id.
pub fn sorted_stages(stages: &[StageSnapshot]) -> Vec<&StageSnapshot> {
    let mut sorted: Vec<&StageSnapshot> = stages.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.stage_id.cmp(&b.stage_id)));
    sorted
}

fn write_stage(out: &mut String, stage: &StageSnapshot, include_urls: bool) {
    let mut obj = ObjectWriter::open(out);
    obj.string("completedAt", &stage.completed_at);
    obj.sorted_strings("imageHashes", &stage.image_hashes);
    if include_urls {
        obj.sorted_strings("imageUrls", &stage.image_urls);
    }
    obj.string("name", &stage.name);
    obj.string("stageId", &stage.stage_id);
    obj.string("verificationStatus", stage.verification_status.as_str());
    obj.close();
}

/// Canonical form of a whole batch. Input to the batch `data_hash`.
pub fn canonicalize(snapshot: &BatchSnapshot) -> String {
    let mut out = String::with_capacity(256 + snapshot.stages.len() * 256);
    let mut obj = ObjectWriter::open(&mut out);
    obj.string("batchCode", &snapshot.batch_code);
    obj.string("batchId", &snapshot.batch_id);
    obj.string("cropType", &snapshot.crop_type);
    obj.string("farmerId", &snapshot.farmer_id);
    obj.string("farmerName", &snapshot.farmer_name);
    obj.string("harvestDate", &snapshot.harvest_date);
    obj.string("location", &snapshot.location);
    obj.number("quantity", snapshot.quantity);

    let stages_out = obj.key("stages");
    stages_out.push('[');
    for (i, stage) in sorted_stages(&snapshot.stages).into_iter().enumerate() {
        if i > 0 {
            stages_out.push(',');
        }
        write_stage(stages_out, stage, true);
    }
    stages_out.push(']');
    obj.close();
    out
}

/// Canonical form of a single stage as used for its Merkle leaf.
///
/// Image URLs are excluded: the leaf commits to content hashes, not locations.
pub fn canonicalize_stage(stage: &StageSnapshot) -> String {
    let mut out = String::with_capacity(256);
    write_stage(&mut out, stage, false);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_string_escaping() {
        let mut out = String::new();
        write_str(&mut out, "a\"b\\c\nd\u{01}");
        assert_eq!(out, "\"a\\\"b\\\\c\\nd\\u0001\"");
    }

    #[test]
    fn test_number_forms() {
        let cases = [(500.0, "500"), (12.5, "12.5"), (-0.0, "0"), (0.1, "0.1"), (1e21, "1000000000000000000000")];
        for (value, expected) in cases {
            let mut out = String::new();
            write_number(&mut out, value);
            assert_eq!(out, expected.to_string());
        }
    }
}
