/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use core::fmt;
use std::cmp;

/// A single byte range of a ranged object read.
///
/// NOTE: S3 only supports a single bytes range; this is a simplified
/// representation covering the two shapes a partitioned download produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// All bytes between start and end inclusive ("bytes=x-y")
    Inclusive(u64, u64),

    /// All bytes starting from start ("bytes=x-")
    AllFrom(u64),
}

impl ByteRange {
    /// Render as an HTTP `Range` header value.
    pub fn to_header_value(&self) -> String {
        format!("bytes={}", self)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ByteRange::Inclusive(start, end) => write!(f, "{}-{}", start, end),
            ByteRange::AllFrom(start) => write!(f, "{}-", start),
        }
    }
}

/// Acknowledgement for one uploaded part, keyed for the completion manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// Part number the store acknowledged, starting at 1.
    pub part_number: i32,

    /// Opaque identifier the store assigned to the uploaded part.
    pub e_tag: String,
}

/// One unit of multipart upload work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PartDescriptor {
    pub(crate) part_number: i32,
    pub(crate) offset: u64,
    pub(crate) len: u64,
}

/// One unit of ranged download work. `end` is `None` for the final range,
/// which is left open ended so the store reports the true remaining length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RangeDescriptor {
    pub(crate) seq: u64,
    pub(crate) start: u64,
    pub(crate) end: Option<u64>,
}

/// Split `file_size` bytes into parts of at most `part_size`, numbered
/// contiguously from 1. Only the final part may be short; it is never empty.
pub(crate) fn partition_parts(file_size: u64, part_size: u64) -> Vec<PartDescriptor> {
    let num_parts = file_size.div_ceil(part_size);
    (1..=num_parts)
        .map(|n| {
            let offset = part_size * (n - 1);
            PartDescriptor {
                part_number: n as i32,
                offset,
                len: cmp::min(part_size, file_size - offset),
            }
        })
        .collect()
}

/// Split `object_size` bytes into download ranges of `part_size`, indexed
/// from 0. All ranges are closed except the last.
pub(crate) fn partition_ranges(object_size: u64, part_size: u64) -> Vec<RangeDescriptor> {
    let num_ranges = object_size.div_ceil(part_size);
    (0..num_ranges)
        .map(|seq| {
            let start = seq * part_size;
            let end = if seq == num_ranges - 1 {
                None
            } else {
                Some(start + part_size - 1)
            };
            RangeDescriptor { seq, start, end }
        })
        .collect()
}
