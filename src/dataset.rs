//! Dataset loading
//!
//! Text format, whitespace separated integers:
//!
//! ```text
//! V E R C X                    videos, endpoints, requests, caches, capacity
//! s_0 s_1 ... s_{V-1}          video sizes
//! L K                          per endpoint: datacenter latency, cache links
//! c l                          K lines: cache id, latency
//! ...
//! v e n                        R lines: video id, endpoint id, request count
//! ```
//!
//! The loader either returns a fully validated [`Catalog`] or an error with
//! the offending line number; the allocator never sees partial input.
//!
//! Sizes, latencies, the capacity and request counts are capped at
//! [`MAX_VALUE`], and the request counts of a dataset must sum to at most
//! `i64::MAX`. Within those caps no demand total or score term can overflow.

use std::path::Path;

use tracing::info;

use crate::catalog::{CacheLink, Catalog, Endpoint, Request};
use crate::error::DatasetError;

/// Largest accepted video size, latency, cache capacity or request count.
///
/// Values up to 2^53 are exact as `f64`.
pub const MAX_VALUE: u64 = 1 << 53;

/// Largest accepted sum of request counts
pub const MAX_TOTAL_REQUESTS: u64 = i64::MAX as u64;

/// Line cursor with 1-based line numbers
pub(crate) struct LineCursor<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
}

impl<'a> LineCursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
        }
    }

    /// Next line and its number
    pub(crate) fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let text = self.lines.next()?;
        self.line += 1;
        Some((self.line, text))
    }

    /// Number of the first non-blank line left, if any
    pub(crate) fn trailing_content(&mut self) -> Option<usize> {
        while let Some((line, text)) = self.next_line() {
            if !text.trim().is_empty() {
                return Some(line);
            }
        }
        None
    }
}

/// Parse every whitespace separated token as `u64`; `Err` carries the bad token
pub(crate) fn parse_fields(text: &str) -> Result<Vec<u64>, &str> {
    text.split_whitespace()
        .map(|token| token.parse::<u64>().map_err(|_| token))
        .collect()
}

impl LineCursor<'_> {
    /// Next line, which must hold exactly `N` integers
    fn fields<const N: usize>(
        &mut self,
        what: &'static str,
    ) -> Result<(usize, [u64; N]), DatasetError> {
        let (line, values) = self.any_fields(what)?;
        let fields: [u64; N] = values
            .try_into()
            .map_err(|values: Vec<u64>| DatasetError::FieldCount {
                line,
                what,
                expected: N,
                found: values.len(),
            })?;
        Ok((line, fields))
    }

    fn any_fields(&mut self, what: &'static str) -> Result<(usize, Vec<u64>), DatasetError> {
        let (line, text) = self.next_line().ok_or(DatasetError::UnexpectedEof {
            line: self.line + 1,
            expected: what,
        })?;
        let values = parse_fields(text).map_err(|token| DatasetError::InvalidInteger {
            line,
            token: token.to_string(),
        })?;
        Ok((line, values))
    }
}

fn check_id(
    line: usize,
    what: &'static str,
    value: u64,
    limit: usize,
) -> Result<usize, DatasetError> {
    usize::try_from(value)
        .ok()
        .filter(|&id| id < limit)
        .ok_or(DatasetError::OutOfRange {
            line,
            what,
            value,
            limit: limit as u64,
        })
}

fn to_count(line: usize, what: &'static str, value: u64) -> Result<usize, DatasetError> {
    usize::try_from(value).map_err(|_| DatasetError::OutOfRange {
        line,
        what,
        value,
        limit: usize::MAX as u64,
    })
}

fn check_value(line: usize, what: &'static str, value: u64) -> Result<u64, DatasetError> {
    if value > MAX_VALUE {
        return Err(DatasetError::OutOfRange {
            line,
            what,
            value,
            limit: MAX_VALUE,
        });
    }
    Ok(value)
}

/// Parse a dataset from text
pub fn parse_dataset(input: &str) -> Result<Catalog, DatasetError> {
    let mut cursor = LineCursor::new(input);

    let (line, [v, e, r, c, capacity]) = cursor.fields::<5>("header `V E R C X`")?;
    let video_count = to_count(line, "video count", v)?;
    let endpoint_count = to_count(line, "endpoint count", e)?;
    let request_count = to_count(line, "request count", r)?;
    let cache_count = to_count(line, "cache count", c)?;
    let capacity = check_value(line, "cache capacity", capacity)?;

    let (line, sizes) = cursor.any_fields("video sizes")?;
    if sizes.len() != video_count {
        return Err(DatasetError::FieldCount {
            line,
            what: "video sizes",
            expected: video_count,
            found: sizes.len(),
        });
    }
    if sizes.iter().any(|&size| size == 0) {
        return Err(DatasetError::NotPositive {
            line,
            what: "video size",
        });
    }
    for &size in &sizes {
        check_value(line, "video size", size)?;
    }

    let mut endpoints = Vec::with_capacity(endpoint_count);
    for id in 0..endpoint_count {
        let (line, [latency, links]) = cursor.fields::<2>("endpoint `L K`")?;
        let latency = check_value(line, "datacenter latency", latency)?;
        let link_count = to_count(line, "cache link count", links)?;

        let mut cache_links: Vec<CacheLink> = Vec::with_capacity(link_count.min(cache_count));
        for _ in 0..link_count {
            let (line, [cache, cache_latency]) = cursor.fields::<2>("cache link `c l`")?;
            let cache = check_id(line, "cache id", cache, cache_count)?;
            if cache_links.iter().any(|link| link.cache == cache) {
                return Err(DatasetError::DuplicateLink {
                    line,
                    endpoint: id,
                    cache,
                });
            }
            cache_links.push(CacheLink {
                cache,
                latency: check_value(line, "cache latency", cache_latency)?,
            });
        }

        endpoints.push(Endpoint::new(id, latency, cache_links));
    }

    let mut requests = Vec::with_capacity(request_count);
    let mut total: u64 = 0;
    for _ in 0..request_count {
        let (line, [video, endpoint, count]) = cursor.fields::<3>("request `v e n`")?;
        let video = check_id(line, "video id", video, video_count)?;
        let endpoint = check_id(line, "endpoint id", endpoint, endpoint_count)?;
        if count == 0 {
            return Err(DatasetError::NotPositive {
                line,
                what: "request count",
            });
        }
        let count = check_value(line, "request count", count)?;
        total = total
            .checked_add(count)
            .filter(|&total| total <= MAX_TOTAL_REQUESTS)
            .ok_or(DatasetError::OutOfRange {
                line,
                what: "total request count",
                value: total.saturating_add(count),
                limit: MAX_TOTAL_REQUESTS,
            })?;
        requests.push(Request::new(endpoint, video, sizes[video], count));
    }

    if let Some(line) = cursor.trailing_content() {
        return Err(DatasetError::TrailingContent { line });
    }

    Ok(Catalog::new(&sizes, cache_count, capacity, endpoints, requests))
}

/// Read and parse a dataset file
pub fn load_dataset(path: &Path) -> Result<Catalog, DatasetError> {
    let input = std::fs::read_to_string(path)?;
    let catalog = parse_dataset(&input)?;

    info!(
        path = %path.display(),
        videos = catalog.videos.len(),
        endpoints = catalog.endpoints.len(),
        requests = catalog.requests.len(),
        caches = catalog.caches.len(),
        capacity = catalog.cache_capacity(),
        "dataset loaded"
    );

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
5 2 4 3 100
50 50 80 30 110
1000 3
0 100
2 200
1 300
500 0
3 0 1500
0 1 1000
4 0 500
1 0 1000
";

    #[test]
    fn test_parse_sample() {
        let catalog = parse_dataset(SAMPLE).unwrap();

        assert_eq!(catalog.videos.len(), 5);
        assert_eq!(catalog.videos[4].size, 110);
        assert_eq!(catalog.caches.len(), 3);
        assert_eq!(catalog.cache_capacity(), 100);

        let ep = &catalog.endpoints[0];
        assert_eq!(ep.latency_to_datacenter, 1000);
        assert_eq!(ep.links().len(), 3);
        assert_eq!(ep.links()[1], CacheLink { cache: 2, latency: 200 });
        assert!(catalog.endpoints[1].is_datacenter_only());

        let r = &catalog.requests[0];
        assert_eq!((r.video, r.endpoint, r.count, r.video_size), (3, 0, 1500, 30));
        assert_eq!(catalog.total_requests(), 4000);
    }

    #[test]
    fn test_trailing_blank_lines_allowed() {
        let input = format!("{SAMPLE}\n\n   \n");
        assert!(parse_dataset(&input).is_ok());
    }

    #[test]
    fn test_trailing_content_rejected() {
        let input = format!("{SAMPLE}1 1 1\n");
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::TrailingContent { line: 12 })
        ));
    }

    #[test]
    fn test_truncated_input() {
        let input: String = SAMPLE.lines().take(8).map(|l| format!("{l}\n")).collect();
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::UnexpectedEof { line: 9, .. })
        ));
    }

    #[test]
    fn test_bad_header() {
        assert!(matches!(
            parse_dataset("5 2 4 3\n"),
            Err(DatasetError::FieldCount { line: 1, expected: 5, found: 4, .. })
        ));
        assert!(matches!(
            parse_dataset("5 2 x 3 100\n"),
            Err(DatasetError::InvalidInteger { line: 1, .. })
        ));
        assert!(matches!(
            parse_dataset("5 2 -4 3 100\n"),
            Err(DatasetError::InvalidInteger { line: 1, .. })
        ));
        assert!(matches!(
            parse_dataset(""),
            Err(DatasetError::UnexpectedEof { line: 1, .. })
        ));
    }

    #[test]
    fn test_video_line_length_checked() {
        let input = SAMPLE.replacen("50 50 80 30 110", "50 50 80 30", 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::FieldCount { line: 2, expected: 5, found: 4, .. })
        ));
    }

    #[test]
    fn test_zero_sizes_and_counts_rejected() {
        let input = SAMPLE.replacen("50 50 80 30 110", "50 0 80 30 110", 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::NotPositive { line: 2, .. })
        ));

        let input = SAMPLE.replacen("4 0 500", "4 0 0", 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::NotPositive { line: 10, .. })
        ));
    }

    #[test]
    fn test_ids_range_checked() {
        let input = SAMPLE.replacen("2 200", "3 200", 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::OutOfRange { line: 5, what: "cache id", value: 3, limit: 3 })
        ));

        let input = SAMPLE.replacen("3 0 1500", "5 0 1500", 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::OutOfRange { what: "video id", .. })
        ));

        let input = SAMPLE.replacen("0 1 1000", "0 2 1000", 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::OutOfRange { what: "endpoint id", .. })
        ));
    }

    #[test]
    fn test_values_above_cap_rejected() {
        let huge = (MAX_VALUE + 1).to_string();

        let input = SAMPLE.replacen("3 0 1500", &format!("3 0 {huge}"), 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::OutOfRange {
                line: 8,
                what: "request count",
                limit: MAX_VALUE,
                ..
            })
        ));

        let input = SAMPLE.replacen("50 50 80 30 110", &format!("50 50 80 {huge} 110"), 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::OutOfRange { line: 2, what: "video size", .. })
        ));

        let input = SAMPLE.replacen("2 200", &format!("2 {huge}"), 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::OutOfRange { line: 5, what: "cache latency", .. })
        ));

        let input = SAMPLE.replacen("500 0", &format!("{huge} 0"), 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::OutOfRange { line: 7, what: "datacenter latency", .. })
        ));

        let input = SAMPLE.replacen("5 2 4 3 100", &format!("5 2 4 3 {huge}"), 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::OutOfRange { line: 1, what: "cache capacity", .. })
        ));

        // Exactly at the cap is fine
        let input = SAMPLE.replacen("3 0 1500", &format!("3 0 {MAX_VALUE}"), 1);
        assert!(parse_dataset(&input).is_ok());
    }

    #[test]
    fn test_total_request_count_capped() {
        // 1024 requests of 2^53 each sum to 2^63, one past i64::MAX
        let mut input = String::from("1 1 1024 1 100\n10\n100 1\n0 10\n");
        for _ in 0..1024 {
            input.push_str(&format!("0 0 {MAX_VALUE}\n"));
        }
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::OutOfRange {
                line: 1028,
                what: "total request count",
                limit: MAX_TOTAL_REQUESTS,
                ..
            })
        ));

        // One fewer stays inside the cap
        let input = input.replacen("1 1 1024 1 100", "1 1 1023 1 100", 1);
        let trimmed: String = input.lines().take(1027).map(|l| format!("{l}\n")).collect();
        let catalog = parse_dataset(&trimmed).unwrap();
        assert_eq!(catalog.total_requests(), 1023 * MAX_VALUE);
    }

    #[test]
    fn test_duplicate_link_rejected() {
        let input = SAMPLE.replacen("1 300", "0 300", 1);
        assert!(matches!(
            parse_dataset(&input),
            Err(DatasetError::DuplicateLink { line: 6, endpoint: 0, cache: 0 })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.in");
        std::fs::write(&path, SAMPLE).unwrap();

        let catalog = load_dataset(&path).unwrap();
        assert_eq!(catalog.requests.len(), 4);

        let missing = load_dataset(&dir.path().join("missing.in"));
        assert!(matches!(missing, Err(DatasetError::Io(_))));
    }
}
