//! Submission files: the serialized [`Allocation`]
//!
//! ```text
//! N                  caches described below
//! c v_1 v_2 ...      one line per cache, videos in placement order
//! ```
//!
//! Reading a submission validates it against a [`Catalog`] so that
//! allocations produced elsewhere can be scored with the same [`scorer`](crate::scorer).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::allocator::Allocation;
use crate::catalog::Catalog;
use crate::dataset::{parse_fields, LineCursor};
use crate::error::SubmissionError;

/// Write `allocation` in submission format
pub fn write_submission<W: Write>(allocation: &Allocation, mut out: W) -> io::Result<()> {
    writeln!(out, "{}", allocation.len())?;
    for entry in allocation.iter() {
        write!(out, "{}", entry.cache)?;
        for video in entry.videos() {
            write!(out, " {video}")?;
        }
        writeln!(out)?;
    }
    out.flush()
}

/// Render `allocation` as a submission string
pub fn render_submission(allocation: &Allocation) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_submission(allocation, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write `allocation` to `path`, replacing any existing file
pub fn save_submission(allocation: &Allocation, path: &Path) -> Result<(), SubmissionError> {
    let file = File::create(path)?;
    write_submission(allocation, BufWriter::new(file))?;

    info!(
        path = %path.display(),
        caches = allocation.len(),
        placements = allocation.placement_count(),
        "submission written"
    );
    Ok(())
}

fn fields(line: usize, text: &str) -> Result<Vec<u64>, SubmissionError> {
    parse_fields(text).map_err(|token| SubmissionError::InvalidInteger {
        line,
        token: token.to_string(),
    })
}

/// Parse a submission and check it is feasible for `catalog`.
///
/// Feasible means every cache and video exists, no cache is described twice,
/// no video repeats on a cache, and each cache's total size fits its
/// capacity. A line with only a cache id places nothing.
pub fn parse_submission(input: &str, catalog: &Catalog) -> Result<Allocation, SubmissionError> {
    let mut cursor = LineCursor::new(input);

    let (line, text) = cursor.next_line().ok_or(SubmissionError::UnexpectedEof {
        line: 1,
        expected: "cache count",
    })?;
    let header = fields(line, text)?;
    let &[declared] = header.as_slice() else {
        return Err(SubmissionError::BadHeader {
            line,
            found: header.len(),
        });
    };

    let mut allocation = Allocation::new();
    let mut described = vec![false; catalog.caches.len()];
    let mut next_line = line + 1;

    for _ in 0..declared {
        let (line, text) = cursor.next_line().ok_or(SubmissionError::UnexpectedEof {
            line: next_line,
            expected: "cache description",
        })?;
        next_line = line + 1;

        let values = fields(line, text)?;
        let Some((&raw_cache, videos)) = values.split_first() else {
            return Err(SubmissionError::UnexpectedEof {
                line,
                expected: "cache id",
            });
        };

        let cache = usize::try_from(raw_cache)
            .ok()
            .filter(|&id| id < catalog.caches.len())
            .ok_or(SubmissionError::UnknownCache {
                line,
                cache: raw_cache,
            })?;
        if std::mem::replace(&mut described[cache], true) {
            return Err(SubmissionError::DuplicateCache { line, cache });
        }

        for &raw_video in videos {
            let video = usize::try_from(raw_video)
                .ok()
                .and_then(|id| catalog.video(id))
                .ok_or(SubmissionError::UnknownVideo {
                    line,
                    video: raw_video,
                })?;
            if !allocation.insert(cache, video.id, video.size) {
                return Err(SubmissionError::DuplicateVideo {
                    line,
                    cache,
                    video: video.id,
                });
            }
        }
    }

    if let Some(line) = cursor.trailing_content() {
        return Err(SubmissionError::TrailingContent { line });
    }

    for entry in allocation.iter() {
        let capacity = catalog.caches[entry.cache].capacity;
        if entry.used() > capacity {
            return Err(SubmissionError::OverCapacity {
                cache: entry.cache,
                used: entry.used(),
                capacity,
            });
        }
    }

    Ok(allocation)
}

/// Read and validate a submission file
pub fn load_submission(path: &Path, catalog: &Catalog) -> Result<Allocation, SubmissionError> {
    let input = std::fs::read_to_string(path)?;
    parse_submission(&input, catalog)
}
