use std::{fs, io};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// Reads a newline-separated labels file, skipping blank lines.
pub(crate) fn file_to_vec<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
    let file_in = fs::File::open(filename)?;
    let file_reader = BufReader::new(file_in);
    Ok(file_reader
        .lines()
        .map_while(io::Result::ok)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

pub(crate) fn trace(profile: bool, l_type: &str, l_step: &str, start: Instant, prev_elapsed: Duration) -> Duration {
    if profile {
        log::debug!("{} | Total={:.2?} | {}={:.2?}", l_type, start.elapsed(), l_step, start.elapsed() - prev_elapsed);
    }
    else {
        log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, start.elapsed(), l_step, start.elapsed() - prev_elapsed);
    }
    start.elapsed()
}
