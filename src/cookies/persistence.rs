//! Cookie persistence - save and load cookies to/from disk.
//!
//! The file holds one cookie per line in `Set-Cookie` form, CRLF-separated,
//! exactly as produced by [`CookieJar::export`].

use crate::cookies::cookiejar::CookieJar;
use std::fs;
use std::io;
use std::path::Path;

/// Write every unexpired cookie in `jar` to `path`.
///
/// # Example
/// ```ignore
/// persistence::save_cookies(&jar, Path::new("/path/to/cookies.txt"))?;
/// ```
pub fn save_cookies(jar: &CookieJar, path: &Path) -> io::Result<()> {
    fs::write(path, jar.export())?;
    tracing::debug!(path = %path.display(), count = jar.len(), "cookies saved");
    Ok(())
}

/// Store every cookie line in `path` into `jar`. A missing file is not an
/// error. Lines that fail to parse are skipped.
///
/// # Example
/// ```ignore
/// let loaded = persistence::load_cookies(&mut jar, Path::new("/path/to/cookies.txt"))?;
/// ```
pub fn load_cookies(jar: &mut CookieJar, path: &Path) -> io::Result<usize> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut stored = 0;
    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match jar.store_from_line(line, None) {
            Ok(_) => stored += 1,
            Err(e) => tracing::debug!(error = %e, line, "skipping cookie line"),
        }
    }

    tracing::debug!(path = %path.display(), stored, "cookies loaded");
    Ok(stored)
}
