use std::{io, path::Path};

use crate::workspace::{DirectoryReader, relative_path};

/// Maximum number of paths a single search returns.
pub const SEARCH_LIMIT: usize = 30;

/// Finds markdown files whose path relative to `root` contains `query`,
/// ignoring case.
///
/// Results come back in the order the directories enumerate their entries,
/// depth-first. A blank query matches nothing and reads nothing.
pub fn search_paths<R>(reader: &R, root: &Path, query: &str) -> io::Result<Vec<String>>
where
    R: DirectoryReader + ?Sized,
{
    let needle = query.trim().to_lowercase();
    let mut matches = Vec::new();
    if needle.is_empty() {
        return Ok(matches);
    }

    collect_matches(reader, root, root, &needle, &mut matches)?;
    Ok(matches)
}

fn collect_matches<R>(
    reader: &R,
    dir: &Path,
    root: &Path,
    needle: &str,
    matches: &mut Vec<String>,
) -> io::Result<()>
where
    R: DirectoryReader + ?Sized,
{
    for entry in reader.read_dir(dir)? {
        if matches.len() >= SEARCH_LIMIT {
            break;
        }
        if entry.is_excluded() {
            continue;
        }

        let path = dir.join(&entry.name);
        if entry.is_dir {
            collect_matches(reader, &path, root, needle, matches)?;
        } else if entry.is_markdown() {
            let relative = relative_path(root, &path);
            if relative.to_lowercase().contains(needle) {
                matches.push(relative);
            }
        }
    }

    Ok(())
}
