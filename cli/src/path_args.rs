use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

const ANSWER_FILE_EXTENSIONS: [&str; 2] = ["md", "txt"];

fn is_answer_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ANSWER_FILE_EXTENSIONS.contains(&ext))
}

fn collect_from_dir(path: PathBuf, acc: &mut Vec<PathBuf>) -> io::Result<()> {
    let file_type = fs::metadata(&path)?.file_type();
    if file_type.is_file() {
        if is_answer_file(&path) {
            acc.push(path);
        }
    } else if file_type.is_dir() {
        for entry in fs::read_dir(path)? {
            collect_from_dir(entry?.path(), acc)?;
        }
    } else {
        log::warn!("skipping '{}': not a file or directory", path.display());
    }
    Ok(())
}

/// Expands the given paths into answer files. Files passed explicitly are kept whatever their
/// extension; directories are searched recursively. The result is sorted.
pub fn answer_files_from_paths<'a, T>(paths: T) -> io::Result<Vec<PathBuf>>
where
    T: Iterator<Item = &'a str>,
{
    let mut result = Vec::new();
    for p in paths {
        if fs::metadata(p)?.file_type().is_file() {
            result.push(p.into());
        } else {
            collect_from_dir(p.into(), &mut result)?;
        }
    }
    result.sort();
    result.dedup();
    Ok(result)
}
