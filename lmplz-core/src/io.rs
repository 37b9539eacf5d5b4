use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a corpus file, one sentence per line.
///
/// Blank lines carry no n-grams and are skipped; `\r\n` endings are
/// accepted.
pub fn read_sentences<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
	let text = fs::read_to_string(path)?;
	Ok(text
		.lines()
		.filter(|line| !line.trim().is_empty())
		.map(str::to_owned)
		.collect())
}

/// Path of a file stored next to `input_path` under the same stem, e.g. the
/// summary `data/corpus.bin` of `data/corpus.txt`.
///
/// # Errors
/// [`io::ErrorKind::InvalidInput`] if `input_path` names no file.
pub fn sibling_path<P: AsRef<Path>>(input_path: P, extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();
	if input_path.file_stem().is_none() {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, "Input path has no file name"));
	}
	Ok(input_path.with_extension(extension))
}

/// Resolves the temporary directory setting: empty means the OS temp dir,
/// `.` and `./` the working directory; anything else is kept verbatim.
pub fn normalize_folder(input: &str) -> PathBuf {
	match input {
		"" => env::temp_dir(),
		"." | "./" => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
		_ => PathBuf::from(input),
	}
}
