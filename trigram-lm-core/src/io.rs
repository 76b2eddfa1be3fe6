use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::scoring::{SENTENCE_END, SENTENCE_START};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Reads a whitespace-tokenised corpus, one sentence per line.
///
/// Blank lines are skipped. Each sentence is wrapped with boundary markers
/// (see `with_boundaries`).
pub fn read_sentences<P: AsRef<Path>>(filename: P) -> io::Result<Vec<Vec<String>>> {
	Ok(read_file(filename)?
		.iter()
		.map(|line| line.split_whitespace().collect::<Vec<_>>())
		.filter(|words| !words.is_empty())
		.map(|words| with_boundaries(&words))
		.collect())
}

/// Reads a corpus file as one flat token stream (see `read_sentences`).
pub fn read_tokens<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	Ok(read_sentences(filename)?.into_iter().flatten().collect())
}

/// Prepends `<s>` and appends `</s>` when they are missing.
pub fn with_boundaries<S: AsRef<str>>(words: &[S]) -> Vec<String> {
	let mut sentence: Vec<String> = Vec::with_capacity(words.len() + 2);
	if words.first().map(|w| w.as_ref()) != Some(SENTENCE_START) {
		sentence.push(SENTENCE_START.to_owned());
	}
	sentence.extend(words.iter().map(|w| w.as_ref().to_owned()));
	if words.last().map(|w| w.as_ref()) != Some(SENTENCE_END) {
		sentence.push(SENTENCE_END.to_owned());
	}
	sentence
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/input.txt` + `"full.bin"` → `data/input.full.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn boundaries_are_added_once() {
		assert_eq!(with_boundaries(&["a", "b"]), vec!["<s>", "a", "b", "</s>"]);
		assert_eq!(with_boundaries(&["<s>", "a", "</s>"]), vec!["<s>", "a", "</s>"]);
	}

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("data/corpus.txt", "full.bin").unwrap();
		assert_eq!(path, PathBuf::from("data/corpus.full.bin"));
	}

	#[test]
	fn read_sentences_skips_blank_lines() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("corpus.txt");
		let mut file = File::create(&path).unwrap();
		writeln!(file, "the cat sat").unwrap();
		writeln!(file).unwrap();
		writeln!(file, "  the dog  ").unwrap();

		let sentences = read_sentences(&path).unwrap();
		assert_eq!(sentences.len(), 2);
		assert_eq!(sentences[1], vec!["<s>", "the", "dog", "</s>"]);
		assert_eq!(read_tokens(&path).unwrap().len(), 9);
	}

	#[test]
	fn list_files_filters_extension() {
		let dir = tempfile::tempdir().unwrap();
		File::create(dir.path().join("b.txt")).unwrap();
		File::create(dir.path().join("a.txt")).unwrap();
		File::create(dir.path().join("a.full.bin")).unwrap();

		assert_eq!(list_files(dir.path(), "txt").unwrap(), vec!["a.txt", "b.txt"]);
	}
}
