//! Reading documents and statements, writing results

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde_json::Value as Json;

use super::CliError;
use crate::pipeline::{Input, Output};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CliError + '_ {
    move |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn parse_json(text: &str, origin: &str) -> Result<Json, CliError> {
    serde_json::from_str(text).map_err(|source| CliError::Json {
        origin: origin.to_string(),
        source,
    })
}

/// Parses one file's worth of JSON; a top-level array is a batch.
pub fn parse_documents(text: &str, origin: &str) -> Result<Input, CliError> {
    match parse_json(text, origin)? {
        Json::Array(documents) => Ok(Input::Batch(documents)),
        document => Ok(Input::Single(document)),
    }
}

/// Loads a file (one document, or a batch if it holds an array) or a
/// directory (one document per regular file, in file-name order).
pub fn load_documents(path: &Path) -> Result<Input, CliError> {
    let metadata = fs::metadata(path).map_err(io_error(path))?;
    if metadata.is_file() {
        let text = fs::read_to_string(path).map_err(io_error(path))?;
        return parse_documents(&text, &path.display().to_string());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(path)
        .map_err(io_error(path))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_error(path))?;
    files.retain(|file| file.is_file());
    files.sort();

    let mut documents = Vec::with_capacity(files.len());
    for file in &files {
        debug!("loading {}", file.display());
        let text = fs::read_to_string(file).map_err(io_error(file))?;
        documents.push(parse_json(&text, &file.display().to_string())?);
    }
    Ok(Input::Batch(documents))
}

/// The statement texts of a run: the code file's lines when given, otherwise
/// the inline statements.
pub fn load_transformers(code_file: Option<&Path>, inline: &[String]) -> Result<Vec<String>, CliError> {
    match code_file {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(io_error(path))?;
            Ok(text.lines().map(str::to_string).collect())
        }
        None => Ok(inline.to_vec()),
    }
}

fn render(value: &Json, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(CliError::Serialize)
}

/// Writes results. A path whose last component contains `.` is a single file
/// holding the whole output; any other path is a directory of `0.json`,
/// `1.json`, ... `pretty` only affects the single-file form; per-document
/// files are always indented.
pub fn save_results(path: &Path, output: &Output, pretty: bool) -> Result<(), CliError> {
    let single_file = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().contains('.'));

    if single_file {
        let value = match output {
            Output::Single(document) => document.clone(),
            Output::Batch(documents) => Json::Array(documents.clone()),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        return fs::write(path, render(&value, pretty)?).map_err(io_error(path));
    }

    let Output::Batch(documents) = output else {
        return Err(CliError::OutputShape(path.to_path_buf()));
    };
    fs::create_dir_all(path).map_err(io_error(path))?;
    for (i, document) in documents.iter().enumerate() {
        let file = path.join(format!("{}.json", i));
        fs::write(&file, render(document, true)?).map_err(io_error(&file))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_array_is_batch() {
        assert_eq!(
            parse_documents(r#"[{"a": 1}, {"a": 2}]"#, "test").unwrap(),
            Input::Batch(vec![json!({"a": 1}), json!({"a": 2})])
        );
        assert_eq!(
            parse_documents(r#"{"a": 1}"#, "test").unwrap(),
            Input::Single(json!({"a": 1}))
        );
    }

    #[test]
    fn test_directory_loads_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"n": 2}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"n": 1}"#).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        assert_eq!(
            load_documents(dir.path()).unwrap(),
            Input::Batch(vec![json!({"n": 1}), json!({"n": 2})])
        );
    }

    #[test]
    fn test_code_file_overrides_inline() {
        let dir = tempfile::tempdir().unwrap();
        let code = dir.path().join("code.txt");
        fs::write(&code, "dst.a = 1\ndst.b = 2\n").unwrap();

        let inline = vec!["dst.c = 3".to_string()];
        assert_eq!(
            load_transformers(Some(&code), &inline).unwrap(),
            vec!["dst.a = 1", "dst.b = 2"]
        );
        assert_eq!(load_transformers(None, &inline).unwrap(), inline);
    }

    #[test]
    fn test_single_result_to_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("results");
        let err = save_results(&target, &Output::Single(json!({})), true).unwrap_err();
        assert!(matches!(err, CliError::OutputShape(_)));
    }

    #[test]
    fn test_directory_output_ignores_compact() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("results");
        let output = Output::Batch(vec![json!({"a": 1})]);
        save_results(&target, &output, false).unwrap();

        let written = fs::read_to_string(target.join("0.json")).unwrap();
        assert!(written.contains("\n  \"a\": 1"));
    }

    #[test]
    fn test_single_file_compact() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");
        let output = Output::Batch(vec![json!({"a": 1})]);
        save_results(&target, &output, false).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), r#"[{"a":1}]"#);
    }
}
