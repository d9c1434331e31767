use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// `None` for stdout (`-`).
pub fn destination(output: &str) -> Option<&Path> {
    match output {
        "" | "-" => None,
        p => Some(Path::new(p)),
    }
}

pub fn write_output(dest: Option<&Path>, text: &str) -> Result<()> {
    match dest {
        None => {
            let mut out = io::stdout().lock();
            out.write_all(text.as_bytes())
                .and_then(|_| out.flush())
                .context("error writing output to stdout")
        }
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("error creating directory [{}]", dir.display()))?;
            }
            fs::write(path, text)
                .with_context(|| format!("error writing output file [{}]", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_means_stdout() {
        assert_eq!(destination("-"), None);
        assert_eq!(destination(""), None);
        assert_eq!(destination("out/map.yaml"), Some(Path::new("out/map.yaml")));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("map.json");
        write_output(Some(&path), "{}\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }
}
