use std::path::Path;

use manifold_core::types::BlockLocation;

use crate::{DirEntry, FileStat, Fs, FsError, ReadSeek};

const LOCAL_HOST: &str = "localhost";

/// Local-disk implementation of the [`Fs`] capability.
///
/// Listings are name-sorted so enumeration order is stable across runs, and
/// `stat` reports one block spanning the whole file with host `localhost`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

fn map_io(err: std::io::Error, path: &Path) -> FsError {
    if err.kind() == std::io::ErrorKind::NotFound {
        FsError::NotFound(path.display().to_string())
    } else {
        FsError::Io(err)
    }
}

impl Fs for LocalFs {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>, FsError> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|err| map_io(err, dir))? {
            let entry = entry?;
            let meta = entry.metadata()?;
            out.push(DirEntry {
                path: entry.path(),
                is_dir: meta.is_dir(),
            });
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    fn stat(&self, path: &Path) -> Result<FileStat, FsError> {
        let meta = std::fs::metadata(path).map_err(|err| map_io(err, path))?;
        if meta.is_dir() {
            return Err(FsError::NotAFile(path.display().to_string()));
        }
        let len = meta.len();
        let blocks = if len == 0 {
            Vec::new()
        } else {
            vec![BlockLocation {
                offset: 0,
                len,
                hosts: vec![LOCAL_HOST.to_string()],
            }]
        };
        Ok(FileStat { len, blocks })
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn ReadSeek>, FsError> {
        let meta = std::fs::metadata(path).map_err(|err| map_io(err, path))?;
        if meta.is_dir() {
            return Err(FsError::NotAFile(path.display().to_string()));
        }
        let file = std::fs::File::open(path).map_err(|err| map_io(err, path))?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Seek, SeekFrom};
    use std::path::PathBuf;

    use super::*;

    fn temp_root(test_name: &str) -> anyhow::Result<PathBuf> {
        let mut root = std::env::temp_dir();
        let suffix = format!(
            "manifold-fs-{}-{}-{}",
            test_name,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis()
        );
        root.push(suffix);
        std::fs::create_dir_all(&root)?;
        Ok(root)
    }

    #[test]
    fn list_is_name_sorted() -> anyhow::Result<()> {
        let root = temp_root("list-sorted")?;
        std::fs::write(root.join("b"), b"")?;
        std::fs::write(root.join("a"), b"")?;
        std::fs::create_dir(root.join("c"))?;

        let entries = LocalFs::new().list(&root)?;
        let names: Vec<_> = entries
            .iter()
            .map(|e| e.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(!entries[0].is_dir);
        assert!(entries[2].is_dir);
        Ok(())
    }

    #[test]
    fn stat_reports_length_and_single_block() -> anyhow::Result<()> {
        let root = temp_root("stat-len")?;
        let path = root.join("data");
        std::fs::write(&path, b"0123456789")?;

        let stat = LocalFs::new().stat(&path)?;
        assert_eq!(stat.len, 10);
        assert_eq!(stat.blocks.len(), 1);
        assert_eq!(stat.blocks[0].offset, 0);
        assert_eq!(stat.blocks[0].len, 10);
        assert_eq!(stat.blocks[0].hosts, vec!["localhost".to_string()]);
        Ok(())
    }

    #[test]
    fn stat_empty_file_has_no_blocks() -> anyhow::Result<()> {
        let root = temp_root("stat-empty")?;
        let path = root.join("empty");
        std::fs::write(&path, b"")?;

        let stat = LocalFs::new().stat(&path)?;
        assert_eq!(stat.len, 0);
        assert!(stat.blocks.is_empty());
        Ok(())
    }

    #[test]
    fn stat_missing_path_is_not_found() -> anyhow::Result<()> {
        let root = temp_root("stat-missing")?;
        let err = LocalFs::new().stat(&root.join("absent")).unwrap_err();
        assert!(matches!(err, FsError::NotFound(_)), "got {err:?}");
        Ok(())
    }

    #[test]
    fn stat_directory_is_not_a_file() -> anyhow::Result<()> {
        let root = temp_root("stat-dir")?;
        let err = LocalFs::new().stat(&root).unwrap_err();
        assert!(matches!(err, FsError::NotAFile(_)), "got {err:?}");
        Ok(())
    }

    #[test]
    fn open_read_supports_seek() -> anyhow::Result<()> {
        let root = temp_root("open-seek")?;
        let path = root.join("data");
        std::fs::write(&path, b"hello")?;

        let mut stream = LocalFs::new().open_read(&path)?;
        stream.seek(SeekFrom::Start(1))?;
        let mut buf = String::new();
        stream.read_to_string(&mut buf)?;
        assert_eq!(buf, "ello");
        Ok(())
    }
}
