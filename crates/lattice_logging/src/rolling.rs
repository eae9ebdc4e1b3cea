//! Size-capped log files.
//!
//! `app.log` is always the live file. When a write would push it past the
//! size cap it becomes `app.log.1`, older generations shift up by one, and
//! anything past `max_files` is deleted.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub(crate) struct RollingFile {
    dir: PathBuf,
    stem: String,
    max_files: usize,
    max_size: u64,
    live: Option<File>,
    written: u64,
}

impl RollingFile {
    pub(crate) fn open(
        dir: &Path,
        app_name: &str,
        max_files: usize,
        max_size: u64,
    ) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut rolling = Self {
            dir: dir.to_path_buf(),
            stem: file_stem(app_name),
            max_files: max_files.max(1),
            max_size,
            live: None,
            written: 0,
        };
        rolling.reopen()?;
        if rolling.written > rolling.max_size {
            rolling.roll()?;
        }
        Ok(rolling)
    }

    fn path(&self, generation: usize) -> PathBuf {
        match generation {
            0 => self.dir.join(format!("{}.log", self.stem)),
            n => self.dir.join(format!("{}.log.{}", self.stem, n)),
        }
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(0))?;
        self.written = file.metadata()?.len();
        self.live = Some(file);
        Ok(())
    }

    fn roll(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.live.take() {
            let _ = file.flush();
        }

        let keep = self.max_files - 1;
        if keep == 0 {
            // Single-file mode: start the live file over.
            fs::remove_file(self.path(0)).or_else(ignore_missing)?;
            return self.reopen();
        }

        fs::remove_file(self.path(keep)).or_else(ignore_missing)?;
        for generation in (0..keep).rev() {
            fs::rename(self.path(generation), self.path(generation + 1)).or_else(ignore_missing)?;
        }
        self.reopen()
    }
}

fn ignore_missing(err: io::Error) -> io::Result<()> {
    if err.kind() == io::ErrorKind::NotFound {
        Ok(())
    } else {
        Err(err)
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_size {
            self.roll()?;
        }
        let file = self
            .live
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.live.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// `MakeWriter` over one shared [`RollingFile`].
#[derive(Clone)]
pub(crate) struct SharedWriter(Arc<Mutex<RollingFile>>);

impl SharedWriter {
    pub(crate) fn new(file: RollingFile) -> Self {
        Self(Arc::new(Mutex::new(file)))
    }

    fn with<R>(&self, f: impl FnOnce(&mut RollingFile) -> io::Result<R>) -> io::Result<R> {
        let mut file = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        f(&mut file)
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with(|file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => ch,
            _ => '_',
        })
        .collect();
    if stem.is_empty() {
        "lattice".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_appends_to_live_file() {
        let dir = TempDir::new().unwrap();
        let mut file = RollingFile::open(dir.path(), "latticed", 3, 1024).unwrap();
        file.write_all(b"one\n").unwrap();
        file.write_all(b"two\n").unwrap();
        file.flush().unwrap();
        assert_eq!(read(dir.path().join("latticed.log")), "one\ntwo\n");
    }

    #[test]
    fn test_rolls_and_caps_generations() {
        let dir = TempDir::new().unwrap();
        let mut file = RollingFile::open(dir.path(), "app", 3, 8).unwrap();
        for line in ["aaaaaa\n", "bbbbbb\n", "cccccc\n", "dddddd\n"] {
            file.write_all(line.as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(read(dir.path().join("app.log")), "dddddd\n");
        assert_eq!(read(dir.path().join("app.log.1")), "cccccc\n");
        assert_eq!(read(dir.path().join("app.log.2")), "bbbbbb\n");
        assert!(!dir.path().join("app.log.3").exists());
    }

    #[test]
    fn test_single_file_mode_truncates() {
        let dir = TempDir::new().unwrap();
        let mut file = RollingFile::open(dir.path(), "solo", 1, 8).unwrap();
        file.write_all(b"first!\n").unwrap();
        file.write_all(b"second\n").unwrap();
        file.flush().unwrap();
        assert_eq!(read(dir.path().join("solo.log")), "second\n");
        assert!(!dir.path().join("solo.log.1").exists());
    }

    #[test]
    fn test_oversized_existing_file_rolls_on_open() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.log"), "0123456789abcdef").unwrap();
        let _file = RollingFile::open(dir.path(), "app", 2, 8).unwrap();
        assert_eq!(read(dir.path().join("app.log.1")), "0123456789abcdef");
        assert_eq!(read(dir.path().join("app.log")), "");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("latticed"), "latticed");
        assert_eq!(file_stem("my app/v2"), "my_app_v2");
        assert_eq!(file_stem(""), "lattice");
    }
}
