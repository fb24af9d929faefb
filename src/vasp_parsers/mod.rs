pub mod poscar;
pub mod chg;

use std::{
    ffi::OsString,
    fs::{
        self,
        File,
    },
    io::{
        self,
        BufRead,
        BufReader,
        BufWriter,
    },
    path::Path,
};

use flate2::read::GzDecoder;

use crate::error::{
    ChgError,
    ChgResult,
};


/// Open a text file for reading, `.gz` files are decompressed on the fly.
pub fn open_text(path: &(impl AsRef<Path> + ?Sized)) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let is_gz = path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if is_gz {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}


/// Write through a sibling temporary file which is renamed over `path` once complete.
///
/// Readers of `path` never observe a half written file, the temporary file is removed
/// if anything fails.
pub fn write_atomic<F>(path: &(impl AsRef<Path> + ?Sized), f: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let path = path.as_ref();
    let fname = path.file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("{:?} is not a file path", path)))?;

    let mut tmpname = OsString::from(".");
    tmpname.push(fname);
    tmpname.push(".partial");
    let tmppath = path.with_file_name(tmpname);

    let ret = (|| {
        let mut w = BufWriter::new(File::create(&tmppath)?);
        f(&mut w)?;
        w.into_inner()
            .map_err(|e| e.into_error())?
            .sync_all()?;
        fs::rename(&tmppath, path)
    })();

    if ret.is_err() {
        let _ = fs::remove_file(&tmppath);
    }
    ret
}


/// Most elements reserved up front from a size read in a file header. Larger buffers
/// grow only as the data actually arrives.
pub(crate) const MAX_PREALLOC: usize = 1 << 22;


/// Line cursor that reuses one buffer and keeps track of the line number for error
/// messages.
pub(crate) struct LineReader<R> {
    inner:  R,
    buf:    String,
    lineno: usize,
}


impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: String::new(),
            lineno: 0,
        }
    }

    /// Number of the line returned by the last `next_line` call, starting from 1.
    pub fn lineno(&self) -> usize {
        self.lineno
    }

    /// Returns the line number and the line without its terminator, `None` at EOF.
    pub fn next_line(&mut self) -> ChgResult<Option<(usize, &str)>> {
        self.buf.clear();
        if self.inner.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.lineno += 1;
        Ok(Some((self.lineno, self.buf.trim_end_matches(['\n', '\r']))))
    }

    pub fn expect_line(&mut self, what: &str) -> ChgResult<(usize, &str)> {
        let lineno = self.lineno + 1;
        self.next_line()?
            .ok_or_else(|| ChgError::format(
                    format!("unexpected end of file at line {}, expecting {}", lineno, what)))
    }
}


/// Parse exactly `n` leading whitespace separated tokens, the rest of the line is ignored.
pub(crate) fn parse_leading<T: std::str::FromStr>(line: &str, n: usize, what: &str, lineno: usize) -> ChgResult<Vec<T>> {
    let ret = line.split_whitespace()
        .take(n)
        .map(|x| x.parse::<T>()
             .map_err(|_| ChgError::format(format!("line {}: cannot parse {:?} in {}", lineno, x, what))))
        .collect::<ChgResult<Vec<T>>>()?;

    if ret.len() != n {
        return Err(ChgError::format(
                format!("line {}: {} requires {} numbers, found {}", lineno, what, n, ret.len())));
    }
    Ok(ret)
}


#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn test_write_atomic() -> io::Result<()> {
        let dir = TempDir::new("rschg_atomic")?;
        let path = dir.path().join("out.txt");

        write_atomic(&path, |w| writeln!(w, "hello"))?;
        assert_eq!(fs::read_to_string(&path)?, "hello\n");

        let ret = write_atomic(&path, |w| {
            writeln!(w, "partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "interrupted"))
        });
        assert!(ret.is_err());
        assert_eq!(fs::read_to_string(&path)?, "hello\n");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_parse_leading() {
        assert_eq!(parse_leading::<usize>("  2 3 4 extra", 3, "grid", 1).unwrap(), vec![2, 3, 4]);
        assert!(parse_leading::<usize>("2 3", 3, "grid", 1).is_err());
        assert!(parse_leading::<usize>("2 -3 4", 3, "grid", 1).is_err());
    }
}
