use anyhow::{bail, Context, Result};
use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::Path;

/// Read from a driver pseudo-file into `buf`, retrying interrupted syscalls.
///
/// The blind-scan interface expects one read per logical message, so the file is
/// opened fresh for every call and closed on return. The loop runs until `buf`
/// is full, the driver reports end-of-data (a zero-length read), or a real error
/// occurs. A partial transfer followed by an error still counts as a transfer.
pub fn read_device(path: impl AsRef<Path>, buf: &mut [u8]) -> Result<usize> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut done = 0usize;
    while done < buf.len() {
        match file.read(&mut buf[done..]) {
            Ok(0) => break,
            Ok(n) => done += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) if done > 0 => break,
            Err(e) => {
                return Err(e).with_context(|| format!("read from {} failed", path.display()))
            }
        }
    }

    if done == 0 {
        bail!("no data read from {}", path.display());
    }
    Ok(done)
}

/// Write `buf` to a driver pseudo-file, retrying interrupted syscalls.
///
/// Same transfer contract as [`read_device`]: open per call, loop to completion,
/// zero bytes ever moved is a failure.
pub fn write_device(path: impl AsRef<Path>, buf: &[u8]) -> Result<usize> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut done = 0usize;
    while done < buf.len() {
        match file.write(&buf[done..]) {
            Ok(0) => break,
            Ok(n) => done += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) if done > 0 => break,
            Err(e) => {
                return Err(e).with_context(|| format!("write to {} failed", path.display()))
            }
        }
    }

    if done == 0 {
        bail!("no data written to {}", path.display());
    }
    Ok(done)
}

/// Read one driver response as text. Driver responses are short ASCII lines;
/// anything that is not valid UTF-8 is replaced rather than rejected.
pub fn read_string(path: impl AsRef<Path>) -> Result<String> {
    let mut buf = [0u8; 4096];
    let n = read_device(path, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}

/// Write one text message to a driver pseudo-file.
pub fn write_str(path: impl AsRef<Path>, msg: &str) -> Result<()> {
    write_device(path, msg.as_bytes())?;
    Ok(())
}
