use std::path::{Path,PathBuf};
use std::fs;
use serde::{Serialize,Deserialize};
use crate::cycle::Cycle;
use crate::errors::{CoreError,Result};

/// the controller's sole persistent state: `{running, last_forecast_date}`.
///
/// Absence of the file on disk is equivalent to `{running: false, last_forecast_date: "1970010100"}`.
/// Mutation is read-modify-write, not compare-and-swap: concurrent controller instances over the
/// same output tree are disallowed by design, so there is no contention to arbitrate.
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct Lockfile {
    pub running: bool,
    pub last_forecast_date: String,
}

impl Lockfile {
    pub fn default_watermark() -> Self {
        Lockfile{ running: false, last_forecast_date: "1970010100".to_string() }
    }

    pub fn read_or_default (path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok( Self::default_watermark() )
        }

        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| CoreError::LockfileCorruption( format!("{path:?}: {e}") ))
    }

    /// the watermark as a parsed [`Cycle`]
    pub fn watermark (&self) -> Result<Cycle> {
        Cycle::parse_lockfile_form(&self.last_forecast_date)
    }

    /// durably overwrite the lockfile: write to a sibling temp path, then rename — the rename is
    /// atomic on the same filesystem, so a crash never leaves a half-written lockfile visible.
    pub fn write (&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = sibling_tmp_path(path);

        let data = serde_json::to_string_pretty(self)?;
        fs::write(&tmp_path, data.as_bytes())?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// acquire the lock: fails with [`CoreError::OpFailed`] (caller maps this to `LockHeld`) if
    /// already running; otherwise atomically marks `running = true` and returns the watermark
    /// that was in effect before acquisition.
    pub fn acquire (path: impl AsRef<Path>) -> Result<(Self, Cycle)> {
        let path = path.as_ref();
        let mut lock = Self::read_or_default(path)?;
        if lock.running {
            return Err( crate::errors::op_failed( format!(
                "lockfile {path:?} reports running=true; another controller instance owns the watermark") ) )
        }
        let watermark = lock.watermark()?;
        lock.running = true;
        lock.write(path)?;
        Ok((lock, watermark))
    }

    /// advance the watermark to `cycle`, keeping the lock held
    pub fn advance (&mut self, path: impl AsRef<Path>, cycle: Cycle) -> Result<()> {
        self.last_forecast_date = cycle.lockfile_form();
        self.running = true;
        self.write(path)
    }

    /// release the lock, leaving the watermark untouched
    pub fn release (&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.running = false;
        self.write(path)
    }
}

fn sibling_tmp_path (path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("lockfile");
    tmp.set_file_name( format!(".{name}.tmp") );
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path (tag: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push( format!("odin_rapid_lockfile_test_{}_{}.json", std::process::id(), tag) );
        p
    }

    #[test]
    fn missing_file_reads_as_default_watermark() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);
        let lock = Lockfile::read_or_default(&path).unwrap();
        assert!( !lock.running );
        assert_eq!( lock.last_forecast_date, "1970010100");
    }

    #[test]
    fn acquire_fails_when_already_running() {
        let path = temp_path("held");
        Lockfile{ running: true, last_forecast_date: "2020010100".into() }.write(&path).unwrap();
        assert!( Lockfile::acquire(&path).is_err() );
        fs::remove_file(&path).ok();
    }

    #[test]
    fn acquire_advance_release_roundtrip() {
        let path = temp_path("roundtrip");
        let _ = fs::remove_file(&path);

        let (mut lock, watermark) = Lockfile::acquire(&path).unwrap();
        assert_eq!( watermark.lockfile_form(), "1970010100");
        assert!( lock.running );

        let c = Cycle::parse_canonical("20200101.12").unwrap();
        lock.advance(&path, c).unwrap();
        assert!( lock.running );
        assert_eq!( lock.last_forecast_date, "2020010112");

        lock.release(&path).unwrap();
        assert!( !lock.running );

        let reread = Lockfile::read_or_default(&path).unwrap();
        assert!( !reread.running );
        assert_eq!( reread.last_forecast_date, "2020010112");

        fs::remove_file(&path).ok();
    }
}
