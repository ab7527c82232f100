use anyhow::Context;
use chrono::NaiveDateTime;
use std::fs;
use std::path::Path;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses a local wall-clock timestamp such as `2026-10-18T10:02`.
pub fn parse_local_ts(raw: &str) -> anyhow::Result<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .with_context(|| format!("invalid timestamp {raw:?}, expected YYYY-MM-DDTHH:MM[:SS]"))
}

pub fn atomic_write(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data).context("write temp file")?;
    fs::rename(&tmp, path).context("rename temp file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parse_minutes_and_seconds() {
        let ts = parse_local_ts("2026-10-18T10:02").unwrap();
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (10, 2, 0));
        let ts = parse_local_ts(" 2026-10-18T23:59:30 ").unwrap();
        assert_eq!(ts.second(), 30);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_local_ts("10:02").is_err());
    }
}
