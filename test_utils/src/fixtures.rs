use std::{
    fmt,
    fs::File,
    io::Read,
    path::PathBuf,
};

#[derive(Copy, Clone)]
pub enum FixtureFormat {
    /// `coverage-summary.json` style documents, optionally with the
    /// `statementMap`/`s` detail merged in.
    JsonSummary,
}

impl fmt::Display for FixtureFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FixtureFormat::JsonSummary => write!(f, "json-summary"),
        }
    }
}

pub fn fixture_path(format: FixtureFormat, name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(format.to_string())
        .join(name)
}

#[track_caller]
pub fn open_fixture(format: FixtureFormat, name: &str) -> Result<File, &'static str> {
    File::open(fixture_path(format, name)).map_err(|_| "failed to open file")
}

pub fn read_fixture(format: FixtureFormat, name: &str) -> Result<Vec<u8>, &'static str> {
    let mut file = open_fixture(format, name)?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .map_err(|_| "failed to read file")?;
    Ok(buf)
}
