//! Raw sample sources: per-time directories and streamed tar.gz archives.
//!
//! Both backends expose the same contract: given a list of members (one file of
//! one saved time each), hand the text of every member to a visitor, in the
//! order the members were requested. The archive is read as a forward-only
//! stream, exactly once, and the scan stops as soon as every requested member
//! has been seen.
//!
//! Archive members stored ahead of their turn are held in memory as text until
//! every earlier member has been visited. When the archive layout matches the
//! request order nothing is held; in the worst case (the first requested member
//! stored last) all requested members are in memory at once. Solver archives are
//! written in time order, and `saved_times` sorts numerically, so the usual cost
//! is the handful of members whose lexicographic and numeric order differ.

use crate::error::PostError;
use crate::io::table::parse_columns;
use crate::io::time::{filter_times, time_to_str};
use anyhow::{Context, Result, ensure};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tar::Archive;

/// What to do when requested time instants are absent from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// Any missing instant is an error.
    #[default]
    Strict,
    /// Missing instants are skipped with a warning; averages use the found count.
    BestEffort,
}

/// One file of one saved time instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub time: f64,
    pub file_name: String,
}

impl Member {
    pub fn new(time: f64, file_name: impl Into<String>) -> Self {
        Self {
            time,
            file_name: file_name.into(),
        }
    }

    /// Path relative to the subsystem root: `<time>/<file>`.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", time_to_str(self.time), self.file_name)
    }
}

/// Which columns of a raw file hold coordinates and which hold field values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub file_name: String,
    pub coords: Vec<usize>,
    pub values: Vec<usize>,
}

impl ColumnSpec {
    pub fn new(file_name: impl Into<String>, coords: &[usize], values: &[usize]) -> Self {
        Self {
            file_name: file_name.into(),
            coords: coords.to_vec(),
            values: values.to_vec(),
        }
    }

    /// Parses the raw text of one member into coordinate and value columns.
    pub fn parse(&self, time: f64, text: &str, origin: &Path) -> Result<RawSample> {
        let usecols: Vec<usize> = self.coords.iter().chain(&self.values).copied().collect();
        let mut columns = parse_columns(text, &usecols, origin)?;
        let values = columns.split_off(self.coords.len());
        Ok(RawSample {
            time,
            coords: columns,
            values,
        })
    }
}

/// Coordinate and value columns read for one time instant.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub time: f64,
    pub coords: Vec<Vec<f64>>,
    pub values: Vec<Vec<f64>>,
}

impl RawSample {
    /// Number of sampled points.
    pub fn len(&self) -> usize {
        self.coords
            .first()
            .or(self.values.first())
            .map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `<root>/<time>/<file>` layout, e.g. `.../postProcessing/wallPressure`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, member: &Member) -> PathBuf {
        self.root
            .join(time_to_str(member.time))
            .join(&member.file_name)
    }

    fn scan<F>(&self, members: &[Member], coverage: Coverage, visit: &mut F) -> Result<usize>
    where
        F: FnMut(usize, &str) -> Result<()>,
    {
        let mut found = 0;
        let mut missing = Vec::new();

        for (idx, member) in members.iter().enumerate() {
            let path = self.path_of(member);
            match fs::read_to_string(&path) {
                Ok(text) => {
                    log::debug!("read {}", path.display());
                    visit(idx, &text)?;
                    found += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => match coverage {
                    Coverage::Strict => {
                        return Err(PostError::MissingInstants {
                            source_name: self.root.display().to_string(),
                            missing: vec![member.relative_path()],
                        }
                        .into());
                    }
                    Coverage::BestEffort => missing.push(member.relative_path()),
                },
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to read file: {}", path.display()));
                }
            }
        }

        if !missing.is_empty() {
            log::warn!(
                "{}: skipping {} missing instant(s): {}",
                self.root.display(),
                missing.len(),
                missing.join(", ")
            );
        }
        Ok(found)
    }

    fn saved_times(&self, limits: (f64, f64), stride: usize) -> Result<Vec<f64>> {
        crate::io::time::saved_times(&self.root, limits, stride)
    }
}

/// Gzip-compressed tar archive holding `<prefix>/<time>/<file>` members.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    path: PathBuf,
    prefix: String,
}

impl ArchiveSource {
    /// `prefix` is the member directory of the subsystem, e.g. `postProcessing/wallPressure`.
    pub fn new(path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full member name inside the archive.
    pub fn member_name(&self, member: &Member) -> String {
        format!("{}/{}", self.prefix, member.relative_path())
    }

    fn open(&self) -> Result<Archive<GzDecoder<BufReader<File>>>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open archive: {}", self.path.display()))?;
        Ok(Archive::new(GzDecoder::new(BufReader::new(file))))
    }

    fn scan<F>(&self, members: &[Member], coverage: Coverage, visit: &mut F) -> Result<usize>
    where
        F: FnMut(usize, &str) -> Result<()>,
    {
        let mut pending: HashMap<String, usize> = members
            .iter()
            .enumerate()
            .map(|(i, m)| (self.member_name(m), i))
            .collect();
        ensure!(
            pending.len() == members.len(),
            "duplicate members requested from {}",
            self.path.display()
        );

        // Members arriving ahead of their turn wait here, so the visitor always
        // sees them in request order whatever the archive layout.
        let mut waiting: BTreeMap<usize, String> = BTreeMap::new();
        let mut max_waiting = 0;
        let mut next = 0;
        let mut found = 0;

        let mut archive = self.open()?;
        let entries = archive
            .entries()
            .with_context(|| format!("Failed to read archive: {}", self.path.display()))?;
        for entry in entries {
            if pending.is_empty() {
                break;
            }
            let mut entry = entry
                .with_context(|| format!("Corrupt entry in archive: {}", self.path.display()))?;
            let name = entry.path()?.to_string_lossy().into_owned();
            let Some(idx) = pending.remove(&name) else {
                continue;
            };

            let mut text = String::new();
            entry
                .read_to_string(&mut text)
                .with_context(|| format!("Failed to read archive member: {name}"))?;
            log::debug!("matched archive member {name}");
            found += 1;

            waiting.insert(idx, text);
            while let Some(text) = waiting.remove(&next) {
                visit(next, &text)?;
                next += 1;
            }
            max_waiting = max_waiting.max(waiting.len());
        }
        if max_waiting > 0 {
            log::debug!(
                "{}: held up to {max_waiting} member(s) ahead of their turn",
                self.path.display()
            );
        }

        if !pending.is_empty() {
            let mut missing: Vec<(usize, String)> =
                pending.into_iter().map(|(name, i)| (i, name)).collect();
            missing.sort_unstable();
            let missing: Vec<String> = missing.into_iter().map(|(_, name)| name).collect();
            match coverage {
                Coverage::Strict => {
                    return Err(PostError::MissingInstants {
                        source_name: self.path.display().to_string(),
                        missing,
                    }
                    .into());
                }
                Coverage::BestEffort => log::warn!(
                    "{}: skipping {} missing member(s): {}",
                    self.path.display(),
                    missing.len(),
                    missing.join(", ")
                ),
            }
        }

        for (idx, text) in waiting {
            visit(idx, &text)?;
        }
        Ok(found)
    }

    /// Time values of all members under the prefix; needs a full scan.
    fn saved_times(&self, limits: (f64, f64), stride: usize) -> Result<Vec<f64>> {
        ensure!(stride > 0, "stride must be at least 1");
        let root = format!("{}/", self.prefix);

        let mut times: Vec<f64> = Vec::new();
        let mut archive = self.open()?;
        for entry in archive
            .entries()
            .with_context(|| format!("Failed to read archive: {}", self.path.display()))?
        {
            let entry = entry?;
            let name = entry.path()?.to_string_lossy().into_owned();
            let Some(rest) = name.strip_prefix(&root) else {
                continue;
            };
            let Some((time, _)) = rest.split_once('/') else {
                continue;
            };
            if let Ok(t) = time.parse::<f64>() {
                times.push(t);
            }
        }
        times.sort_by(f64::total_cmp);
        times.dedup();

        Ok(filter_times(times, limits, stride))
    }
}

/// Where raw samples are read from. Exactly one backend per source.
#[derive(Debug, Clone)]
pub enum SampleSource {
    Directory(DirectorySource),
    Archive(ArchiveSource),
}

impl SampleSource {
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        Self::Directory(DirectorySource::new(root))
    }

    pub fn archive(path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self::Archive(ArchiveSource::new(path, prefix))
    }

    /// Human-readable location, used in log and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Directory(d) => d.root.display().to_string(),
            Self::Archive(a) => format!("{}:{}", a.path.display(), a.prefix),
        }
    }

    /// Path naming a member in error messages.
    pub fn origin(&self, member: &Member) -> PathBuf {
        match self {
            Self::Directory(d) => d.path_of(member),
            Self::Archive(a) => a.path.join(a.member_name(member)),
        }
    }

    /// Hands the text of each found member to `visit(index, text)`, in request order.
    ///
    /// Returns the number of members found. See [`Coverage`] for missing members.
    pub fn scan<F>(&self, members: &[Member], coverage: Coverage, mut visit: F) -> Result<usize>
    where
        F: FnMut(usize, &str) -> Result<()>,
    {
        match self {
            Self::Directory(d) => d.scan(members, coverage, &mut visit),
            Self::Archive(a) => a.scan(members, coverage, &mut visit),
        }
    }

    /// Reads the full text of a single member.
    pub fn read_text(&self, member: &Member) -> Result<String> {
        let mut out = String::new();
        self.scan(std::slice::from_ref(member), Coverage::Strict, |_, text| {
            out = text.to_string();
            Ok(())
        })?;
        Ok(out)
    }

    /// Reads the columns described by `spec` at one time instant.
    pub fn read(&self, time: f64, spec: &ColumnSpec) -> Result<RawSample> {
        let member = Member::new(time, spec.file_name.clone());
        let text = self.read_text(&member)?;
        spec.parse(time, &text, &self.origin(&member))
    }

    /// Saved time values available in the source (sorted, windowed, thinned).
    pub fn saved_times(&self, limits: (f64, f64), stride: usize) -> Result<Vec<f64>> {
        match self {
            Self::Directory(d) => d.saved_times(limits, stride),
            Self::Archive(a) => a.saved_times(limits, stride),
        }
    }
}
