//! Derived datasets of a simulation case, with their text caches.
//!
//! A case directory holds the raw samples under `output/LES/postProcessing/`
//! (or the same tree packed in `output/LES/postProcessing.tar.gz`) and the
//! derived tables under `data/`.

use crate::config::{CenterlineConfig, PostConfig, ProfilesConfig};
use crate::geom::planar::Point2;
use crate::geom::point::convert::points_from_columns;
use crate::io::{
    ColumnSpec, Coverage, RawSample, SampleSource, read_delimited, read_forces, read_table,
    write_table,
};
use crate::post::coefficients::{FlowReference, force_coefficients, pressure_coefficient};
use crate::post::interp::{RegularGrid, spanwise_profile};
use crate::post::reduce::{time_average, time_average_many, time_average_with};
use crate::post::reorder::SectionOrdering;
use crate::post::spanwise::spanwise_average;
use crate::post::stats::{Stats, stats, strouhal};
use anyhow::{Result, ensure};
use std::path::{Path, PathBuf};

pub const FORCES: &str = "forces";
pub const WALL_PRESSURE: &str = "wallPressure";
pub const SURFACE_PROFILES: &str = "surfaceProfiles";

pub const PRESSURE_FILE: &str = "p_snake.raw";
pub const CENTERLINE_FILE: &str = "U_yNormal_x0.0.raw";

/// Raw slice file of the vertical profile at `x`.
pub fn profile_file(x: f64) -> String {
    format!("U_xNormal_x{:.2}.raw", x)
}

/// Which storage the raw samples are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Directory,
    Archive,
}

/// A simulation case directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub label: String,
    pub dir: PathBuf,
}

impl Case {
    pub fn new(label: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            dir: dir.into(),
        }
    }

    pub fn post_dir(&self) -> PathBuf {
        self.dir.join("output").join("LES").join("postProcessing")
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.join("output").join("LES").join("postProcessing.tar.gz")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.join("data")
    }

    pub fn cache_path(&self, name: &str) -> PathBuf {
        self.data_dir().join(name)
    }

    /// Raw samples of one post-processing subsystem (e.g. `wallPressure`).
    pub fn source(&self, subsystem: &str, backend: Backend) -> SampleSource {
        match backend {
            Backend::Directory => SampleSource::directory(self.post_dir().join(subsystem)),
            Backend::Archive => {
                SampleSource::archive(self.archive_path(), format!("postProcessing/{subsystem}"))
            }
        }
    }

    /// Saved times of a subsystem selected by the time window and stride of `config`.
    pub fn times(&self, subsystem: &str, backend: Backend, config: &PostConfig) -> Result<Vec<f64>> {
        self.source(subsystem, backend)
            .saved_times(config.time.limits(), config.stride)
    }
}

fn expect_columns(columns: &[Vec<f64>], expected: usize, path: &Path) -> Result<()> {
    ensure!(
        columns.len() == expected,
        "{}: expected {expected} columns, found {}",
        path.display(),
        columns.len()
    );
    Ok(())
}

/// Drag, lift and spanwise force coefficients over time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForceCoefficients {
    pub times: Vec<f64>,
    pub cd: Vec<f64>,
    pub cl: Vec<f64>,
    pub cz: Vec<f64>,
}

impl ForceCoefficients {
    const HEADER: &'static str = "Force coefficients";

    pub fn from_source(source: &SampleSource, limits: (f64, f64), flow: &FlowReference) -> Result<Self> {
        let history = read_forces(source, limits)?;
        let [cd, cl, cz] = force_coefficients([&history.fx, &history.fy, &history.fz], flow);
        Ok(Self {
            times: history.times,
            cd,
            cl,
            cz,
        })
    }

    pub fn compute(case: &Case, backend: Backend, config: &PostConfig) -> Result<Self> {
        Self::from_source(&case.source(FORCES, backend), config.time.limits(), &config.flow)
    }

    pub fn stats(&self, limits: (f64, f64)) -> Result<[Stats; 3]> {
        Ok([
            stats(&self.times, &self.cd, limits)?,
            stats(&self.times, &self.cl, limits)?,
            stats(&self.times, &self.cz, limits)?,
        ])
    }

    /// Strouhal number from the lift-coefficient oscillation.
    pub fn strouhal(&self, flow: &FlowReference, limits: (f64, f64), order: usize) -> Result<f64> {
        strouhal(&self.times, &self.cl, flow.length, flow.freestream_speed, limits, order)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_table(path, Self::HEADER, &[&self.times, &self.cd, &self.cl, &self.cz])
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut cols = read_table(path)?;
        expect_columns(&cols, 4, path)?;
        let cz = cols.remove(3);
        let cl = cols.remove(2);
        let cd = cols.remove(1);
        let times = cols.remove(0);
        Ok(Self { times, cd, cl, cz })
    }
}

/// Reorders every column of a raw surface sample.
fn reorder_raw(ordering: &SectionOrdering, raw: RawSample) -> Result<RawSample> {
    let coords = raw
        .coords
        .iter()
        .map(|c| ordering.apply(c))
        .collect::<Result<Vec<_>>>()?;
    let values = raw
        .values
        .iter()
        .map(|v| ordering.apply(v))
        .collect::<Result<Vec<_>>>()?;
    Ok(RawSample {
        time: raw.time,
        coords,
        values,
    })
}

/// Time- and span-averaged pressure coefficient around the body contour.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfacePressure {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub cp: Vec<f64>,
}

impl SurfacePressure {
    const HEADER: &'static str = "Surface pressure coefficient (x, y, cp)";

    /// Averages the wall pressure over `times`.
    ///
    /// The point ordering is derived from the first instant found and reused for
    /// all the others, so every slot refers to the same physical point.
    pub fn from_source(
        source: &SampleSource,
        times: &[f64],
        flow: &FlowReference,
        coverage: Coverage,
    ) -> Result<Self> {
        let spec = ColumnSpec::new(PRESSURE_FILE, &[0, 1, 2], &[3]);
        let mut ordering: Option<SectionOrdering> = None;

        let avg = time_average_with(source, times, &spec, coverage, |_, raw| {
            let current = match ordering.take() {
                Some(o) => o,
                None => {
                    let points =
                        points_from_columns(&raw.coords[0], &raw.coords[1], &raw.coords[2])?;
                    SectionOrdering::derive(&points)?
                }
            };
            let sorted = reorder_raw(&current, raw);
            ordering = Some(current);
            sorted
        })?;

        let points = points_from_columns(&avg.coords[0], &avg.coords[1], &avg.coords[2])?;
        let (xy, p) = spanwise_average(&points, &avg.values[0])?;
        let cp = pressure_coefficient(&p, &flow.per_unit_span());

        Ok(Self {
            x: xy.iter().map(|q| q.x).collect(),
            y: xy.iter().map(|q| q.y).collect(),
            cp,
        })
    }

    pub fn compute(case: &Case, backend: Backend, config: &PostConfig) -> Result<Self> {
        let times = case.times(WALL_PRESSURE, backend, config)?;
        Self::from_source(
            &case.source(WALL_PRESSURE, backend),
            &times,
            &config.flow,
            config.coverage,
        )
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_table(path, Self::HEADER, &[&self.x, &self.y, &self.cp])
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut cols = read_table(path)?;
        expect_columns(&cols, 3, path)?;
        let cp = cols.remove(2);
        let y = cols.remove(1);
        let x = cols.remove(0);
        Ok(Self { x, y, cp })
    }
}

/// Time- and span-averaged streamwise velocity along the wake centerline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CenterlineProfile {
    pub x: Vec<f64>,
    pub ux: Vec<f64>,
}

impl CenterlineProfile {
    const HEADER: &'static str = "Centerline wake profile of mean x-velocity (x, u)";

    pub fn from_source(
        source: &SampleSource,
        times: &[f64],
        grid_config: &CenterlineConfig,
        coverage: Coverage,
    ) -> Result<Self> {
        let spec = ColumnSpec::new(CENTERLINE_FILE, &[0, 2], &[3]);
        let avg = time_average(source, times, &spec, coverage)?;

        let xz: Vec<Point2> = avg.coords[0]
            .iter()
            .zip(&avg.coords[1])
            .map(|(&x, &z)| Point2::new(x, z))
            .collect();
        let grid = RegularGrid::new(
            grid_config.xlims,
            grid_config.zlims,
            grid_config.nx,
            grid_config.nz,
        );
        let mask = grid.bounding_box();
        let mut profiles = spanwise_profile(&xz, &[&avg.values[0]], &grid, mask.as_ref())?;

        Ok(Self {
            x: grid.x,
            ux: profiles.remove(0),
        })
    }

    pub fn compute(case: &Case, backend: Backend, config: &PostConfig) -> Result<Self> {
        let times = case.times(SURFACE_PROFILES, backend, config)?;
        Self::from_source(
            &case.source(SURFACE_PROFILES, backend),
            &times,
            &config.centerline,
            config.coverage,
        )
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_table(path, Self::HEADER, &[&self.x, &self.ux])
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut cols = read_table(path)?;
        expect_columns(&cols, 2, path)?;
        let ux = cols.remove(1);
        let x = cols.remove(0);
        Ok(Self { x, ux })
    }
}

/// Time- and span-averaged velocity along vertical lines at several `x`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VelocityProfiles {
    pub x_locations: Vec<f64>,
    pub y: Vec<f64>,
    /// One profile per x-location.
    pub ux: Vec<Vec<f64>>,
    pub uy: Vec<Vec<f64>>,
}

impl VelocityProfiles {
    fn header(x_locations: &[f64]) -> String {
        let xs: Vec<String> = x_locations.iter().map(|x| x.to_string()).collect();
        format!(
            "Vertical line profile of the mean velocity at x = {}",
            xs.join(", ")
        )
    }

    /// Averages all x-locations in a single pass over the source.
    pub fn from_source(
        source: &SampleSource,
        times: &[f64],
        profiles_config: &ProfilesConfig,
        coverage: Coverage,
    ) -> Result<Self> {
        let specs: Vec<ColumnSpec> = profiles_config
            .x_locations
            .iter()
            .map(|&x| ColumnSpec::new(profile_file(x), &[1, 2], &[3, 4]))
            .collect();
        let averages = time_average_many(source, times, &specs, coverage)?;

        let grid = RegularGrid::new(
            profiles_config.ylims,
            profiles_config.zlims,
            profiles_config.ny,
            profiles_config.nz,
        );
        let mut ux = Vec::with_capacity(averages.len());
        let mut uy = Vec::with_capacity(averages.len());
        for avg in &averages {
            let yz: Vec<Point2> = avg.coords[0]
                .iter()
                .zip(&avg.coords[1])
                .map(|(&y, &z)| Point2::new(y, z))
                .collect();
            let mut profiles =
                spanwise_profile(&yz, &[&avg.values[0], &avg.values[1]], &grid, None)?;
            uy.push(profiles.remove(1));
            ux.push(profiles.remove(0));
        }

        Ok(Self {
            x_locations: profiles_config.x_locations.clone(),
            y: grid.x,
            ux,
            uy,
        })
    }

    pub fn compute(case: &Case, backend: Backend, config: &PostConfig) -> Result<Self> {
        let times = case.times(SURFACE_PROFILES, backend, config)?;
        Self::from_source(
            &case.source(SURFACE_PROFILES, backend),
            &times,
            &config.profiles,
            config.coverage,
        )
    }

    /// Columns: `y`, then `ux`, `uy` for each x-location.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut columns: Vec<&[f64]> = vec![self.y.as_slice()];
        for (ux, uy) in self.ux.iter().zip(&self.uy) {
            columns.push(ux);
            columns.push(uy);
        }
        write_table(path, &Self::header(&self.x_locations), &columns)
    }

    pub fn load(path: &Path, x_locations: &[f64]) -> Result<Self> {
        let cols = read_table(path)?;
        expect_columns(&cols, 1 + 2 * x_locations.len(), path)?;
        let mut cols = cols.into_iter();
        let y = cols.next().unwrap_or_default();
        let (mut ux, mut uy) = (Vec::new(), Vec::new());
        while let (Some(a), Some(b)) = (cols.next(), cols.next()) {
            ux.push(a);
            uy.push(b);
        }
        Ok(Self {
            x_locations: x_locations.to_vec(),
            y,
            ux,
            uy,
        })
    }
}

/// Digitized reference curve from the literature, one vector per column.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteratureData {
    pub label: String,
    pub columns: Vec<Vec<f64>>,
}

impl LiteratureData {
    pub fn load(label: impl Into<String>, path: &Path) -> Result<Self> {
        Ok(Self {
            label: label.into(),
            columns: read_delimited(path, ',')?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_case_layout() {
        let case = Case::new("2k35", "/runs/snake/2k35");
        assert_eq!(
            case.archive_path(),
            PathBuf::from("/runs/snake/2k35/output/LES/postProcessing.tar.gz")
        );
        assert_eq!(
            case.cache_path("cp.txt"),
            PathBuf::from("/runs/snake/2k35/data/cp.txt")
        );
        match case.source(WALL_PRESSURE, Backend::Archive) {
            SampleSource::Archive(a) => assert_eq!(
                a.member_name(&crate::io::Member::new(50.5, PRESSURE_FILE)),
                "postProcessing/wallPressure/50.5/p_snake.raw"
            ),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_profile_file_names() {
        assert_eq!(profile_file(1.06), "U_xNormal_x1.06.raw");
        assert_eq!(profile_file(4.0), "U_xNormal_x4.00.raw");
    }

    #[test]
    fn test_literature_data() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("cp.csv");
        fs::write(&path, "0.0, -1.0\n90.0, 0.5\n")?;
        let data = LiteratureData::load("Norberg (1994)", &path)?;
        assert_eq!(data.label, "Norberg (1994)");
        assert_eq!(data.columns, vec![vec![0.0, 90.0], vec![-1.0, 0.5]]);
        Ok(())
    }

    #[test]
    fn test_load_checks_width() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("cp.txt");
        write_table(&path, "two columns", &[&[1.0], &[2.0]])?;
        assert!(SurfacePressure::load(&path).is_err());
        Ok(())
    }
}
