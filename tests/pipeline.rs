use anyhow::Result;
use bluffpost::io::{Coverage, SampleSource, time_to_str};
use bluffpost::post::datasets::{PRESSURE_FILE, WALL_PRESSURE};
use bluffpost::{
    Backend, Case, CenterlineProfile, FlowReference, ForceCoefficients, Point, PostConfig,
    PostError, SectionOrdering, SurfacePressure, SurfaceSample, VelocityProfiles,
    sort_sections, spanwise_average,
};
use flate2::Compression;
use flate2::write::GzEncoder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::path::Path;
use tempfile::tempdir;

/// Flow reference with a unit dynamic pressure, so that cp equals p.
fn unit_flow() -> FlowReference {
    FlowReference {
        density: 2.0,
        freestream_speed: 1.0,
        length: 1.0,
        span: 1.0,
    }
}

fn write_archive(path: &Path, members: &[(String, String)]) -> Result<()> {
    let encoder = GzEncoder::new(File::create(path)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, content.as_bytes())?;
    }
    builder.into_inner()?.finish()?;
    Ok(())
}

fn raw_text(points: &[Point], p: &[f64]) -> String {
    let mut text = String::from("# x y z p\n");
    for (q, v) in points.iter().zip(p) {
        text.push_str(&format!("{} {} {} {}\n", q.x, q.y, q.z, v));
    }
    text
}

/// Unit squares at z = 0 and z = 1, listed corner by corner.
fn two_squares() -> (Vec<Point>, Vec<f64>) {
    let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
    let mut points = Vec::new();
    let mut p = Vec::new();
    for (k, z) in [0.0, 1.0].iter().enumerate() {
        for (i, &(x, y)) in corners.iter().enumerate() {
            points.push(Point::new(x, y, *z));
            p.push(10.0 * (i + 1) as f64 + 4.0 * k as f64);
        }
    }
    (points, p)
}

fn shuffled<T: Clone>(v: &[T], order: &[usize]) -> Vec<T> {
    order.iter().map(|&i| v[i].clone()).collect()
}

#[test]
fn test_two_squares_any_storage_order() -> Result<()> {
    let (points, p) = two_squares();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..10 {
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.shuffle(&mut rng);
        let sample = SurfaceSample::new(shuffled(&points, &order), vec![shuffled(&p, &order)])?;

        let (sorted, _) = sort_sections(&sample)?;
        let (xy, mean) = spanwise_average(&sorted.points, sorted.field(0))?;

        // Top-right corner first, then along the contour
        let xy: Vec<(f64, f64)> = xy.iter().map(|q| (q.x, q.y)).collect();
        assert_eq!(xy, vec![(1.0, 1.0), (0.0, 1.0), (0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(mean, vec![32.0, 42.0, 12.0, 22.0]);
    }
    Ok(())
}

#[test]
fn test_two_squares_through_directory_source() -> Result<()> {
    let (points, p) = two_squares();
    let order = vec![5, 2, 7, 0, 3, 6, 1, 4];

    let dir = tempdir()?;
    let time_dir = dir.path().join("100");
    fs::create_dir_all(&time_dir)?;
    fs::write(
        time_dir.join(PRESSURE_FILE),
        raw_text(&shuffled(&points, &order), &shuffled(&p, &order)),
    )?;

    let source = SampleSource::directory(dir.path());
    let data = SurfacePressure::from_source(&source, &[100.0], &unit_flow(), Coverage::Strict)?;
    assert_eq!(data.x, vec![1.0, 0.0, 0.0, 1.0]);
    assert_eq!(data.y, vec![1.0, 1.0, 0.0, 0.0]);
    assert_eq!(data.cp, vec![32.0, 42.0, 12.0, 22.0]);
    Ok(())
}

#[test]
fn test_first_instant_ordering_is_reused() -> Result<()> {
    // Same rows at both instants; at t = 200 the second row is the highest point,
    // so a walk derived from that instant alone would start there instead
    let first = vec![
        Point::new(1.0, 1.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
    ];
    let mut second = first.clone();
    second[1] = Point::new(0.0, 1.5, 0.0);
    assert_eq!(SectionOrdering::derive(&first)?.indices(), &[0, 1, 2, 3]);
    assert_eq!(SectionOrdering::derive(&second)?.indices(), &[1, 0, 3, 2]);

    let dir = tempdir()?;
    for (t, points, p) in [
        (100.0, &first, [10.0, 20.0, 30.0, 40.0]),
        (200.0, &second, [50.0, 60.0, 70.0, 80.0]),
    ] {
        let time_dir = dir.path().join(time_to_str(t));
        fs::create_dir_all(&time_dir)?;
        fs::write(time_dir.join(PRESSURE_FILE), raw_text(points, &p))?;
    }

    let source = SampleSource::directory(dir.path());
    let data =
        SurfacePressure::from_source(&source, &[100.0, 200.0], &unit_flow(), Coverage::Strict)?;
    // Slot k averages row k of both instants
    assert_eq!(data.cp, vec![30.0, 40.0, 50.0, 60.0]);
    assert_eq!(data.x, vec![1.0, 0.0, 0.0, 1.0]);
    assert_eq!(data.y, vec![1.0, 1.25, 0.0, 0.0]);
    Ok(())
}

#[test]
fn test_uneven_sections_are_rejected() -> Result<()> {
    let (mut points, mut p) = two_squares();
    points.pop();
    p.pop();
    let sample = SurfaceSample::new(points, vec![p])?;
    let err = sort_sections(&sample).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PostError>(),
        Some(PostError::SectionSize {
            expected: 3,
            actual: 4,
            ..
        }) | Some(PostError::UnevenSections { .. })
    ));
    Ok(())
}

/// Perimeter points of a 4 x 2 rectangle, repeated at three spanwise stations.
fn rectangle_sections() -> Vec<Point> {
    let perimeter = [
        (-2.0, -1.0),
        (-1.0, -1.0),
        (0.0, -1.0),
        (1.0, -1.0),
        (2.0, -1.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (-1.0, 1.0),
        (-2.0, 1.0),
        (-2.0, 0.0),
    ];
    let mut points = Vec::new();
    for z in [-0.5, 0.0, 0.5] {
        for &(x, y) in &perimeter {
            points.push(Point::new(x, y, z));
        }
    }
    points
}

/// Writes the same wall-pressure samples as a directory tree and as an archive.
///
/// Archive members are stored in a scrambled time order.
fn write_pressure_case(case: &Case, times: &[f64]) -> Result<()> {
    let points = rectangle_sections();
    let mut rng = StdRng::seed_from_u64(3);
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.shuffle(&mut rng);
    let stored = shuffled(&points, &order);

    let mut members = Vec::new();
    for &t in times {
        let p: Vec<f64> = stored
            .iter()
            .map(|q| q.x * q.x - 0.5 * q.y + rng.gen_range(-0.1..0.1) + 0.1 * t)
            .collect();
        let text = raw_text(&stored, &p);

        let dir = case.post_dir().join(WALL_PRESSURE).join(time_to_str(t));
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(PRESSURE_FILE), &text)?;
        members.push((
            format!("postProcessing/{}/{}/{}", WALL_PRESSURE, time_to_str(t), PRESSURE_FILE),
            text,
        ));
    }
    members.shuffle(&mut rng);
    write_archive(&case.archive_path(), &members)
}

#[test]
fn test_archive_and_directory_are_bit_identical() -> Result<()> {
    let dir = tempdir()?;
    let case = Case::new("rectangle", dir.path());
    write_pressure_case(&case, &[50.0, 50.05, 50.1, 50.15, 50.2])?;

    let config = PostConfig::default();
    let from_dir = SurfacePressure::compute(&case, Backend::Directory, &config)?;
    let from_archive = SurfacePressure::compute(&case, Backend::Archive, &config)?;

    assert_eq!(from_dir.cp.len(), 12);
    for (a, b) in from_dir.cp.iter().zip(&from_archive.cp) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(from_dir.x, from_archive.x);
    assert_eq!(from_dir.y, from_archive.y);
    // Contour starts at the top-right corner
    assert_eq!((from_dir.x[0], from_dir.y[0]), (2.0, 1.0));
    Ok(())
}

#[test]
fn test_time_window_and_stride() -> Result<()> {
    let dir = tempdir()?;
    let case = Case::new("rectangle", dir.path());
    write_pressure_case(&case, &[1.0, 2.0, 3.0, 4.0, 5.0])?;

    let mut config = PostConfig::default();
    config.time.start = 2.0;
    config.time.end = Some(5.0);
    config.stride = 2;
    for backend in [Backend::Directory, Backend::Archive] {
        assert_eq!(case.times(WALL_PRESSURE, backend, &config)?, vec![2.0, 4.0]);
    }
    Ok(())
}

#[test]
fn test_missing_instant_policy() -> Result<()> {
    let dir = tempdir()?;
    let case = Case::new("rectangle", dir.path());
    write_pressure_case(&case, &[1.0, 2.0])?;

    for backend in [Backend::Directory, Backend::Archive] {
        let source = case.source(WALL_PRESSURE, backend);
        let err = SurfacePressure::from_source(&source, &[1.0, 1.5, 2.0], &unit_flow(), Coverage::Strict)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PostError>(),
            Some(PostError::MissingInstants { .. })
        ));

        let lenient =
            SurfacePressure::from_source(&source, &[1.0, 1.5, 2.0], &unit_flow(), Coverage::BestEffort)?;
        let exact = SurfacePressure::from_source(&source, &[1.0, 2.0], &unit_flow(), Coverage::Strict)?;
        assert_eq!(lenient, exact);
    }
    Ok(())
}

#[test]
fn test_forces_from_case() -> Result<()> {
    let dir = tempdir()?;
    let case = Case::new("cylinder", dir.path());
    let forces_dir = case.post_dir().join("forces").join("0");
    fs::create_dir_all(&forces_dir)?;

    let mut text = String::from("# Time forces(pressure viscous) moment(pressure viscous)\n");
    for i in 0..400 {
        let t = 0.1 * i as f64;
        let fy = (2.0 * std::f64::consts::PI * 0.25 * t).sin();
        text.push_str(&format!(
            "{t}\t(({} {} 0) (0.5 0 0)) ((0 0 0) (0 0 0))\n",
            1.5,
            fy
        ));
    }
    fs::write(forces_dir.join("forces.dat"), &text)?;

    let mut config = PostConfig::default();
    config.flow = unit_flow();
    config.time.start = 1.0;
    config.time.end = Some(39.0);
    config.strouhal_order = 3;

    let data = ForceCoefficients::compute(&case, Backend::Directory, &config)?;
    let [cd, cl, _] = data.stats(config.time.limits())?;
    assert!((cd.mean - 2.0).abs() < 1e-12);
    assert!(cd.std < 1e-12);
    assert!(cl.mean.abs() < 0.05);
    let st = data.strouhal(&config.flow, config.time.limits(), config.strouhal_order)?;
    assert!((st - 0.25).abs() < 1e-6, "St = {st}");
    Ok(())
}

#[test]
fn test_cache_roundtrip() -> Result<()> {
    let dir = tempdir()?;
    let case = Case::new("any", dir.path());
    let mut rng = StdRng::seed_from_u64(11);
    let mut random = |n: usize| -> Vec<f64> { (0..n).map(|_| rng.gen_range(-1e3..1e3)).collect() };

    let forces = ForceCoefficients {
        times: random(20),
        cd: random(20),
        cl: random(20),
        cz: random(20),
    };
    let path = case.cache_path("force_coefficients.txt");
    forces.save(&path)?;
    assert_eq!(ForceCoefficients::load(&path)?, forces);

    let pressure = SurfacePressure {
        x: random(15),
        y: random(15),
        cp: random(15),
    };
    let path = case.cache_path("surface_pressure.txt");
    pressure.save(&path)?;
    assert_eq!(SurfacePressure::load(&path)?, pressure);

    let centerline = CenterlineProfile {
        x: random(30),
        ux: random(30),
    };
    let path = case.cache_path("u_centerline.txt");
    centerline.save(&path)?;
    assert_eq!(CenterlineProfile::load(&path)?, centerline);

    let x_locations = vec![1.06, 4.0];
    let profiles = VelocityProfiles {
        x_locations: x_locations.clone(),
        y: random(25),
        ux: vec![random(25), random(25)],
        uy: vec![random(25), random(25)],
    };
    let path = case.cache_path("velocity_profiles.txt");
    profiles.save(&path)?;
    assert!(fs::read_to_string(&path)?.starts_with(
        "# Vertical line profile of the mean velocity at x = 1.06, 4\n"
    ));
    assert_eq!(VelocityProfiles::load(&path, &x_locations)?, profiles);
    assert!(VelocityProfiles::load(&path, &[1.06]).is_err());
    Ok(())
}

/// Scattered `(a, z)` plane samples of a field linear in `a`, independent of `z`.
fn plane_text(a_col: usize, ncols: usize) -> String {
    let mut text = String::new();
    for j in 0..=8 {
        for i in 0..=20 {
            let a = -4.0 + 0.5 * i as f64;
            let z = -2.0 + 0.5 * j as f64;
            let mut row = vec![0.0; ncols];
            row[a_col] = a;
            row[2] = z;
            row[3] = 1.0 + 0.1 * a;
            if ncols > 4 {
                row[4] = -0.2 * a;
            }
            let row: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            text.push_str(&row.join(" "));
            text.push('\n');
        }
    }
    text
}

#[test]
fn test_velocity_profiles_from_case() -> Result<()> {
    let dir = tempdir()?;
    let case = Case::new("cylinder", dir.path());
    let mut config = PostConfig::default();
    config.profiles.x_locations = vec![1.06, 2.0];
    config.profiles.ylims = (-3.0, 3.0);
    config.profiles.ny = 13;
    config.profiles.nz = 7;
    config.centerline.xlims = (-3.0, 3.0);
    config.centerline.nx = 13;
    config.centerline.nz = 7;

    for t in [10.0, 20.0] {
        let dir = case.post_dir().join("surfaceProfiles").join(time_to_str(t));
        fs::create_dir_all(&dir)?;
        for &x in &config.profiles.x_locations {
            let name = bluffpost::post::datasets::profile_file(x);
            fs::write(dir.join(name), plane_text(1, 5))?;
        }
        fs::write(dir.join("U_yNormal_x0.0.raw"), plane_text(0, 4))?;
    }

    let profiles = VelocityProfiles::compute(&case, Backend::Directory, &config)?;
    assert_eq!(profiles.ux.len(), 2);
    assert_eq!(profiles.y.len(), 13);
    for k in 0..2 {
        for (i, y) in profiles.y.iter().enumerate() {
            assert!((profiles.ux[k][i] - (1.0 + 0.1 * y)).abs() < 1e-10);
            assert!((profiles.uy[k][i] + 0.2 * y).abs() < 1e-10);
        }
    }

    let centerline = CenterlineProfile::compute(&case, Backend::Directory, &config)?;
    assert_eq!(centerline.x.len(), 13);
    for (x, u) in centerline.x.iter().zip(&centerline.ux) {
        assert!((u - (1.0 + 0.1 * x)).abs() < 1e-10);
    }
    Ok(())
}
