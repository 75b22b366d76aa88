pub mod config;
pub mod error;
pub mod geom;
pub mod io;
pub mod post;
pub mod vecutils;

// Prelude
pub use config::PostConfig;
pub use error::PostError;
pub use geom::planar::Point2;
pub use geom::point::Point;
pub use post::coefficients::FlowReference;
pub use post::datasets::{
    Backend, Case, CenterlineProfile, ForceCoefficients, LiteratureData, SurfacePressure,
    VelocityProfiles,
};
pub use post::reorder::{SectionOrdering, sort_sections};
pub use post::sample::SurfaceSample;
pub use post::spanwise::spanwise_average;
