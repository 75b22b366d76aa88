pub mod bboxes;
pub mod bins;
pub mod delaunay;
pub mod planar;
pub mod point;
