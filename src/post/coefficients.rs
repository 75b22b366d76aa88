use serde::{Deserialize, Serialize};

/// Reference quantities of the flow used for non-dimensionalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowReference {
    pub density: f64,
    pub freestream_speed: f64,
    /// Characteristic length of the body (e.g. cylinder diameter).
    pub length: f64,
    /// Spanwise extent of the computational domain.
    pub span: f64,
}

impl Default for FlowReference {
    fn default() -> Self {
        Self {
            density: 1.0,
            freestream_speed: 1.0,
            length: 1.0,
            span: std::f64::consts::PI,
        }
    }
}

impl FlowReference {
    /// Dynamic pressure times reference area: `0.5 rho U^2 L Lz`.
    pub fn force_scale(&self) -> f64 {
        0.5 * self.density * self.freestream_speed.powi(2) * self.length * self.span
    }

    /// Dynamic pressure times reference length: `0.5 rho U^2 L`.
    pub fn pressure_scale(&self) -> f64 {
        0.5 * self.density * self.freestream_speed.powi(2) * self.length
    }

    /// Same reference with a unit span (per-length quantities).
    pub fn per_unit_span(&self) -> Self {
        Self { span: 1.0, ..*self }
    }
}

/// Non-dimensionalizes force components: `c = f / (0.5 rho U^2 L Lz)`.
pub fn force_coefficients(forces: [&[f64]; 3], flow: &FlowReference) -> [Vec<f64>; 3] {
    let scale = flow.force_scale();
    forces.map(|f| f.iter().map(|v| v / scale).collect())
}

/// Non-dimensionalizes a pressure field: `cp = p / (0.5 rho U^2 L)`.
pub fn pressure_coefficient(pressure: &[f64], flow: &FlowReference) -> Vec<f64> {
    let scale = flow.pressure_scale();
    pressure.iter().map(|p| p / scale).collect()
}
