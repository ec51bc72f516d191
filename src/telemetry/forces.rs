//! Force decomposition and aggregation
//!
//! Per-sensor contact forces are recorded as `[frames, sensors, 3]`. In the
//! skin frame axis 2 is (tangent-x, tangent-y, surface normal); in the knee
//! frame all sensors share one fixed bone-relative basis, which is what makes
//! cross-sensor summation meaningful. Decomposition therefore only applies to
//! skin-frame series, aggregation only to knee-frame series.

use std::fmt;

use ndarray::{s, Array1, Array2, Array3, Axis, Zip};

/// Reference frame a force series is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceFrame {
    /// Sensor-local frame, z = surface normal
    Skin,
    /// Bone-relative frame shared by all sensors
    Knee,
}

impl fmt::Display for ForceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForceFrame::Skin => write!(f, "skin frame"),
            ForceFrame::Knee => write!(f, "knee frame"),
        }
    }
}

/// A recorded per-sensor force series tagged with its frame
#[derive(Debug, Clone)]
pub struct ForceSeries {
    pub frame: ForceFrame,
    /// `[frames, sensors, 3]`
    pub values: Array3<f64>,
}

impl ForceSeries {
    pub fn new(frame: ForceFrame, values: Array3<f64>) -> Self {
        ForceSeries { frame, values }
    }

    pub fn frames(&self) -> usize {
        self.values.dim().0
    }

    pub fn sensors(&self) -> usize {
        self.values.dim().1
    }
}

/// Normal / shear split for one sensor
#[derive(Debug, Clone)]
pub struct SensorDecomposition {
    /// Site name, positional from the fixed sensor list
    pub site: String,
    /// Signed normal component; compression vs tension stays distinguishable
    pub normal: Array1<f64>,
    /// In-plane magnitude, always >= 0
    pub shear: Array1<f64>,
}

/// Split a skin-frame series into per-sensor normal and shear components
///
/// Sensors beyond the end of `sites` are skipped: the site list is the
/// authority on how many sensors exist, and extra columns in a recording are
/// deliberately left undecoded rather than rejected.
pub fn decompose(series: &Array3<f64>, sites: &[String]) -> Vec<SensorDecomposition> {
    let sensor_count = series.dim().1.min(sites.len());
    (0..sensor_count)
        .map(|idx| {
            let x = series.slice(s![.., idx, 0]);
            let y = series.slice(s![.., idx, 1]);
            let shear = Zip::from(&x)
                .and(&y)
                .map_collect(|&x, &y| (x * x + y * y).sqrt());
            SensorDecomposition {
                site: sites[idx].clone(),
                normal: series.slice(s![.., idx, 2]).to_owned(),
                shear,
            }
        })
        .collect()
}

/// Resultant load summed over every sensor
#[derive(Debug, Clone)]
pub struct NetForce {
    /// Per-frame vector sum, `[frames, 3]`
    pub vector: Array2<f64>,
    /// Euclidean magnitude of the vector sum, per frame
    pub magnitude: Array1<f64>,
}

impl NetForce {
    /// Frame index and value of the peak net load
    pub fn peak(&self) -> Option<(usize, f64)> {
        self.magnitude
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(frame, &magnitude)| (frame, magnitude))
    }
}

/// Sum sensors into a single resultant per frame, then take its magnitude
///
/// The order matters: summing per-sensor magnitudes instead would discard
/// the cancellation between sensors loaded in opposite directions.
pub fn net(series: &Array3<f64>) -> NetForce {
    let vector = series.sum_axis(Axis(1));
    let magnitude = vector.map_axis(Axis(1), |frame| frame.dot(&frame).sqrt());
    NetForce { vector, magnitude }
}
