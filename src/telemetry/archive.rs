//! Channel store over NumPy array archives
//!
//! A recording is either a `.npz` archive (named channels written with
//! `np.savez`) or a bare `.npy` file holding the prismatic trace alone, which
//! loads as a single-channel archive. Channels are exposed by logical name
//! with the `.npy` member suffix stripped, so callers never see container
//! details.
//!
//! The whole archive is read once at open time; the store is immutable
//! afterwards and the file handle never outlives `open`.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array3, ArrayD, Ix3};
use ndarray_npy::{NpzReader, ReadNpyExt, ReadNpzError};

use super::error::{Result, TelemetryError};

/// Channel name a bare `.npy` recording is exposed under
pub const SINGLE_CHANNEL: &str = "prismatic";

/// Immutable mapping from channel name to numeric array
pub struct Archive {
    path: PathBuf,
    channels: HashMap<String, ArrayD<f64>>,
    single_array: bool,
}

impl Archive {
    /// Load an archive from disk
    ///
    /// Fails with `NotFound` if the path does not exist and `Format` (with
    /// the underlying cause attached) if the container cannot be parsed.
    pub fn open(path: &Path) -> Result<Archive> {
        if !path.exists() {
            return Err(TelemetryError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let single_array = path.extension().is_some_and(|ext| ext == "npy");
        let channels = if single_array {
            read_single(path)?
        } else {
            read_npz(path)?
        };

        Ok(Archive {
            path: path.to_path_buf(),
            channels,
            single_array,
        })
    }

    /// Whether this archive came from a bare `.npy` file
    ///
    /// Single-array recordings carry only the prismatic trace, so the usual
    /// required-channel rules do not apply to them.
    pub fn is_single_array(&self) -> bool {
        self.single_array
    }

    /// Check whether a channel is present. Never fails.
    pub fn has(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Number of channels in the archive
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a kinematic channel, flattened to its minimal 1-D rank
    ///
    /// Recordings saved as columns of single-element arrays come back as the
    /// plain frame sequence.
    pub fn kinematic(&self, name: &str) -> Result<Array1<f64>> {
        let raw = self.get(name)?;
        Ok(Array1::from_iter(raw.iter().copied()))
    }

    /// Read a force channel un-flattened: `[frames, sensors, 3]`
    pub fn forces(&self, name: &str) -> Result<Array3<f64>> {
        let raw = self.get(name)?.clone();
        let shaped = raw.into_dimensionality::<Ix3>().map_err(|_| {
            TelemetryError::InvalidInput(format!(
                "force channel '{}' is not a frames x sensors x 3 series",
                name
            ))
        })?;
        if shaped.dim().2 != 3 {
            return Err(TelemetryError::InvalidInput(format!(
                "force channel '{}' has a trailing axis of {}, expected 3",
                name,
                shaped.dim().2
            )));
        }
        Ok(shaped)
    }

    fn get(&self, name: &str) -> Result<&ArrayD<f64>> {
        self.channels
            .get(name)
            .ok_or_else(|| TelemetryError::MissingChannel(name.to_string()))
    }
}

fn format_error(
    path: &Path,
    source: impl std::error::Error + Send + Sync + 'static,
) -> TelemetryError {
    TelemetryError::Format {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

/// Load a bare `.npy` file as the single prismatic channel
///
/// Recordings written from float32 tensors widen to f64 on read.
fn read_single(path: &Path) -> Result<HashMap<String, ArrayD<f64>>> {
    let file = File::open(path).map_err(|e| format_error(path, e))?;
    let array = match ArrayD::<f64>::read_npy(file) {
        Ok(array) => array,
        Err(f64_err) => {
            let file = File::open(path).map_err(|e| format_error(path, e))?;
            match ArrayD::<f32>::read_npy(file) {
                Ok(single) => single.mapv(f64::from),
                Err(_) => return Err(format_error(path, f64_err)),
            }
        }
    };

    let mut channels = HashMap::new();
    channels.insert(SINGLE_CHANNEL.to_string(), array);
    Ok(channels)
}

/// Load every member of a `.npz` archive
fn read_npz(path: &Path) -> Result<HashMap<String, ArrayD<f64>>> {
    let file = File::open(path).map_err(|e| format_error(path, e))?;
    let mut npz = NpzReader::new(file).map_err(|e| format_error(path, e))?;
    let entries = npz.names().map_err(|e| format_error(path, e))?;

    let mut channels = HashMap::new();
    for entry in entries {
        // Member names may or may not carry the .npy suffix depending on the
        // writer; retry with the suffix before giving up on a member.
        let array = match read_member(&mut npz, &entry) {
            Ok(array) => array,
            Err(first_err) => {
                if entry.ends_with(".npy") {
                    return Err(format_error(path, first_err));
                }
                read_member(&mut npz, &format!("{entry}.npy")).map_err(|e| format_error(path, e))?
            }
        };
        let logical = entry.strip_suffix(".npy").unwrap_or(&entry).to_string();
        channels.insert(logical, array);
    }
    Ok(channels)
}

/// Read one npz member, widening f32 recordings to f64
fn read_member(
    npz: &mut NpzReader<File>,
    name: &str,
) -> std::result::Result<ArrayD<f64>, ReadNpzError> {
    match npz.by_name(name) {
        Ok(array) => Ok(array),
        Err(f64_err) => {
            let fallback: std::result::Result<ArrayD<f32>, ReadNpzError> = npz.by_name(name);
            match fallback {
                Ok(single) => Ok(single.mapv(f64::from)),
                Err(_) => Err(f64_err),
            }
        }
    }
}
