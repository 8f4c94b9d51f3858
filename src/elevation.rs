// Elevation Resolver - point queries over raster elevation datasets
// Three sources mirror the on-disk data tree: regional high-resolution
// tiles under usgs/, a coarse land dataset under srtm/, and bathymetry
// under gebco/. Auto mode applies a deterministic fallback policy.
//
// A dataset is a JSON sidecar header (north-up affine georeferencing,
// CRS tag, no-data sentinel) next to a row-major little-endian f32 grid.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

use crate::error::{Result, SimulationError};

/// Continental-US bounding region gating the regional tile scan.
const CONUS_LAT_RANGE: (f64, f64) = (24.0, 50.0);
const CONUS_LON_RANGE: (f64, f64) = (-125.0, -66.0);

const USGS_SUBDIR: &str = "usgs";
const SRTM_HEADER: &str = "srtm/srtm_sample.json";
const GEBCO_HEADER: &str = "gebco/gebco_sample.json";

// =============================================================================
// SOURCE SELECTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationSource {
    /// Regional tiles for CONUS points, then land, then bathymetry.
    Auto,
    Usgs,
    Srtm,
    Gebco,
}

impl FromStr for ElevationSource {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "usgs" => Ok(Self::Usgs),
            "srtm" => Ok(Self::Srtm),
            "gebco" => Ok(Self::Gebco),
            other => Err(SimulationError::UnknownSource(other.to_string())),
        }
    }
}

// =============================================================================
// RASTER GRID
// =============================================================================

/// Sidecar header describing one single-band grid.
#[derive(Debug, Clone, Deserialize)]
pub struct GridHeader {
    pub width: usize,
    pub height: usize,
    /// Longitude of the west edge (degrees)
    pub origin_lon: f64,
    /// Latitude of the north edge (degrees)
    pub origin_lat: f64,
    /// Pixel width in degrees of longitude (positive, eastward)
    pub pixel_deg_lon: f64,
    /// Pixel height in degrees of latitude (positive, rows go south)
    pub pixel_deg_lat: f64,
    pub crs: String,
    /// Declared no-data sentinel. Absent means only NaN cells are no-data
    /// (JSON cannot carry NaN, so NaN-sentinel rasters omit the field).
    #[serde(default)]
    pub nodata: Option<f32>,
}

#[derive(Debug)]
pub struct ElevationGrid {
    name: String,
    header: GridHeader,
    values: Vec<f32>,
}

impl ElevationGrid {
    /// Load a dataset from its header path; the value grid sits next to it
    /// with a `.grid` extension.
    pub fn open(header_path: &Path) -> Result<Self> {
        let name = header_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| header_path.display().to_string());

        let header_bytes =
            fs::read(header_path).map_err(|source| SimulationError::DatasetRead {
                path: header_path.to_path_buf(),
                source,
            })?;
        let header: GridHeader = serde_json::from_slice(&header_bytes).map_err(|source| {
            SimulationError::DatasetHeader {
                path: header_path.to_path_buf(),
                source,
            }
        })?;

        let grid_path = header_path.with_extension("grid");
        let raw = fs::read(&grid_path).map_err(|source| SimulationError::DatasetRead {
            path: grid_path.clone(),
            source,
        })?;

        let expected = header.width * header.height * 4;
        if raw.len() != expected {
            return Err(SimulationError::DatasetRead {
                path: grid_path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("grid holds {} bytes, header implies {}", raw.len(), expected),
                ),
            });
        }

        let values = raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Self {
            name,
            header,
            values,
        })
    }

    /// Value at (lat, lon) through the affine georeferencing.
    ///
    /// Out-of-range indices and the no-data sentinel are distinguished
    /// failure conditions, never silently zeroed.
    pub fn sample(&self, lat: f64, lon: f64) -> Result<f64> {
        let col = ((lon - self.header.origin_lon) / self.header.pixel_deg_lon).floor();
        let row = ((self.header.origin_lat - lat) / self.header.pixel_deg_lat).floor();

        // NaN compares false against the bounds and casts to index 0,
        // so non-finite coordinates must be rejected explicitly.
        if !col.is_finite()
            || !row.is_finite()
            || col < 0.0
            || row < 0.0
            || col as usize >= self.header.width
            || row as usize >= self.header.height
        {
            return Err(SimulationError::PointOutsideRaster {
                dataset: self.name.clone(),
            });
        }

        let value = self.values[row as usize * self.header.width + col as usize];
        let is_sentinel = self.header.nodata.is_some_and(|nd| value == nd);
        if value.is_nan() || is_sentinel {
            return Err(SimulationError::NoDataAtPoint {
                dataset: self.name.clone(),
            });
        }

        Ok(f64::from(value))
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

pub struct ElevationResolver {
    data_dir: PathBuf,
    /// Opened datasets, keyed by header path. Tiles are reread from disk
    /// only once per process.
    cache: RwLock<HashMap<PathBuf, Arc<ElevationGrid>>>,
}

impl ElevationResolver {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Elevation in meters at (lat, lon) from the requested source.
    ///
    /// `Auto` recovers from `MissingDataset`, `PointOutsideRaster` and
    /// `NoDataAtPoint` by falling through to the next source; explicit
    /// sources surface every failure.
    pub fn elevation_at(&self, lat: f64, lon: f64, source: ElevationSource) -> Result<f64> {
        match source {
            ElevationSource::Usgs => self.search_usgs(lat, lon),
            ElevationSource::Srtm => self.read_single(SRTM_HEADER, lat, lon),
            ElevationSource::Gebco => self.read_single(GEBCO_HEADER, lat, lon),
            ElevationSource::Auto => self.resolve_auto(lat, lon),
        }
    }

    fn resolve_auto(&self, lat: f64, lon: f64) -> Result<f64> {
        if in_conus(lat, lon) {
            match self.search_usgs(lat, lon) {
                Ok(elevation) => return Ok(elevation),
                Err(err) if is_coverage_gap(&err) => {
                    tracing::debug!(lat, lon, %err, "regional tiles missed, trying SRTM");
                }
                Err(err) => return Err(err),
            }
        }

        match self.read_single(SRTM_HEADER, lat, lon) {
            Ok(elevation) => return Ok(elevation),
            Err(err) if is_coverage_gap(&err) => {
                tracing::debug!(lat, lon, %err, "SRTM missed, trying GEBCO");
            }
            Err(err) => return Err(err),
        }

        match self.read_single(GEBCO_HEADER, lat, lon) {
            Ok(elevation) => Ok(elevation),
            Err(err) if is_coverage_gap(&err) => Err(SimulationError::MissingDataset { lat, lon }),
            Err(err) => Err(err),
        }
    }

    /// Scan regional tiles in lexicographic header-name order and return the
    /// first usable value. The fixed order keeps tile selection reproducible
    /// across platforms.
    fn search_usgs(&self, lat: f64, lon: f64) -> Result<f64> {
        let dir = self.data_dir.join(USGS_SUBDIR);
        if !dir.is_dir() {
            return Err(SimulationError::MissingDataset { lat, lon });
        }

        let mut tiles: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(|source| SimulationError::DatasetRead {
                path: dir.clone(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        tiles.sort();

        for tile in tiles {
            let grid = self.open_cached(&tile)?;
            match grid.sample(lat, lon) {
                Ok(elevation) => return Ok(elevation),
                Err(SimulationError::PointOutsideRaster { .. })
                | Err(SimulationError::NoDataAtPoint { .. }) => continue,
                Err(err) => return Err(err),
            }
        }

        Err(SimulationError::MissingDataset { lat, lon })
    }

    fn read_single(&self, header_rel: &str, lat: f64, lon: f64) -> Result<f64> {
        let path = self.data_dir.join(header_rel);
        if !path.is_file() {
            return Err(SimulationError::MissingDataset { lat, lon });
        }
        self.open_cached(&path)?.sample(lat, lon)
    }

    fn open_cached(&self, header_path: &Path) -> Result<Arc<ElevationGrid>> {
        if let Some(grid) = self.cache.read().get(header_path) {
            return Ok(Arc::clone(grid));
        }

        let grid = Arc::new(ElevationGrid::open(header_path)?);
        self.cache
            .write()
            .insert(header_path.to_path_buf(), Arc::clone(&grid));
        Ok(grid)
    }
}

fn in_conus(lat: f64, lon: f64) -> bool {
    (CONUS_LAT_RANGE.0..=CONUS_LAT_RANGE.1).contains(&lat)
        && (CONUS_LON_RANGE.0..=CONUS_LON_RANGE.1).contains(&lon)
}

/// The three failure tags auto mode may recover from.
fn is_coverage_gap(err: &SimulationError) -> bool {
    matches!(
        err,
        SimulationError::MissingDataset { .. }
            | SimulationError::PointOutsideRaster { .. }
            | SimulationError::NoDataAtPoint { .. }
    )
}

// =============================================================================
// TESTS
// =============================================================================
