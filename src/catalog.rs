use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use bzip2::bufread::BzDecoder;
use flate2::read::GzDecoder;
use log::info;
use regex::Regex;
use serde::Deserialize;

use crate::settings::SimulationId;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to open the catalogue file")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize the catalogue CSV records")]
    Csv(#[from] csv::Error),
    #[error("invalid simulation filter regex")]
    Regex(#[from] regex::Error),
    #[error("no catalogue file matching {0}")]
    NotFound(String),
}
type Result<T> = std::result::Result<T, CatalogError>;

// Catalogues written by pandas carry "True"/"False"
fn python_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.as_str() {
        "True" | "true" | "1" => Ok(true),
        "False" | "false" | "0" => Ok(false),
        _ => Err(serde::de::Error::custom(format!("not a boolean: {s}"))),
    }
}

/// A single row of the galaxy catalogue
#[derive(Deserialize, Debug)]
pub struct Record {
    pub simulation_id: String,
    #[serde(deserialize_with = "python_bool")]
    pub select_udgs_reff1_mu1: bool,
    #[serde(deserialize_with = "python_bool")]
    pub select_udgs_reff1_mu2: bool,
    #[serde(deserialize_with = "python_bool")]
    pub select_udgs_reff2_mu1: bool,
    #[serde(deserialize_with = "python_bool")]
    pub select_udgs_reff2_mu2: bool,
    pub rband_mu_mag_arsec: f64,
    pub re_rband: f64,
    pub dist_from_mw: Option<f64>,
    pub dist_from_m31: Option<f64>,
}

/// Galaxy catalogue held as parallel columns
#[derive(Default, Debug)]
pub struct GalaxyCatalog {
    pub simulation_id: Vec<String>,
    pub reff1_mu1: Vec<bool>,
    pub reff1_mu2: Vec<bool>,
    pub reff2_mu1: Vec<bool>,
    pub reff2_mu2: Vec<bool>,
    /// r-band effective surface brightness [mag arcsec^-2]
    pub mu_e: Vec<f64>,
    /// r-band effective radius [kpc]
    pub re: Vec<f64>,
    /// Distance to the MW analogue [kpc]
    pub dist_from_mw: Vec<Option<f64>>,
    /// Distance to the M31 analogue [kpc]
    pub dist_from_m31: Vec<Option<f64>>,
}
impl GalaxyCatalog {
    pub fn len(&self) -> usize {
        self.simulation_id.len()
    }
    pub fn is_empty(&self) -> bool {
        self.simulation_id.is_empty()
    }
    fn push(&mut self, record: Record) {
        self.simulation_id.push(record.simulation_id);
        self.reff1_mu1.push(record.select_udgs_reff1_mu1);
        self.reff1_mu2.push(record.select_udgs_reff1_mu2);
        self.reff2_mu1.push(record.select_udgs_reff2_mu1);
        self.reff2_mu2.push(record.select_udgs_reff2_mu2);
        self.mu_e.push(record.rband_mu_mag_arsec);
        self.re.push(record.re_rband);
        // NaN distances count as missing
        self.dist_from_mw
            .push(record.dist_from_mw.filter(|d| !d.is_nan()));
        self.dist_from_m31
            .push(record.dist_from_m31.filter(|d| !d.is_nan()));
    }
    /// Parses catalogue records, keeping the rows with a matching simulation identifier
    pub fn from_reader<R: Read>(reader: R, sim_filter: &Regex) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut catalog = GalaxyCatalog::default();
        for result in rdr.deserialize() {
            let record: Record = result?;
            if !sim_filter.is_match(&record.simulation_id) {
                continue;
            }
            catalog.push(record);
        }
        Ok(catalog)
    }
    /// Distance to the nearest of the two hosts [kpc], element-wise
    pub fn nearest_host_distance(&self) -> Vec<Option<f64>> {
        self.dist_from_mw
            .iter()
            .zip(self.dist_from_m31.iter())
            .map(|pair| match pair {
                (Some(mw), Some(m31)) => Some(mw.min(*m31)),
                (Some(mw), None) => Some(*mw),
                (None, Some(m31)) => Some(*m31),
                (None, None) => None,
            })
            .collect()
    }
    /// Simulation identity mask
    pub fn id_mask(&self, sim_id: SimulationId) -> Vec<bool> {
        self.simulation_id
            .iter()
            .map(|id| id == sim_id.as_str())
            .collect()
    }
    /// Writes the fiducial UDG sub-catalogue to a CSV file
    pub fn to_csv(&self, filename: String) -> std::result::Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_path(filename)?;
        wtr.write_record([
            "simulation_id",
            "rband_mu_mag_arsec",
            "re_rband",
            "dist_from_mw",
            "dist_from_m31",
        ])?;
        let cell = |value: &Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        for k in (0..self.len()).filter(|&k| self.reff2_mu2[k]) {
            wtr.write_record([
                self.simulation_id[k].clone(),
                self.mu_e[k].to_string(),
                self.re[k].to_string(),
                cell(&self.dist_from_mw[k]),
                cell(&self.dist_from_m31[k]),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Galaxy catalogue loader
///
/// Resolves plain, bzip2 or gzip compressed CSV catalogues
pub struct CatalogLoader {
    path: String,
    sim_filter: String,
}
impl Default for CatalogLoader {
    fn default() -> Self {
        Self {
            path: String::from("udg_catalog.csv"),
            sim_filter: String::from(r"\w+"),
        }
    }
}
impl CatalogLoader {
    /// Sets the catalogue repository, the file name keeps its default
    pub fn data_path(self, data_path: String) -> Self {
        let path = Path::new(&data_path).join("udg_catalog.csv");
        Self {
            path: path.to_str().unwrap().to_owned(),
            ..self
        }
    }
    /// Sets the catalogue file
    pub fn file_path(self, path: String) -> Self {
        Self { path, ..self }
    }
    /// Simulation identifier regular expression filter
    pub fn sim_filter(self, sim_filter: String) -> Self {
        Self { sim_filter, ..self }
    }
    pub fn load(self) -> Result<GalaxyCatalog> {
        let sim_filter = Regex::new(&self.sim_filter)?;
        let contents = self.read_catalog()?;
        let catalog = GalaxyCatalog::from_reader(contents.as_bytes(), &sim_filter)?;
        info!("loaded {} galaxies from {}", catalog.len(), self.path);
        Ok(catalog)
    }
    fn read_catalog(&self) -> Result<String> {
        let path = Path::new(&self.path);
        let candidates: Vec<PathBuf> = vec![
            path.to_path_buf(),
            path.with_extension("csv.bz2"),
            path.with_extension("csv.gz"),
        ];
        let path = candidates
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| CatalogError::NotFound(self.path.clone()))?;
        let file = File::open(&path)?;
        let mut contents = String::new();
        match path.extension().and_then(|e| e.to_str()) {
            Some("bz2") => {
                BzDecoder::new(BufReader::new(file)).read_to_string(&mut contents)?;
            }
            Some("gz") => {
                GzDecoder::new(file).read_to_string(&mut contents)?;
            }
            _ => {
                BufReader::new(file).read_to_string(&mut contents)?;
            }
        }
        Ok(contents)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub const CSV: &str = "\
simulation_id,select_udgs_reff1_mu1,select_udgs_reff1_mu2,select_udgs_reff2_mu1,select_udgs_reff2_mu2,rband_mu_mag_arsec,re_rband,dist_from_mw,dist_from_m31
09_18,True,False,False,False,24.2,1.1,350.0,820.0
09_18,True,True,True,True,25.6,2.4,,640.0
17_11,False,False,False,False,23.8,0.7,120.0,
17_11,True,True,False,False,24.7,1.2,980.0,210.0
37_11,True,False,True,False,24.9,1.8,1500.0,nan
37_11,True,True,True,True,26.1,3.2,,
";

    pub fn catalog() -> GalaxyCatalog {
        GalaxyCatalog::from_reader(CSV.as_bytes(), &Regex::new(r"\w+").unwrap()).unwrap()
    }

    #[test]
    fn parallel_columns() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.simulation_id.len(), catalog.mu_e.len());
        assert_eq!(catalog.re.len(), catalog.dist_from_m31.len());
        assert!(catalog.reff1_mu1[0] && !catalog.reff2_mu2[0]);
    }

    #[test]
    fn nearest_host_is_elementwise_min() {
        let catalog = catalog();
        let nearest = catalog.nearest_host_distance();
        assert_eq!(
            nearest,
            vec![
                Some(350.0),
                Some(640.0),
                Some(120.0),
                Some(210.0),
                Some(1500.0),
                None
            ]
        );
    }

    #[test]
    fn nearest_host_of_a_seeded_table() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(42);
        let mut catalog = GalaxyCatalog::default();
        for _ in 0..100 {
            let dist = |rng: &mut StdRng| {
                (rng.gen::<f64>() < 0.8).then(|| rng.gen_range(50.0..3000.0))
            };
            catalog.push(Record {
                simulation_id: String::from("09_18"),
                select_udgs_reff1_mu1: true,
                select_udgs_reff1_mu2: false,
                select_udgs_reff2_mu1: false,
                select_udgs_reff2_mu2: false,
                rband_mu_mag_arsec: rng.gen_range(23.5..29.0),
                re_rband: rng.gen_range(0.5..5.8),
                dist_from_mw: dist(&mut rng),
                dist_from_m31: dist(&mut rng),
            });
        }
        let nearest = catalog.nearest_host_distance();
        for k in 0..catalog.len() {
            let expected = match (catalog.dist_from_mw[k], catalog.dist_from_m31[k]) {
                (Some(mw), Some(m31)) => Some(mw.min(m31)),
                (mw, m31) => mw.or(m31),
            };
            assert_eq!(nearest[k], expected);
        }
    }

    #[test]
    fn simulation_filter() {
        let catalog =
            GalaxyCatalog::from_reader(CSV.as_bytes(), &Regex::new("17_11").unwrap()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.simulation_id.iter().all(|id| id == "17_11"));
    }

    #[test]
    fn id_mask() {
        let catalog = catalog();
        let mask = catalog.id_mask(SimulationId::Lg0918);
        assert_eq!(mask, vec![true, true, false, false, false, false]);
    }

    #[test]
    fn loader_reads_a_plain_csv_file() {
        let path = std::env::temp_dir().join("udg_catalog_test.csv");
        std::fs::write(&path, CSV).unwrap();
        let catalog = CatalogLoader::default()
            .file_path(path.to_str().unwrap().to_string())
            .load()
            .unwrap();
        assert_eq!(catalog.len(), 6);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn fiducial_csv_export() {
        let catalog = catalog();
        let filename = std::env::temp_dir()
            .join("udg_fiducial.csv")
            .to_str()
            .unwrap()
            .to_string();
        catalog.to_csv(filename.clone()).unwrap();
        let contents = std::fs::read_to_string(&filename).unwrap();
        // header + the two fiducial UDGs
        assert_eq!(contents.lines().count(), 3);
        std::fs::remove_file(filename).unwrap();
    }
}
