use std::fs;
use std::path::Path;

use candle_core::Device;
use tracing::info;

use super::error::ModelError;
use super::graph::Topology;
use super::siamese::SiameseModel;

pub const TOPOLOGY_FILENAME: &str = "topology.json";
pub const WEIGHTS_FILENAME: &str = "weights.safetensors";

impl SiameseModel {
    /// Writes `topology.json` and `weights.safetensors` into `dir`, creating it if needed.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(), ModelError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ModelError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let topology_path = dir.join(TOPOLOGY_FILENAME);
        fs::write(&topology_path, self.topology().to_json()?).map_err(|source| {
            ModelError::Io {
                path: topology_path.clone(),
                source,
            }
        })?;

        self.save_weights(dir.join(WEIGHTS_FILENAME))?;
        info!(dir = %dir.display(), "Model saved");
        Ok(())
    }

    /// Weights only, as safetensors keyed by layer-qualified parameter names.
    pub fn save_weights<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        self.varmap.save(path.as_ref())?;
        Ok(())
    }

    /// Overwrites every parameter from a safetensors file written by [`save_weights`].
    ///
    /// Fails if the file lacks a parameter or a stored shape differs.
    ///
    /// [`save_weights`]: SiameseModel::save_weights
    pub fn load_weights<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        self.varmap.load(path)?;
        Ok(())
    }

    /// Rebuilds a model from a directory written by [`save`](SiameseModel::save).
    pub fn load<P: AsRef<Path>>(dir: P, device: &Device) -> Result<Self, ModelError> {
        let dir = dir.as_ref();
        let topology_path = dir.join(TOPOLOGY_FILENAME);
        if !topology_path.exists() {
            return Err(ModelError::MissingArtifact {
                path: topology_path,
            });
        }

        let json = fs::read_to_string(&topology_path).map_err(|source| ModelError::Io {
            path: topology_path.clone(),
            source,
        })?;
        let topology = Topology::from_json(&json)?;

        let mut model = Self::new(topology.config, device)?;
        model.load_weights(dir.join(WEIGHTS_FILENAME))?;
        info!(dir = %dir.display(), "Model loaded");
        Ok(model)
    }
}
