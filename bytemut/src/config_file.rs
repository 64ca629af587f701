/// The `config_file` module contains code for reading and writing a bytemut configuration file.
/// Bytemut uses the configuration files to let the user keep the operator and target selection
/// for a class next to the class instead of repeating it on the command line.
use bytemut_lib::mutation::OperatorType;
use bytemut_lib::{BytemutError, TargetSet};
use serde_json::{from_str, Map, Value};
use std::ffi::OsStr;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The extension used for bytemut configuration files.
pub static CONFIG_FILE_EXTENSION: &str = "bmut";

/// The key for the list of mutation operators.
pub static OPERATORS_KEY: &str = "operators";

/// The key for the list of mutation targets.
pub static TARGETS_KEY: &str = "targets";

/// The key for the string value containing the path to where the tool should place
/// output.
pub static OUTPUT_DIR_KEY: &str = "output-directory";

/// Configuration details loaded from a .bmut configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationFileDetails {
    /// The ids of the requested operators.  Empty keeps the command line selection.
    pub operators: Vec<String>,

    /// The mutations to report.  Empty keeps the command line selection.
    pub targets: TargetSet,

    /// The location where the tool should put generated output files.
    pub output_directory: Option<PathBuf>,
}

impl ConfigurationFileDetails {
    /// Create a new configuration details object by loading the configuration from a JSON
    /// file.  The file must have the extension ".bmut".
    ///
    /// # Arguments
    ///
    /// * `config_file` - The path to the configuration file in the file system.
    pub fn new_from_file(config_file: &str) -> Result<ConfigurationFileDetails, BytemutError> {
        let config_path = PathBuf::from(config_file);

        match config_path.extension() {
            Some(extension) if extension == OsStr::new(CONFIG_FILE_EXTENSION) => {}
            _ => {
                return Err(BytemutError::ConfigFileBadExtension(String::from(
                    config_file,
                )))
            }
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let json_value: Value = from_str(&contents)?;

        let object = match json_value.as_object() {
            Some(o) => o,
            None => {
                return Err(BytemutError::ConfigFileNotSupported(String::from(
                    config_file,
                )))
            }
        };

        let mut details = ConfigurationFileDetails {
            operators: Vec::new(),
            targets: TargetSet::new(),
            output_directory: None,
        };

        if let Some(value) = object.get(OPERATORS_KEY) {
            let operators: Vec<String> = serde_json::from_value(value.clone())?;
            for operator in &operators {
                OperatorType::from_str(operator)?;
            }
            details.operators = operators;
        }

        if let Some(value) = object.get(TARGETS_KEY) {
            details.targets = serde_json::from_value(value.clone())?;
        }

        if let Some(value) = object.get(OUTPUT_DIR_KEY) {
            match value.as_str() {
                Some(directory) => details.output_directory = Some(PathBuf::from(directory)),
                None => {
                    return Err(BytemutError::ConfigFileNotSupported(String::from(
                        config_file,
                    )))
                }
            }
        }

        log::debug!(
            "Loaded configuration file {} with {} operators and {} targets",
            config_file,
            details.operators.len(),
            details.targets.len()
        );

        Ok(details)
    }

    /// Return the JSON object representing the configuration.
    pub fn to_json(&self) -> Result<Value, BytemutError> {
        let mut object = Map::new();
        object.insert(
            String::from(OPERATORS_KEY),
            serde_json::to_value(&self.operators)?,
        );
        object.insert(
            String::from(TARGETS_KEY),
            serde_json::to_value(&self.targets)?,
        );
        if let Some(directory) = &self.output_directory {
            object.insert(
                String::from(OUTPUT_DIR_KEY),
                Value::String(directory.to_string_lossy().into_owned()),
            );
        }
        Ok(Value::Object(object))
    }

    /// Write the configuration as JSON to `stream`.
    ///
    /// # Arguments
    ///
    /// * `stream` - The [`Write`] object that will receive the JSON text.
    pub fn write_to_stream_as_json<W: Write>(&self, stream: &mut W) -> Result<(), BytemutError> {
        serde_json::to_writer_pretty(&mut *stream, &self.to_json()?)?;
        writeln!(stream)?;
        Ok(())
    }

    /// Write the configuration as JSON to the file at `file_name`.
    ///
    /// # Arguments
    ///
    /// * `file_name` - The path of the file to create.
    pub fn write_to_file_as_json(&self, file_name: &Path) -> Result<(), BytemutError> {
        let mut file = File::create(file_name)?;
        self.write_to_stream_as_json(&mut file)
    }
}
