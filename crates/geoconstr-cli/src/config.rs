use crate::cli::InputArgs;
use crate::error::{CliError, Result};
use crate::output::{OutputConfig, OutputFormat};
use clap::ValueEnum;
use geoconstr::core::utils::units::LengthUnit;
use geoconstr::engine::config::{CompilerConfig, CompilerConfigBuilder};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialCompilerSection {
    #[serde(rename = "length-unit")]
    length_unit: Option<LengthUnit>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputSection {
    format: Option<OutputFormat>,
    precision: Option<usize>,
}

/// Settings resolved from the config file, `-S` overrides, and dedicated flags,
/// in increasing order of precedence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppConfig {
    pub compiler: CompilerConfig,
    pub output: OutputConfig,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    compiler: Option<PartialCompilerSection>,
    output: Option<PartialOutputSection>,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `--config`, or starts from an empty configuration.
    pub fn load(args: &InputArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(mut self, args: &InputArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let compiler_section = self.compiler.take().unwrap_or_default();
        let output_section = self.output.take().unwrap_or_default();
        let defaults = OutputConfig::default();

        let length_unit = args
            .length_unit
            .or(compiler_section.length_unit)
            .unwrap_or_default();
        let compiler = CompilerConfigBuilder::new().length_unit(length_unit).build();

        let output = OutputConfig {
            format: args
                .format
                .or(output_section.format)
                .unwrap_or(defaults.format),
            precision: args
                .precision
                .or(output_section.precision)
                .unwrap_or(defaults.precision),
        };
        if output.precision > 16 {
            return Err(CliError::Config(format!(
                "`output.precision` must be at most 16 (got {}).",
                output.precision
            )));
        }

        debug!("Resolved configuration: {:?} / {:?}", compiler, output);
        Ok(AppConfig { compiler, output })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "compiler.length-unit" => {
                    self.compiler
                        .get_or_insert_with(Default::default)
                        .length_unit =
                        Some(LengthUnit::from_str(value_str).map_err(CliError::Config)?);
                }
                "output.format" => {
                    self.output.get_or_insert_with(Default::default).format = Some(
                        OutputFormat::from_str(value_str, true).map_err(|_| {
                            CliError::Config(format!(
                                "Invalid output format for {}: {}",
                                key, value_str
                            ))
                        })?,
                    );
                }
                "output.precision" => {
                    self.output.get_or_insert_with(Default::default).precision =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid integer value for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("geoconstr.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn input_args(extra: &[&str]) -> InputArgs {
        let mut args = vec!["geoconstr", "compile", "-s", "in.xyz", "-c", "constraints.txt"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Compile(compile) => compile.input,
            other => panic!("Expected 'compile' subcommand, got {other:?}"),
        }
    }

    #[test]
    fn defaults_apply_without_config_file() {
        let config = PartialAppConfig::default()
            .merge_with_cli(&input_args(&[]))
            .unwrap();
        assert_eq!(config.compiler.length_unit, LengthUnit::Bohr);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [compiler]
            length-unit = "angstrom"

            [output]
            format = "json"
            precision = 3
            "#,
        );
        let config = PartialAppConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&input_args(&[]))
            .unwrap();
        assert_eq!(config.compiler.length_unit, LengthUnit::Angstrom);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.precision, 3);
    }

    #[test]
    fn cli_flags_override_set_values_and_file() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "[compiler]\nlength-unit = \"angstrom\"\n[output]\nprecision = 3\n",
        );
        let args = input_args(&[
            "-u",
            "bohr",
            "-S",
            "output.precision=8",
            "-S",
            "output.format=json",
        ]);
        let config = PartialAppConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(config.compiler.length_unit, LengthUnit::Bohr);
        assert_eq!(config.output.precision, 8);
        assert_eq!(config.output.format, OutputFormat::Json);

        let args = input_args(&["-S", "output.precision=8", "--precision", "2"]);
        let config = PartialAppConfig::default().merge_with_cli(&args).unwrap();
        assert_eq!(config.output.precision, 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "[compiler]\nunits = \"bohr\"\n");
        assert!(matches!(
            PartialAppConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));

        let args = input_args(&["-S", "compiler.units=bohr"]);
        assert!(matches!(
            PartialAppConfig::default().merge_with_cli(&args),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["output.precision", "output.precision=many", "compiler.length-unit=parsec"] {
            let args = input_args(&["-S", bad]);
            assert!(
                matches!(
                    PartialAppConfig::default().merge_with_cli(&args),
                    Err(CliError::Config(_))
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn excessive_precision_is_rejected() {
        let args = input_args(&["--precision", "40"]);
        assert!(matches!(
            PartialAppConfig::default().merge_with_cli(&args),
            Err(CliError::Config(_))
        ));
    }
}
