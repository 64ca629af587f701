//! The `mutation_generator` module provides the `discover_mutations` and `generate_mutants`
//! functions that drive the mutation engine over class files on disk.

use crate::config_file::{ConfigurationFileDetails, CONFIG_FILE_EXTENSION};
use crate::{DiscoverCLArgs, MutateCLArgs, SelectionCLArgs};
use bytemut_lib::descriptor::MethodDescriptor;
use bytemut_lib::mutation::{default_operator_types, get_all_operator_types, OperatorType};
use bytemut_lib::{
    BytemutError, ClassFormat, ClassMutationEngine, EngineConfiguration, MethodSignature,
    MutationDetails, MutationIdentifier, MutationTarget, TargetSet,
};
use serde::Deserialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The settings that control one run of the generator, after merging the command line with
/// any configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    /// The ids of the operators to register.
    pub operators: Vec<String>,

    /// The mutations the engine reports.
    pub targets: TargetSet,

    /// The location where the tool should put generated output files.
    pub output_directory: PathBuf,
}

impl GeneratorSettings {
    /// Create the engine described by the settings.
    fn engine(&self) -> Result<ClassMutationEngine, BytemutError> {
        ClassMutationEngine::from_configuration(&EngineConfiguration {
            operators: self.operators.clone(),
            targets: self.targets.clone(),
        })
    }
}

/// An entry of a mutation selection file.  The discover command writes full details, but a
/// hand-written file may list bare identifiers.
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectedMutation {
    Details(MutationDetails),
    Identifier(MutationIdentifier),
}

/// Convert a vector of [`OperatorType`] to a vector of [`String`].
///
/// # Arguments
///
/// * `array` - The array of operator types to convert to strings.
fn get_operator_strings_from_types(array: &[OperatorType]) -> Vec<String> {
    array.iter().map(|t| t.to_string()).collect()
}

/// Parse a method given on the command line as `name(descriptor)`, for example
/// `deposit(II)I`.
///
/// # Arguments
///
/// * `text` - The method text.
fn parse_method_signature(text: &str) -> Result<MethodSignature, BytemutError> {
    match text.find('(') {
        Some(index) if index > 0 => {
            let (name, descriptor) = text.split_at(index);
            MethodDescriptor::from_str(descriptor)?;
            Ok(MethodSignature::new(name, descriptor))
        }
        _ => Err(BytemutError::MalformedInput(format!(
            "method {} is not of the form name(descriptor)",
            text
        ))),
    }
}

/// Merge the command line selection and the optional configuration file into the settings for
/// a run.  Values present in the configuration file take precedence.
///
/// # Arguments
///
/// * `selection` - The operator and target arguments from the command line.
/// * `output_directory` - The output directory from the command line.
fn settings_from_args(
    selection: &SelectionCLArgs,
    output_directory: &str,
) -> Result<GeneratorSettings, BytemutError> {
    // Selection.all_operators takes precedence over individual operators.
    let operators = if selection.all_operators {
        get_operator_strings_from_types(&get_all_operator_types())
    } else if !selection.operators.is_empty() {
        selection.operators.clone()
    } else {
        get_operator_strings_from_types(&default_operator_types())
    };

    let mut targets = TargetSet::new();
    for method in &selection.methods {
        targets.add_target(MutationTarget::any().with_method(&parse_method_signature(method)?));
    }

    let mut settings = GeneratorSettings {
        operators,
        targets,
        output_directory: PathBuf::from(output_directory),
    };

    if let Some(config_file) = &selection.config_file {
        let details = ConfigurationFileDetails::new_from_file(config_file)?;

        if !details.operators.is_empty() {
            settings.operators = details.operators;
        }

        if !details.targets.is_empty() {
            settings.targets = details.targets;
        }

        if let Some(output_directory) = details.output_directory {
            settings.output_directory = output_directory;
        }
    }

    Ok(settings)
}

/// Return the file name of `file_name` without its extension.
fn base_file_name(file_name: &str) -> String {
    match Path::new(file_name).file_stem() {
        Some(stem) => stem.to_string_lossy().into_owned(),
        None => String::from(file_name),
    }
}

/// Load the identifiers listed in the selection file `file_name`.
///
/// # Arguments
///
/// * `file_name` - A JSON file holding an array of mutation details or identifiers.
fn load_selected_mutations(file_name: &str) -> Result<Vec<MutationIdentifier>, BytemutError> {
    let contents = std::fs::read_to_string(file_name)?;
    let selected: Vec<SelectedMutation> = serde_json::from_str(&contents)?;

    Ok(selected
        .into_iter()
        .map(|s| match s {
            SelectedMutation::Details(details) => details.id,
            SelectedMutation::Identifier(id) => id,
        })
        .collect())
}

/// Write `mutations` as a JSON array to `stream`.
fn write_mutation_details<W: Write>(
    mutations: &[MutationDetails],
    stream: &mut W,
) -> Result<(), BytemutError> {
    serde_json::to_writer_pretty(&mut *stream, mutations)?;
    writeln!(stream)?;
    Ok(())
}

/// Discover the mutations in each requested class file and write their details as JSON.
///
/// # Arguments
///
/// * `args` - The command line arguments that control discovery.
pub fn discover_mutations(args: DiscoverCLArgs) -> Result<Vec<MutationDetails>, BytemutError> {
    let settings = settings_from_args(&args.selection, ".")?;
    let engine = settings.engine()?;

    let mut mutations: Vec<MutationDetails> = Vec::new();
    for file_name in &args.file_names {
        let bytes = std::fs::read(file_name)?;
        let found = engine.find_mutations(&bytes)?;
        log::info!("Found {} mutations in {}", found.len(), file_name);
        mutations.extend(found);
    }

    match &args.output {
        Some(output) => {
            let mut file = File::create(output)?;
            write_mutation_details(&mutations, &mut file)?;
            println!(
                "Wrote details of {} mutations to {}",
                mutations.len(),
                output
            );
        }
        None => {
            let mut stdout = std::io::stdout();
            write_mutation_details(&mutations, &mut stdout)?;
        }
    }

    Ok(mutations)
}

/// Run the mutant generator and return the paths of the files written.
///
/// # Arguments
///
/// * `args` - The command line arguments that control mutant generation.
pub fn generate_mutants(args: MutateCLArgs) -> Result<Vec<PathBuf>, BytemutError> {
    let settings = settings_from_args(&args.selection, &args.output_directory)?;
    let engine = settings.engine()?;

    let bytes = std::fs::read(&args.file_name)?;
    let format = ClassFormat::detect(&bytes)?;

    let selected: Vec<MutationIdentifier> = match &args.mutations {
        Some(mutations_file) => load_selected_mutations(mutations_file)?,
        None => engine
            .find_mutations(&bytes)?
            .into_iter()
            .map(|d| d.id)
            .collect(),
    };

    let mut files_written: Vec<PathBuf> = Vec::new();

    if selected.is_empty() {
        println!("No mutations selected for {}", args.file_name);
        return Ok(files_written);
    }

    std::fs::create_dir_all(&settings.output_directory)?;
    let base_name = base_file_name(&args.file_name);

    if args.combine {
        let artifact = engine.build_artifact(&bytes, &selected)?;
        let out_file_path = settings
            .output_directory
            .join(format!("{}_meta.{}", base_name, format.extension()));
        std::fs::write(&out_file_path, artifact)?;

        println!(
            "{} mutations combined into mutant written to {}",
            selected.len(),
            out_file_path.display()
        );
        files_written.push(out_file_path);
    } else {
        for (i, id) in selected.iter().enumerate() {
            let artifact = engine.get_mutation(&bytes, id)?;
            let out_file_path = settings
                .output_directory
                .join(format!("{}_{}.{}", base_name, i, format.extension()));
            std::fs::write(&out_file_path, artifact)?;

            println!(
                "{} used to create mutant written to {}",
                id,
                out_file_path.display()
            );
            files_written.push(out_file_path);
        }
    }

    if args.save_config_file {
        let details = ConfigurationFileDetails {
            operators: settings.operators.clone(),
            targets: settings.targets.clone(),
            output_directory: Some(settings.output_directory.clone()),
        };

        let out_file_path = settings
            .output_directory
            .join(format!("{}.{}", base_name, CONFIG_FILE_EXTENSION));
        println!("Writing configuration file {}", out_file_path.display());
        details.write_to_file_as_json(&out_file_path)?;
        files_written.push(out_file_path);
    }

    Ok(files_written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemut_lib::codec::{ClassCodec, JsonClassCodec};
    use bytemut_lib::instruction::{ArithOp, Instruction, ValueKind};
    use bytemut_lib::{CompiledClass, CompiledMethod};

    fn load(slot: u16) -> Instruction {
        Instruction::Load {
            kind: ValueKind::Int,
            slot,
        }
    }

    fn arith_method(name: &str, op: ArithOp) -> CompiledMethod {
        CompiledMethod::new(
            name,
            "(II)I",
            vec![
                load(1),
                load(2),
                Instruction::Arith {
                    kind: ValueKind::Int,
                    op,
                },
                Instruction::ReturnValue {
                    kind: ValueKind::Int,
                },
            ],
        )
    }

    fn write_class(directory: &Path) -> String {
        let class = CompiledClass::new(
            "com/example/Calculator",
            vec![
                arith_method("add", ArithOp::Add),
                arith_method("multiply", ArithOp::Multiply),
            ],
        );
        let path = directory.join("Calculator.json");
        std::fs::write(&path, JsonClassCodec {}.encode(&class).unwrap()).unwrap();
        String::from(path.to_str().unwrap())
    }

    fn mutate_args(file_name: &str, output_directory: &Path) -> MutateCLArgs {
        MutateCLArgs {
            file_name: String::from(file_name),
            output_directory: String::from(output_directory.to_str().unwrap()),
            mutations: None,
            combine: false,
            save_config_file: false,
            selection: SelectionCLArgs::default(),
        }
    }

    #[test]
    fn test_parse_method_signature() {
        assert_eq!(
            parse_method_signature("deposit(II)I").unwrap(),
            MethodSignature::new("deposit", "(II)I")
        );
        assert!(parse_method_signature("deposit").is_err());
        assert!(parse_method_signature("(II)I").is_err());
        assert!(parse_method_signature("deposit(Q)I").is_err());
    }

    #[test]
    fn test_settings_precedence() {
        let directory = tempfile::tempdir().unwrap();
        let config_path = directory.path().join("calc.bmut");
        std::fs::write(
            &config_path,
            r#"{"operators": ["INCREMENTS"], "output-directory": "from-config"}"#,
        )
        .unwrap();

        let mut selection = SelectionCLArgs {
            operators: vec![String::from("MATH")],
            all_operators: true,
            methods: vec![String::from("add(II)I")],
            config_file: None,
        };

        let settings = settings_from_args(&selection, "out").unwrap();
        assert_eq!(settings.operators.len(), get_all_operator_types().len());
        assert_eq!(settings.targets.len(), 1);
        assert_eq!(settings.output_directory, PathBuf::from("out"));

        selection.config_file = Some(String::from(config_path.to_str().unwrap()));
        let settings = settings_from_args(&selection, "out").unwrap();
        assert_eq!(settings.operators, vec!["INCREMENTS"]);
        assert_eq!(settings.targets.len(), 1);
        assert_eq!(settings.output_directory, PathBuf::from("from-config"));
    }

    #[test]
    fn test_discover_writes_details() {
        let directory = tempfile::tempdir().unwrap();
        let class_file = write_class(directory.path());
        let output = directory.path().join("mutations.json");

        let found = discover_mutations(DiscoverCLArgs {
            file_names: vec![class_file],
            output: Some(String::from(output.to_str().unwrap())),
            selection: SelectionCLArgs::default(),
        })
        .unwrap();
        assert_eq!(found.len(), 2);

        let written: Vec<MutationDetails> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, found);
    }

    #[test]
    fn test_generate_one_mutant_per_mutation() {
        let directory = tempfile::tempdir().unwrap();
        let class_file = write_class(directory.path());
        let output_directory = directory.path().join("out");

        let written = generate_mutants(mutate_args(&class_file, &output_directory)).unwrap();
        assert_eq!(
            written,
            vec![
                output_directory.join("Calculator_0.json"),
                output_directory.join("Calculator_1.json"),
            ]
        );

        let mutant = JsonClassCodec {}
            .decode(&std::fs::read(&written[1]).unwrap())
            .unwrap();
        assert_eq!(
            mutant.methods[1].instructions[2],
            Instruction::Arith {
                kind: ValueKind::Int,
                op: ArithOp::Divide,
            }
        );
        assert_eq!(mutant.methods[0], arith_method("add", ArithOp::Add));
    }

    #[test]
    fn test_generate_combined_mutant_from_selection_file() {
        let directory = tempfile::tempdir().unwrap();
        let class_file = write_class(directory.path());
        let output_directory = directory.path().join("out");

        let selection_file = directory.path().join("selected.json");
        let ids = vec![
            MutationIdentifier::new(
                "com/example/Calculator",
                &MethodSignature::new("add", "(II)I"),
                "MATH",
                0,
            ),
            MutationIdentifier::new(
                "com/example/Calculator",
                &MethodSignature::new("multiply", "(II)I"),
                "MATH",
                0,
            ),
        ];
        std::fs::write(&selection_file, serde_json::to_string(&ids).unwrap()).unwrap();

        let mut args = mutate_args(&class_file, &output_directory);
        args.mutations = Some(String::from(selection_file.to_str().unwrap()));
        args.combine = true;
        args.save_config_file = true;

        let written = generate_mutants(args).unwrap();
        assert_eq!(
            written,
            vec![
                output_directory.join("Calculator_meta.json"),
                output_directory.join("Calculator.bmut"),
            ]
        );

        let mutant = JsonClassCodec {}
            .decode(&std::fs::read(&written[0]).unwrap())
            .unwrap();
        assert_eq!(mutant.methods[0], arith_method("add", ArithOp::Subtract));
        assert_eq!(mutant.methods[1], arith_method("multiply", ArithOp::Divide));

        let saved =
            ConfigurationFileDetails::new_from_file(written[1].to_str().unwrap()).unwrap();
        assert_eq!(saved.output_directory, Some(output_directory.clone()));
    }

    #[test]
    fn test_unknown_selection_fails() {
        let directory = tempfile::tempdir().unwrap();
        let class_file = write_class(directory.path());
        let selection_file = directory.path().join("selected.json");
        std::fs::write(
            &selection_file,
            r#"[{"class_name": "com/example/Calculator",
                 "method": {"name": "add", "descriptor": "(II)I"},
                 "operator": "MATH", "index": 3}]"#,
        )
        .unwrap();

        let mut args = mutate_args(&class_file, &directory.path().join("out"));
        args.mutations = Some(String::from(selection_file.to_str().unwrap()));

        assert!(matches!(
            generate_mutants(args),
            Err(BytemutError::MutationNotFound(_))
        ));
    }
}
