use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use jpa_scaffold::logging::init_logger;
use jpa_scaffold::{
    AttributeKind, AttributeRequest, CascadeType, CollectionType, CreateTypeRequest, Engine,
    EngineConfig, EnumStorage, FetchType, GenerationStrategy, KnownTypes, RelationshipKind,
    RelationshipRequest, TransformOutcome, TypeAnnotationRequest, TypeKind,
};

/// Scaffold and evolve JPA entity sources
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration (JSON)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Known type, repeatable: `Author=com.example.model` or `Status=com.example.model:enum`
    #[arg(long = "type", value_name = "NAME=PACKAGE[:KIND]", global = true)]
    types: Vec<String>,

    /// JSON object of known types: {"Author": {"package": "...", "kind": "class"}}
    #[arg(long, value_name = "FILE", global = true)]
    types_file: Option<PathBuf>,

    /// Write the result to disk instead of printing it
    #[arg(long, global = true)]
    write: bool,

    /// Log filter for stderr (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long, global = true)]
    no_color: bool,

    /// Also write a debug session log to the user cache directory
    #[arg(long, global = true)]
    log_file: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new class, interface, enum, record or annotation type
    CreateType {
        /// class, interface, enum, record or annotation
        #[arg(long, default_value = "class")]
        kind: TypeKind,
        /// Package, dotted or slash separated
        #[arg(long, default_value = "")]
        package: String,
        /// Simple type name
        name: String,
        /// Source root the package directories live under
        #[arg(long, default_value = "src/main/java")]
        source_root: PathBuf,
        /// Do not mark the class with @Entity
        #[arg(long)]
        no_entity: bool,
        /// Table name for @Table
        #[arg(long)]
        table: Option<String>,
    },

    /// Add an identifier, basic or enum-typed attribute
    AddAttribute {
        file: PathBuf,
        /// Field name
        name: String,
        /// Declared Java type
        java_type: String,
        /// identifier, basic or enum
        #[arg(long, default_value = "basic")]
        kind: AttributeKind,
        #[arg(long)]
        not_null: bool,
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        length: Option<u32>,
        #[arg(long)]
        unique: bool,
        /// identity, sequence, uuid or auto (identifiers only)
        #[arg(long)]
        generation: Option<GenerationStrategy>,
        /// string or ordinal (enum-typed attributes only)
        #[arg(long, default_value = "string")]
        enum_storage: EnumStorage,
    },

    /// Add an association to another entity
    AddRelationship {
        file: PathBuf,
        /// many-to-one, one-to-one, one-to-many or many-to-many
        kind: RelationshipKind,
        /// Simple name of the target entity
        target: String,
        /// Field name
        field: String,
        /// Expected package of the target
        #[arg(long, default_value = "")]
        target_package: String,
        #[command(flatten)]
        options: RelationshipArgs,
        /// Also regenerate equals/hashCode
        #[arg(long)]
        equals_hash_code: bool,
    },

    /// Generate or refresh equals/hashCode over the identifier attributes
    RegenerateEqualsHashCode { file: PathBuf },

    /// Add a type-level annotation such as @Entity or @Table
    AnnotateType {
        file: PathBuf,
        /// Simple or qualified annotation name
        name: String,
        /// Annotation argument, repeatable: `name="books"`
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        arguments: Vec<String>,
    },
}

#[derive(Args)]
struct RelationshipArgs {
    /// lazy or eager
    #[arg(long)]
    fetch: Option<FetchType>,
    #[arg(long)]
    join_column: Option<String>,
    #[arg(long)]
    mapped_by: Option<String>,
    #[arg(long)]
    not_null: bool,
    /// The association is part of the owner's identifier
    #[arg(long)]
    identifier: bool,
    /// persist, merge, remove, refresh, detach or all; comma separated or repeated
    #[arg(long, value_delimiter = ',', value_name = "OPERATION")]
    cascade: Vec<String>,
    /// One-to-one and one-to-many only
    #[arg(long)]
    orphan_removal: bool,
    /// set or list (to-many associations only)
    #[arg(long, default_value = "set")]
    collection: CollectionType,
}

impl RelationshipArgs {
    fn cascade(&self) -> anyhow::Result<Vec<CascadeType>> {
        let mut cascade = Vec::new();
        for name in &self.cascade {
            if name.eq_ignore_ascii_case("all") {
                cascade.extend(CascadeType::ALL);
            } else {
                cascade.push(name.parse().map_err(anyhow::Error::msg)?);
            }
        }
        Ok(cascade)
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path).with_context(|| format!("loading config {:?}", path)),
        None => Ok(EngineConfig::default()),
    }
}

fn load_types(cli: &Cli) -> anyhow::Result<KnownTypes> {
    let mut types = match &cli.types_file {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            KnownTypes::from_json_str(&json).with_context(|| format!("parsing {:?}", path))?
        }
        None => KnownTypes::new(),
    };
    for entry in &cli.types {
        let (name, resolved) = KnownTypes::parse_entry(entry).map_err(anyhow::Error::msg)?;
        types.insert(name, resolved);
    }
    Ok(types)
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {:?}", path))
}

fn emit(path: &Path, outcome: &TransformOutcome, write: bool) -> anyhow::Result<()> {
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    for import in &outcome.added_imports {
        eprintln!("import added: {}", import);
    }
    if write {
        if outcome.changed {
            fs::write(path, &outcome.text).with_context(|| format!("writing {:?}", path))?;
            eprintln!("updated {:?} ({} edits)", path, outcome.edits_applied);
        } else {
            eprintln!("{:?} unchanged", path);
        }
    } else {
        print!("{}", outcome.text);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), cli.log_file)?;

    let config = load_config(cli.config.as_deref())?;
    let types = load_types(&cli)?;
    debug!("{} known types", types.len());
    let engine = Engine::new(config)?;

    match &cli.command {
        Commands::CreateType {
            kind,
            package,
            name,
            source_root,
            no_entity,
            table,
        } => {
            let mut request = CreateTypeRequest::new(*kind, package.as_str(), name.as_str(), source_root);
            request.entity = no_entity.then_some(false);
            request.table = table.clone();
            let file = engine.create_type(&request)?;
            if cli.write {
                if file.path.exists() {
                    bail!("{:?} already exists", file.path);
                }
                if let Some(parent) = file.path.parent() {
                    fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
                }
                fs::write(&file.path, &file.text).with_context(|| format!("writing {:?}", file.path))?;
                eprintln!("created {:?}", file.path);
            } else {
                print!("{}", file.text);
            }
        }
        Commands::AddAttribute {
            file,
            name,
            java_type,
            kind,
            not_null,
            column,
            length,
            unique,
            generation,
            enum_storage,
        } => {
            let mut request = AttributeRequest::new(*kind, name.as_str(), java_type.as_str());
            request.nullable = !not_null;
            request.options.column_name = column.clone();
            request.options.length = *length;
            request.options.unique = *unique;
            request.options.generation = *generation;
            request.options.enum_storage = *enum_storage;
            let outcome = engine.add_attribute(&read_source(file)?, &request, &types)?;
            emit(file, &outcome, cli.write)?;
        }
        Commands::AddRelationship {
            file,
            kind,
            target,
            field,
            target_package,
            options,
            equals_hash_code,
        } => {
            let mut request =
                RelationshipRequest::new(*kind, target.as_str(), target_package.as_str(), field.as_str());
            request.generate_equals_hash_code = *equals_hash_code;
            request.options.fetch = options.fetch;
            request.options.join_column = options.join_column.clone();
            request.options.mapped_by = options.mapped_by.clone();
            request.options.nullable = !options.not_null;
            request.options.identifier = options.identifier;
            request.options.cascade = options.cascade()?;
            request.options.orphan_removal = options.orphan_removal;
            request.options.collection = options.collection;
            let outcome = engine.add_relationship(&read_source(file)?, &request, &types)?;
            emit(file, &outcome, cli.write)?;
        }
        Commands::RegenerateEqualsHashCode { file } => {
            let outcome = engine.regenerate_equals_hash_code(&read_source(file)?, &types)?;
            emit(file, &outcome, cli.write)?;
        }
        Commands::AnnotateType { file, name, arguments } => {
            let mut request = TypeAnnotationRequest::new(name.as_str());
            for argument in arguments {
                let Some((key, value)) = argument.split_once('=') else {
                    bail!("expected KEY=VALUE, got `{}`", argument);
                };
                request = request.with_argument(key.trim(), value.trim());
            }
            let outcome = engine.annotate_type(&read_source(file)?, &request, &types)?;
            emit(file, &outcome, cli.write)?;
        }
    }

    Ok(())
}
