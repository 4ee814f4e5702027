//! New type files
//!
//! Creating a type is template instantiation rather than an edit: the result is the text
//! of a whole compilation unit plus the path it belongs at under the source root.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::index::TypeKind;

use super::templates::{new_type_file, string_literal};
use super::{normalize_package, validate_identifier, validate_qualified_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTypeRequest {
    pub kind: TypeKind,
    /// Dotted (`com.example`) or slash separated (`com/example`); empty for the default package
    pub package: String,
    pub name: String,
    pub source_root: PathBuf,
    /// Mark a class with `@Entity`. `None` follows the configuration default.
    pub entity: Option<bool>,
    /// Table name for `@Table`, entity classes only
    pub table: Option<String>,
}

impl CreateTypeRequest {
    pub fn new(kind: TypeKind, package: impl Into<String>, name: impl Into<String>, source_root: impl AsRef<Path>) -> Self {
        Self {
            kind,
            package: package.into(),
            name: name.into(),
            source_root: source_root.as_ref().to_path_buf(),
            entity: None,
            table: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTypeFile {
    /// `source_root/com/example/Name.java`
    pub path: PathBuf,
    pub text: String,
    pub imports: Vec<String>,
}

pub fn create_type(config: &EngineConfig, request: &CreateTypeRequest) -> Result<NewTypeFile, EngineError> {
    validate_identifier(&request.name)?;
    let package = normalize_package(&request.package);
    if !package.is_empty() {
        validate_qualified_name(&package)?;
    }

    let entity = match request.kind {
        TypeKind::Class => request.entity.unwrap_or(config.entity_by_default),
        kind if request.entity == Some(true) => {
            return Err(EngineError::UnsupportedTypeKind {
                operation: "CreateType with @Entity",
                kind,
            });
        }
        _ => false,
    };

    let persistence = config.namespace.persistence_package();
    let mut imports = Vec::new();
    let mut annotations = Vec::new();
    if entity {
        imports.push(format!("{}.Entity", persistence));
        annotations.push("@Entity".to_string());
        if let Some(table) = &request.table {
            imports.push(format!("{}.Table", persistence));
            annotations.push(format!("@Table(name = {})", string_literal(table)));
        }
    }

    let text = new_type_file(&package, &imports, &annotations, request.kind, &request.name);
    let mut path = request.source_root.clone();
    path.extend(package.split('.').filter(|s| !s.is_empty()));
    path.push(format!("{}.java", request.name));

    debug!("Created {} {} at {:?}", request.kind, request.name, path);
    Ok(NewTypeFile { path, text, imports })
}
