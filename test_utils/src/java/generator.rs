//! Random Java entity classes for property-based testing.
//!
//! `EntityClass` models a small, always well-formed compilation unit: an optional package,
//! a few imports, fields with persistence annotations and some user-authored methods.
//! Names are drawn so that they never collide with Java keywords or with each other.

use quickcheck::{Arbitrary, Gen};

const TYPE_NAMES: &[&str] = &["Book", "Author", "Invoice", "Customer", "Shipment", "Ledger"];

const PACKAGES: &[&str] = &["com.example.model", "org.library.domain", "shop"];

const KEYWORDS: &[&str] = &[
    "do", "if", "for", "int", "new", "try", "case", "char", "else", "enum", "goto", "long", "this",
    "void", "byte", "null", "true", "false", "final", "float", "short", "super", "while", "break",
    "catch", "class", "const", "throw", "double", "import", "native", "public", "return",
    "static", "switch", "throws", "boolean", "default", "extends", "finally", "package",
    "private", "abstract", "continue", "strictfp", "volatile", "interface", "protected",
    "transient", "implements", "instanceof", "synchronized", "assert", "record", "var", "yield",
];

/// Field types with the import each one needs, if any
const FIELD_TYPES: &[(&str, Option<&str>)] = &[
    ("String", None),
    ("Long", None),
    ("Integer", None),
    ("int", None),
    ("boolean", None),
    ("LocalDate", Some("java.time.LocalDate")),
    ("BigDecimal", Some("java.math.BigDecimal")),
    ("List<String>", Some("java.util.List")),
];

const INDENTS: &[&str] = &["    ", "  ", "\t"];

#[derive(Clone, Debug)]
pub struct GeneratedField {
    pub name: String,
    pub declared_type: String,
    pub annotations: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GeneratedMethod {
    pub name: String,
    /// Complete declaration with a body, first line unindented, following lines without
    /// member indentation (added when rendering)
    pub lines: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct EntityClass {
    pub package: Option<String>,
    pub name: String,
    pub imports: Vec<String>,
    pub entity: bool,
    pub fields: Vec<GeneratedField>,
    pub methods: Vec<GeneratedMethod>,
    pub indent: String,
}

/// Generates a random number in the range [min, max] inclusive.
fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

/// Generates a lower camel case identifier that is not a keyword and not in `taken`.
pub fn gen_field_name(g: &mut Gen, taken: &[String]) -> String {
    let starters: Vec<char> = "abcdefghijklmnopqrstuvwxyz".chars().collect();
    let continuers: Vec<char> = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".chars().collect();
    loop {
        let len = gen_range(g, 2, 10);
        let mut name = String::new();
        name.push(*g.choose(&starters).unwrap());
        for _ in 1..len {
            name.push(*g.choose(&continuers).unwrap());
        }
        if !KEYWORDS.contains(&name.as_str()) && !taken.contains(&name) {
            return name;
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn gen_field(g: &mut Gen, taken: &[String], identifier: bool) -> (GeneratedField, Option<&'static str>) {
    let name = gen_field_name(g, taken);
    let (declared_type, import) = if identifier {
        ("Long", None)
    } else {
        *g.choose(FIELD_TYPES).unwrap()
    };
    let mut annotations = Vec::new();
    if identifier {
        annotations.push("@Id".to_string());
    } else if bool::arbitrary(g) {
        annotations.push(format!("@Column(name = \"{}\")", name.to_lowercase()));
    }
    let field = GeneratedField {
        name,
        declared_type: declared_type.to_string(),
        annotations,
    };
    (field, import)
}

fn getter(field: &GeneratedField) -> GeneratedMethod {
    let name = format!("get{}", capitalize(&field.name));
    GeneratedMethod {
        lines: vec![
            format!("public {} {}() {{", field.declared_type, name),
            format!("INDENTreturn {};", field.name),
            "}".to_string(),
        ],
        name,
    }
}

fn describe(fields: &[GeneratedField]) -> GeneratedMethod {
    let parts: Vec<String> = fields.iter().map(|f| format!("\"{}=\" + {}", f.name, f.name)).collect();
    let expression = if parts.is_empty() {
        "\"\"".to_string()
    } else {
        parts.join(" + \", \" + ")
    };
    GeneratedMethod {
        name: "describe".to_string(),
        lines: vec![
            "public String describe() {".to_string(),
            "INDENT// user code, must survive every transformation".to_string(),
            format!("INDENTreturn {};", expression),
            "}".to_string(),
        ],
    }
}

impl Arbitrary for EntityClass {
    fn arbitrary(g: &mut Gen) -> Self {
        let package = bool::arbitrary(g).then(|| g.choose(PACKAGES).unwrap().to_string());
        let name = g.choose(TYPE_NAMES).unwrap().to_string();
        let entity = bool::arbitrary(g);
        let indent = g.choose(INDENTS).unwrap().to_string();

        let field_count = gen_range(g, 0, 5) as usize;
        let with_identifier = bool::arbitrary(g);
        let mut fields: Vec<GeneratedField> = Vec::new();
        let mut imports: Vec<String> = Vec::new();
        for i in 0..field_count {
            let taken: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
            let (field, import) = gen_field(g, &taken, with_identifier && i == 0);
            if let Some(import) = import {
                imports.push(import.to_string());
            }
            fields.push(field);
        }
        if entity {
            imports.push("jakarta.persistence.Entity".to_string());
        }
        if fields.iter().any(|f| f.annotations.iter().any(|a| a == "@Id")) {
            imports.push("jakarta.persistence.Id".to_string());
        }
        if fields.iter().any(|f| f.annotations.iter().any(|a| a.starts_with("@Column"))) {
            imports.push("jakarta.persistence.Column".to_string());
        }
        imports.sort();
        imports.dedup();

        let mut methods: Vec<GeneratedMethod> = fields.iter().filter(|_| bool::arbitrary(g)).map(getter).collect();
        if bool::arbitrary(g) {
            methods.push(describe(&fields));
        }

        EntityClass {
            package,
            name,
            imports,
            entity,
            fields,
            methods,
            indent,
        }
    }
}

impl EntityClass {
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Rendered text of every method, as it appears in `to_code()`
    pub fn method_texts(&self) -> Vec<String> {
        self.methods.iter().map(|m| self.render_method(m)).collect()
    }

    fn render_method(&self, method: &GeneratedMethod) -> String {
        method
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let line = line.replace("INDENT", &self.indent);
                if i == 0 { line } else { format!("{}{}", self.indent, line) }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_code(&self) -> String {
        let mut code = String::new();
        if let Some(package) = &self.package {
            code.push_str(&format!("package {};\n\n", package));
        }
        for import in &self.imports {
            code.push_str(&format!("import {};\n", import));
        }
        if !self.imports.is_empty() {
            code.push('\n');
        }
        if self.entity {
            code.push_str("@Entity\n");
        }
        code.push_str(&format!("public class {} {{\n", self.name));

        let mut members: Vec<String> = Vec::new();
        for field in &self.fields {
            let mut text = String::new();
            for annotation in &field.annotations {
                text.push_str(&format!("{}{}\n", self.indent, annotation));
            }
            text.push_str(&format!("{}private {} {};", self.indent, field.declared_type, field.name));
            members.push(text);
        }
        for method in &self.methods {
            members.push(format!("{}{}", self.indent, self.render_method(method)));
        }
        code.push_str(&members.join("\n\n"));
        if !members.is_empty() {
            code.push('\n');
        }
        code.push_str("}\n");
        code
    }
}
