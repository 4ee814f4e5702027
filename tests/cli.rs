use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const BOOK: &str = "package com.example.model;\n\npublic class Book {\n    private String title;\n}\n";

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jpa-scaffold"))
        .current_dir(dir)
        .args(["--no-color"])
        .args(args)
        .output()
        .expect("failed to launch jpa-scaffold")
}

fn book_file(dir: &TempDir) -> String {
    let path = dir.path().join("Book.java");
    fs::write(&path, BOOK).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_add_attribute_prints_result() {
    let dir = TempDir::new().unwrap();
    let file = book_file(&dir);
    let output = run(dir.path(), &["add-attribute", &file, "id", "Long", "--kind", "identifier"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("    @Id\n    private Long id;"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("import added: jakarta.persistence.Id"));
    // Without --write the file is left alone
    assert_eq!(fs::read_to_string(&file).unwrap(), BOOK);
}

#[test]
fn test_write_and_rerun_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let file = book_file(&dir);
    let args = ["--write", "add-attribute", file.as_str(), "isbn", "String", "--unique"];

    assert!(run(dir.path(), &args).status.success());
    let written = fs::read_to_string(&file).unwrap();
    assert!(written.contains("@Column(unique = true)\n    private String isbn;"));

    let again = run(dir.path(), &args);
    assert!(again.status.success());
    let stderr = String::from_utf8_lossy(&again.stderr);
    assert!(stderr.contains("warning: attribute `isbn` already exists"));
    assert!(stderr.contains("unchanged"));
    assert_eq!(fs::read_to_string(&file).unwrap(), written);
}

#[test]
fn test_relationship_needs_known_target() {
    let dir = TempDir::new().unwrap();
    let file = book_file(&dir);

    let unresolved = run(dir.path(), &["add-relationship", &file, "many-to-one", "Author", "author"]);
    assert!(!unresolved.status.success());
    assert!(String::from_utf8_lossy(&unresolved.stderr).contains("cannot be resolved"));

    let resolved = run(
        dir.path(),
        &[
            "--type",
            "Author=com.example.people",
            "add-relationship",
            &file,
            "many-to-one",
            "Author",
            "author",
            "--fetch",
            "lazy",
        ],
    );
    assert!(resolved.status.success(), "stderr: {}", String::from_utf8_lossy(&resolved.stderr));
    let stdout = String::from_utf8_lossy(&resolved.stdout);
    assert!(stdout.contains("import com.example.people.Author;"));
    assert!(stdout.contains("@ManyToOne(fetch = FetchType.LAZY)\n    private Author author;"));
}

#[test]
fn test_types_file_and_config() {
    let dir = TempDir::new().unwrap();
    let file = book_file(&dir);
    let types = dir.path().join("types.json");
    fs::write(&types, r#"{"Status": {"package": "com.example.model.types", "kind": "enum"}}"#).unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"namespace": "javax"}"#).unwrap();

    let output = run(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--types-file",
            types.to_str().unwrap(),
            "add-attribute",
            &file,
            "status",
            "Status",
            "--kind",
            "enum",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("import com.example.model.types.Status;"));
    assert!(stdout.contains("import javax.persistence.Enumerated;"));
    assert!(stdout.contains("@Enumerated(EnumType.STRING)"));
}

#[test]
fn test_create_type_writes_under_source_root() {
    let dir = TempDir::new().unwrap();
    let args = [
        "--write",
        "create-type",
        "Book",
        "--package",
        "com.example.model",
        "--source-root",
        "src/main/java",
        "--table",
        "books",
    ];
    let output = run(dir.path(), &args);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let created = dir.path().join("src/main/java/com/example/model/Book.java");
    let text = fs::read_to_string(&created).unwrap();
    assert!(text.starts_with("package com.example.model;\n"));
    assert!(text.contains("@Entity\n@Table(name = \"books\")\npublic class Book {"));

    // Never overwrite an existing type
    assert!(!run(dir.path(), &args).status.success());
}

#[test]
fn test_annotate_type_arguments() {
    let dir = TempDir::new().unwrap();
    let file = book_file(&dir);
    let output = run(dir.path(), &["annotate-type", &file, "Table", "--arg", "name=\"books\""]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("@Table(name = \"books\")\npublic class Book"));

    let malformed = run(dir.path(), &["annotate-type", &file, "Table", "--arg", "name"]);
    assert!(!malformed.status.success());
}

#[test]
fn test_relationship_cascade_and_collection_flags() {
    let dir = TempDir::new().unwrap();
    let file = book_file(&dir);
    let output = run(
        dir.path(),
        &[
            "--type",
            "Chapter=com.example.model",
            "add-relationship",
            &file,
            "one-to-many",
            "Chapter",
            "chapters",
            "--mapped-by",
            "book",
            "--cascade",
            "persist,merge",
            "--orphan-removal",
            "--collection",
            "list",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(
        "@OneToMany(mappedBy = \"book\", orphanRemoval = true, cascade = {CascadeType.PERSIST, CascadeType.MERGE})\n    private List<Chapter> chapters = new ArrayList<>();"
    ));
    assert!(stdout.contains("import jakarta.persistence.CascadeType;"));

    let unknown = run(
        dir.path(),
        &["--type", "Chapter=com.example.model", "add-relationship", &file, "one-to-many", "Chapter", "chapters", "--cascade", "everything"],
    );
    assert!(!unknown.status.success());
}
