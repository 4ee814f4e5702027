use indoc::indoc;

use jpa_scaffold::{
    AttributeKind, AttributeRequest, CascadeType, CollectionType, CreateTypeRequest, Engine,
    EngineConfig, EngineError, EnumStorage, FetchType, GenerationStrategy, KnownTypes, NoTypes,
    Operation, PersistenceNamespace, RelationshipKind, RelationshipRequest, TypeAnnotationRequest,
    TypeKind, Warning,
};

fn engine() -> Engine {
    Engine::new(EngineConfig::default()).expect("built-in queries compile")
}

#[test]
fn test_operation_catalog() {
    let names: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
    assert_eq!(
        names,
        vec!["CreateType", "AddAttribute", "AddRelationship", "RegenerateEqualsHashCode", "AnnotateType"]
    );
    assert!(Operation::CreateType.required_queries().is_empty());
}

#[test]
fn test_create_then_evolve_entity() {
    let engine = engine();
    let file = engine
        .create_type(&CreateTypeRequest::new(TypeKind::Class, "com.example.model", "Book", "src/main/java"))
        .unwrap();

    let mut id = AttributeRequest::new(AttributeKind::Identifier, "id", "Long");
    id.options.generation = Some(GenerationStrategy::Identity);
    let step = engine.add_attribute(&file.text, &id, &NoTypes).unwrap();

    let mut title = AttributeRequest::new(AttributeKind::Basic, "title", "String");
    title.nullable = false;
    title.options.length = Some(200);
    let step = engine.add_attribute(&step.text, &title, &NoTypes).unwrap();

    let step = engine.regenerate_equals_hash_code(&step.text, &NoTypes).unwrap();
    assert_eq!(
        step.text,
        indoc! {"
            package com.example.model;

            import jakarta.persistence.Column;
            import jakarta.persistence.Entity;
            import jakarta.persistence.GeneratedValue;
            import jakarta.persistence.GenerationType;
            import jakarta.persistence.Id;
            import jakarta.validation.constraints.NotNull;
            import jakarta.validation.constraints.Size;
            import java.util.Objects;

            @Entity
            public class Book {
                @Id
                @GeneratedValue(strategy = GenerationType.IDENTITY)
                private Long id;

                @Column(nullable = false, length = 200)
                @NotNull
                @Size(max = 200)
                private String title;

                @Override
                public boolean equals(Object o) {
                    if (this == o) return true;
                    if (!(o instanceof Book)) return false;
                    Book other = (Book) o;
                    return Objects.equals(id, other.id);
                }

                @Override
                public int hashCode() {
                    return Objects.hash(id);
                }
            }
        "}
    );
}

#[test]
fn test_regeneration_follows_identifier_changes() {
    let engine = engine();
    let source = indoc! {"
        import jakarta.persistence.Id;

        class Edition {
            @Id
            private String isbn;
        }
    "};
    let generated = engine.regenerate_equals_hash_code(source, &NoTypes).unwrap();
    assert!(generated.text.contains("return Objects.hash(isbn);"));

    let widened = engine
        .add_attribute(&generated.text, &AttributeRequest::new(AttributeKind::Identifier, "printing", "int"), &NoTypes)
        .unwrap();
    let refreshed = engine.regenerate_equals_hash_code(&widened.text, &NoTypes).unwrap();

    assert!(refreshed.warnings.is_empty());
    assert!(refreshed.text.contains("return Objects.equals(isbn, other.isbn) && Objects.equals(printing, other.printing);"));
    assert!(refreshed.text.contains("return Objects.hash(isbn, printing);"));
    assert_eq!(refreshed.text.matches("public boolean equals").count(), 1);
    assert_eq!(refreshed.text.matches("public int hashCode").count(), 1);
    assert_eq!(refreshed.text.matches("import java.util.Objects;").count(), 1);
}

#[test]
fn test_one_to_many_collection() {
    let source = indoc! {"
        package com.example.people;

        import jakarta.persistence.Entity;

        @Entity
        public class Author {
            private String name;
        }
    "};
    let types = KnownTypes::new().with("Book", "com.example.model", TypeKind::Class);
    let mut request = RelationshipRequest::new(RelationshipKind::OneToMany, "Book", "com.example.model", "books");
    request.options.mapped_by = Some("author".to_string());
    request.options.fetch = Some(FetchType::Lazy);
    let outcome = engine().add_relationship(source, &request, &types).unwrap();

    assert!(outcome.text.contains(
        "    @OneToMany(mappedBy = \"author\", fetch = FetchType.LAZY)\n    private Set<Book> books = new LinkedHashSet<>();"
    ));
    assert_eq!(
        outcome.added_imports,
        vec![
            "com.example.model.Book",
            "jakarta.persistence.FetchType",
            "jakarta.persistence.OneToMany",
            "java.util.LinkedHashSet",
            "java.util.Set",
        ]
    );
}

#[test]
fn test_cascading_list_with_orphan_removal() {
    let source = "package com.example.people;\n\npublic class Author {\n    private String name;\n}\n";
    let types = KnownTypes::new().with("Book", "com.example.model", TypeKind::Class);
    let mut request = RelationshipRequest::new(RelationshipKind::OneToMany, "Book", "com.example.model", "books");
    request.options.mapped_by = Some("author".to_string());
    request.options.orphan_removal = true;
    request.options.cascade = CascadeType::ALL.to_vec();
    request.options.collection = CollectionType::List;
    let outcome = engine().add_relationship(source, &request, &types).unwrap();

    assert!(outcome.text.contains(
        "    @OneToMany(mappedBy = \"author\", orphanRemoval = true, cascade = CascadeType.ALL)\n    private List<Book> books = new ArrayList<>();"
    ));
    assert_eq!(
        outcome.added_imports,
        vec![
            "com.example.model.Book",
            "jakarta.persistence.CascadeType",
            "jakarta.persistence.OneToMany",
            "java.util.ArrayList",
            "java.util.List",
        ]
    );
}

#[test]
fn test_relationship_target_shadowed_by_import_is_qualified() {
    let source = indoc! {"
        package com.example.model;

        import com.other.Author;

        public class Book {
            private String title;
        }
    "};
    let types = KnownTypes::new().with("Author", "com.example.people", TypeKind::Class);
    let request = RelationshipRequest::new(RelationshipKind::ManyToOne, "Author", "com.example.people", "author");
    let outcome = engine().add_relationship(source, &request, &types).unwrap();

    assert!(outcome.text.contains("import com.other.Author;\n"));
    assert!(outcome.text.contains("    @ManyToOne\n    private com.example.people.Author author;\n"));
    assert_eq!(outcome.added_imports, vec!["jakarta.persistence.ManyToOne"]);
    assert_eq!(
        outcome.warnings,
        vec![Warning::QualifiedReference("com.example.people.Author".to_string())]
    );

    let mut to_many = RelationshipRequest::new(RelationshipKind::ManyToMany, "Author", "", "authors");
    to_many.options.collection = CollectionType::List;
    let outcome = engine().add_relationship(source, &to_many, &types).unwrap();
    assert!(outcome
        .text
        .contains("    private List<com.example.people.Author> authors = new ArrayList<>();\n"));
    assert!(!outcome.added_imports.iter().any(|i| i.ends_with(".Author")));
}

#[test]
fn test_persistence_names_shadowed_by_imports_are_qualified() {
    let source = "package a;\n\nimport org.legacy.Id;\n\nclass Book {}\n";
    let mut request = AttributeRequest::new(AttributeKind::Identifier, "id", "Long");
    request.options.generation = Some(GenerationStrategy::Identity);
    let outcome = engine().add_attribute(source, &request, &NoTypes).unwrap();

    assert!(outcome.text.contains(
        "class Book {\n    @jakarta.persistence.Id\n    @GeneratedValue(strategy = GenerationType.IDENTITY)\n    private Long id;\n}\n"
    ));
    assert!(outcome.text.contains("import org.legacy.Id;\n"));
    assert_eq!(
        outcome.added_imports,
        vec!["jakarta.persistence.GeneratedValue", "jakarta.persistence.GenerationType"]
    );
    assert_eq!(outcome.warnings, vec![Warning::QualifiedReference("jakarta.persistence.Id".to_string())]);

    // Constant holders are spelled out the same way
    let source = "package a;\n\nimport com.acme.FetchType;\n\nclass Book {}\n";
    let types = KnownTypes::new().with("Author", "a", TypeKind::Class);
    let mut request = RelationshipRequest::new(RelationshipKind::ManyToOne, "Author", "", "author");
    request.options.fetch = Some(FetchType::Lazy);
    let outcome = engine().add_relationship(source, &request, &types).unwrap();
    assert!(outcome
        .text
        .contains("    @ManyToOne(fetch = jakarta.persistence.FetchType.LAZY)\n    private Author author;"));
    assert_eq!(outcome.added_imports, vec!["jakarta.persistence.ManyToOne"]);
    assert_eq!(
        outcome.warnings,
        vec![Warning::QualifiedReference("jakarta.persistence.FetchType".to_string())]
    );
}

#[test]
fn test_relationship_keeps_user_equals() {
    let source = indoc! {"
        package com.example.model;

        import jakarta.persistence.Id;

        public class Loan {
            @Id
            private Long id;

            @Override
            public boolean equals(Object o) {
                return o instanceof Loan;
            }
        }
    "};
    let user_equals = "    @Override\n    public boolean equals(Object o) {\n        return o instanceof Loan;\n    }\n";
    let types = KnownTypes::new().with("Member", "com.example.model", TypeKind::Class);
    let mut request = RelationshipRequest::new(RelationshipKind::ManyToOne, "Member", "", "member");
    request.generate_equals_hash_code = true;
    let outcome = engine().add_relationship(source, &request, &types).unwrap();

    assert!(outcome.text.contains("    private Long id;\n\n    @ManyToOne\n    private Member member;\n"));
    assert!(outcome.text.contains(user_equals));
    assert_eq!(outcome.text.matches("public boolean equals").count(), 1);
    assert!(outcome.text.contains("return Objects.hash(id);"));
    assert_eq!(outcome.warnings, vec![Warning::ConflictingUserMethod("equals".to_string())]);
    assert_eq!(outcome.added_imports, vec!["jakarta.persistence.ManyToOne", "java.util.Objects"]);
}

#[test]
fn test_required_many_to_one_with_join_column() {
    let source = "package com.example.model;\n\nclass Book {\n    private String title;\n}\n";
    let types = KnownTypes::new().with("Publisher", "com.example.model", TypeKind::Class);
    let mut request = RelationshipRequest::new(RelationshipKind::ManyToOne, "Publisher", "", "publisher");
    request.options.nullable = false;
    request.options.join_column = Some("publisher_id".to_string());
    let outcome = engine().add_relationship(source, &request, &types).unwrap();

    assert!(outcome.text.contains(
        "    @ManyToOne(optional = false)\n    @JoinColumn(name = \"publisher_id\", nullable = false)\n    @NotNull\n    private Publisher publisher;"
    ));
    // Same package: no import for the target itself
    assert!(!outcome.added_imports.iter().any(|i| i.ends_with(".Publisher")));
}

#[test]
fn test_relationship_to_enum_is_rejected() {
    let types = KnownTypes::new().with("Status", "com.example.model", TypeKind::Enum);
    let request = RelationshipRequest::new(RelationshipKind::ManyToOne, "Status", "", "status");
    let err = engine().add_relationship("class Book {}\n", &request, &types).unwrap_err();
    assert_eq!(err, EngineError::UnresolvedTargetType("Status".to_string()));
}

#[test]
fn test_enum_attribute() {
    let source = "package com.example.model;\n\nimport com.example.model.types.Status;\n\nclass Book {\n}\n";
    let types = KnownTypes::new().with("Status", "com.example.model.types", TypeKind::Enum);
    let mut request = AttributeRequest::new(AttributeKind::Enumerated, "status", "Status");
    request.options.enum_storage = EnumStorage::Ordinal;
    let outcome = engine().add_attribute(source, &request, &types).unwrap();

    assert!(outcome.text.contains("    @Enumerated(EnumType.ORDINAL)\n    private Status status;"));
    assert_eq!(outcome.added_imports, vec!["jakarta.persistence.EnumType", "jakarta.persistence.Enumerated"]);

    let unresolved = engine().add_attribute(source, &request, &NoTypes).unwrap();
    assert_eq!(unresolved.warnings, vec![Warning::UnresolvedEnumType("Status".to_string())]);
}

#[test]
fn test_annotate_type_lifecycle() {
    let engine = engine();
    let source = "package com.example.model;\n\npublic class Book {\n}\n";

    let entity = engine.annotate_type(source, &TypeAnnotationRequest::new("Entity"), &NoTypes).unwrap();
    assert_eq!(
        entity.text,
        "package com.example.model;\n\nimport jakarta.persistence.Entity;\n\n@Entity\npublic class Book {\n}\n"
    );

    let table = TypeAnnotationRequest::new("Table").with_argument("name", "\"books\"");
    let tabled = engine.annotate_type(&entity.text, &table, &NoTypes).unwrap();
    assert!(tabled.text.contains("@Entity\n@Table(name = \"books\")\npublic class Book"));
    assert!(tabled.text.contains("import jakarta.persistence.Entity;\nimport jakarta.persistence.Table;\n"));

    let again = engine.annotate_type(&tabled.text, &table, &NoTypes).unwrap();
    assert!(!again.changed);
    assert_eq!(again.warnings, vec![Warning::AnnotationAlreadyPresent("Table".to_string())]);

    let renamed = TypeAnnotationRequest::new("Table").with_argument("name", "\"volumes\"");
    let renamed = engine.annotate_type(&tabled.text, &renamed, &NoTypes).unwrap();
    assert!(renamed.text.contains("@Table(name = \"volumes\")"));
    assert!(!renamed.text.contains("\"books\""));
    assert!(renamed.added_imports.is_empty());
}

#[test]
fn test_annotate_type_without_package_or_imports() {
    let engine = engine();
    let entity = TypeAnnotationRequest::new("Entity");

    let bare = engine.annotate_type("class Book {}\n", &entity, &NoTypes).unwrap();
    assert_eq!(bare.text, "import jakarta.persistence.Entity;\n\n@Entity\nclass Book {}\n");
    assert_eq!(bare.added_imports, vec!["jakarta.persistence.Entity"]);

    let headed = engine.annotate_type("// header\nclass Book {}\n", &entity, &NoTypes).unwrap();
    assert_eq!(headed.text, "// header\nimport jakarta.persistence.Entity;\n\n@Entity\nclass Book {}\n");

    let again = engine.annotate_type(&headed.text, &entity, &NoTypes).unwrap();
    assert!(!again.changed);
}

#[test]
fn test_annotate_type_with_shadowed_name() {
    let source = "import org.legacy.Entity;\n\nclass Book {}\n";
    let outcome = engine()
        .annotate_type(source, &TypeAnnotationRequest::new("Entity"), &NoTypes)
        .unwrap();
    assert_eq!(outcome.text, "import org.legacy.Entity;\n\n@jakarta.persistence.Entity\nclass Book {}\n");
    assert!(outcome.added_imports.is_empty());
    assert_eq!(
        outcome.warnings,
        vec![Warning::QualifiedReference("jakarta.persistence.Entity".to_string())]
    );
}

#[test]
fn test_javax_namespace_and_custom_indent() {
    let config = EngineConfig {
        namespace: PersistenceNamespace::Javax,
        validation_annotations: false,
        indent: Some("\t".to_string()),
        ..EngineConfig::default()
    };
    let engine = Engine::new(config).unwrap();
    let mut request = AttributeRequest::new(AttributeKind::Basic, "title", "String");
    request.nullable = false;
    let outcome = engine.add_attribute("class Book {\n}\n", &request, &NoTypes).unwrap();

    assert_eq!(
        outcome.text,
        "import javax.persistence.Column;\n\nclass Book {\n\t@Column(nullable = false)\n\tprivate String title;\n}\n"
    );
}

#[test]
fn test_fatal_conditions_produce_no_text() {
    let engine = engine();
    let request = AttributeRequest::new(AttributeKind::Basic, "title", "String");

    let err = engine.add_attribute("package com.example;\n", &request, &NoTypes).unwrap_err();
    assert_eq!(err, EngineError::NotATypeDeclaration);

    let err = engine
        .add_attribute("interface Named {\n    String name();\n}\n", &request, &NoTypes)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedTypeKind { kind: TypeKind::Interface, .. }));

    let bad_name = AttributeRequest::new(AttributeKind::Basic, "class", "String");
    let err = engine.add_attribute("class Book {}\n", &bad_name, &NoTypes).unwrap_err();
    assert_eq!(err, EngineError::InvalidName("class".to_string()));
}

#[test]
fn test_parse_cache_is_reused() {
    let engine = engine();
    let source = "class Book {\n    private String title;\n}\n";
    engine.index(source, &NoTypes).unwrap();
    engine.index(source, &NoTypes).unwrap();

    let stats = engine.parse_cache().unwrap().stats();
    assert_eq!(stats.size, 1);
    assert_eq!(stats.hit_rate, Some(0.5));
}

#[test]
fn test_attribute_on_enum_opens_declaration_section() {
    let source = "public enum Status {\n    ACTIVE,\n    RETIRED\n}\n";
    let outcome = engine()
        .add_attribute(source, &AttributeRequest::new(AttributeKind::Basic, "label", "String"), &NoTypes)
        .unwrap();
    assert_eq!(
        outcome.text,
        "public enum Status {\n    ACTIVE,\n    RETIRED;\n\n    private String label;\n}\n"
    );
}

#[test]
fn test_enum_constant_comment_keeps_its_line() {
    let source = "public enum Status {\n    ACTIVE,\n    RETIRED // last\n}\n";
    let outcome = engine()
        .add_attribute(source, &AttributeRequest::new(AttributeKind::Basic, "label", "String"), &NoTypes)
        .unwrap();
    assert_eq!(
        outcome.text,
        "public enum Status {\n    ACTIVE,\n    RETIRED; // last\n\n    private String label;\n}\n"
    );
}
