use indoc::indoc;

use jpa_scaffold::{
    AttributeKind, AttributeRequest, Engine, EngineConfig, EngineError, KnownTypes, NoTypes,
    RelationshipKind, RelationshipRequest, TypeKind, Warning,
};

fn engine() -> Engine {
    Engine::new(EngineConfig::default()).expect("built-in queries compile")
}

#[test]
fn test_identifier_into_empty_class() {
    let outcome = engine()
        .add_attribute(
            "class Book {}\n",
            &AttributeRequest::new(AttributeKind::Identifier, "id", "Long"),
            &NoTypes,
        )
        .unwrap();

    assert_eq!(
        outcome.text,
        indoc! {"
            import jakarta.persistence.Id;

            class Book {
                @Id
                private Long id;
            }
        "}
    );
    assert_eq!(outcome.added_imports, vec!["jakarta.persistence.Id"]);
    assert!(outcome.warnings.is_empty());
    assert!(outcome.changed);
}

#[test]
fn test_duplicate_identifier_is_a_no_op() {
    let source = indoc! {"
        import jakarta.persistence.Id;

        class Book {
            @Id
            private Long id;
        }
    "};
    let outcome = engine()
        .add_attribute(source, &AttributeRequest::new(AttributeKind::Identifier, "id", "Long"), &NoTypes)
        .unwrap();

    assert_eq!(outcome.text, source);
    assert!(!outcome.changed);
    assert_eq!(outcome.edits_applied, 0);
    assert!(outcome.added_imports.is_empty());
    assert_eq!(outcome.warnings, vec![Warning::DuplicateAttributeName("id".to_string())]);
}

const BOOK: &str = indoc! {"
    package com.example.model;

    import jakarta.persistence.Entity;
    import jakarta.persistence.Id;

    @Entity
    public class Book {
        @Id
        private Long id;

        private String title;
    }
"};

fn author_relationship() -> RelationshipRequest {
    let mut request = RelationshipRequest::new(RelationshipKind::ManyToOne, "Author", "com.example.people", "author");
    request.generate_equals_hash_code = true;
    request
}

#[test]
fn test_many_to_one_with_equals_hash_code() {
    let types = KnownTypes::new().with("Author", "com.example.people", TypeKind::Class);
    let outcome = engine().add_relationship(BOOK, &author_relationship(), &types).unwrap();

    assert_eq!(
        outcome.text,
        indoc! {"
            package com.example.model;

            import com.example.people.Author;
            import jakarta.persistence.Entity;
            import jakarta.persistence.Id;
            import jakarta.persistence.ManyToOne;
            import java.util.Objects;

            @Entity
            public class Book {
                @Id
                private Long id;

                private String title;

                @ManyToOne
                private Author author;

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
    assert_eq!(
        outcome.added_imports,
        vec!["com.example.people.Author", "jakarta.persistence.ManyToOne", "java.util.Objects"]
    );
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_unresolved_relationship_target() {
    let err = engine()
        .add_relationship(BOOK, &author_relationship(), &NoTypes)
        .unwrap_err();
    assert_eq!(err, EngineError::UnresolvedTargetType("Author".to_string()));
}

#[test]
fn test_relationship_target_in_another_package() {
    let types = KnownTypes::new().with("Author", "com.example.legacy", TypeKind::Class);
    let err = engine()
        .add_relationship(BOOK, &author_relationship(), &types)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnresolvedTargetType(_)));
}

#[test]
fn test_user_equals_is_preserved() {
    let source = indoc! {"
        package com.example.model;

        import jakarta.persistence.Entity;
        import jakarta.persistence.Id;

        @Entity
        public class Book {
            @Id
            private Long id;

            @Override
            public boolean equals(Object o) {
                if (o == null) return false;
                return this == o;
            }
        }
    "};
    let outcome = engine().regenerate_equals_hash_code(source, &NoTypes).unwrap();

    assert_eq!(outcome.warnings, vec![Warning::ConflictingUserMethod("equals".to_string())]);
    assert_eq!(
        outcome.text,
        indoc! {"
            package com.example.model;

            import jakarta.persistence.Entity;
            import jakarta.persistence.Id;
            import java.util.Objects;

            @Entity
            public class Book {
                @Id
                private Long id;

                @Override
                public int hashCode() {
                    return Objects.hash(id);
                }

                @Override
                public boolean equals(Object o) {
                    if (o == null) return false;
                    return this == o;
                }
            }
        "}
    );
}
