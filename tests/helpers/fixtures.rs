//! Shared snapshots used across the migration tests.

use schemaplan::catalog::{
    Attr, Check, Column, ColumnDefault, ForeignKey, Index, Object, Realm, ReferenceAction,
    Schema, Table, Type,
};

pub fn users() -> Table {
    Table::new("users")
        .with_column(Column::of("id", Type::integer()))
        .with_primary_key(Index::new("users_pkey").on_columns(["id"]))
}

pub fn pets() -> Table {
    Table::new("pets")
        .with_columns([
            Column::of("id", Type::integer()),
            Column::of("owner_id", Type::integer()),
        ])
        .with_primary_key(Index::new("pets_pkey").on_columns(["id"]))
        .with_foreign_key(ForeignKey::new("pets_owner_fk", ["owner_id"], "users", ["id"]))
}

pub fn public(tables: impl IntoIterator<Item = Table>) -> Realm {
    Realm::new().with_schema(Schema::new("public").with_tables(tables))
}

/// A small blog: users, posts and comments with a mood enum and a few indexes.
pub fn blog() -> Realm {
    let mood = Type::Enum {
        schema: None,
        name: "mood".into(),
        values: vec!["happy".into(), "sad".into()],
    };

    let users = users()
        .with_column(Column::of("email", Type::varchar(255)))
        .with_column(Column::nullable("mood", mood))
        .with_index(Index::unique("users_email_key").on_columns(["email"]))
        .with_attr(Attr::Comment("registered accounts".into()));

    let posts = Table::new("posts")
        .with_columns([
            Column::of("id", Type::integer()),
            Column::of("author_id", Type::integer()),
            Column::of("title", Type::text()),
            Column::of("views", Type::bigint()).with_default(ColumnDefault::Literal("0".into())),
        ])
        .with_primary_key(Index::new("posts_pkey").on_columns(["id"]))
        .with_index(Index::new("posts_author_idx").on_columns(["author_id"]))
        .with_foreign_key(
            ForeignKey::new("posts_author_fk", ["author_id"], "users", ["id"])
                .on_delete(ReferenceAction::Cascade),
        )
        .with_check(Check::new("posts_views_check", "views >= 0"));

    let comments = Table::new("comments")
        .with_columns([
            Column::of("id", Type::integer()),
            Column::of("post_id", Type::integer()),
            Column::nullable("parent_id", Type::integer()),
            Column::of("body", Type::text()),
        ])
        .with_primary_key(Index::new("comments_pkey").on_columns(["id"]))
        .with_foreign_key(ForeignKey::new("comments_post_fk", ["post_id"], "posts", ["id"]))
        .with_foreign_key(ForeignKey::new(
            "comments_parent_fk",
            ["parent_id"],
            "comments",
            ["id"],
        ));

    Realm::new().with_schema(
        Schema::new("public")
            .with_object(Object::enum_type("mood", ["happy", "sad"]))
            .with_tables([users, posts, comments]),
    )
}

/// Two tables referencing each other.
pub fn mutual(a: &str, b: &str) -> Realm {
    let table = |name: &str, other: &str| {
        Table::new(name)
            .with_columns([
                Column::of("id", Type::integer()),
                Column::nullable("other_id", Type::integer()),
            ])
            .with_primary_key(Index::new(format!("{name}_pkey")).on_columns(["id"]))
            .with_foreign_key(ForeignKey::new(
                format!("{name}_other_fk"),
                ["other_id"],
                other,
                ["id"],
            ))
    };
    public([table(a, b), table(b, a)])
}

/// A realm holding only an empty `public` schema.
pub fn empty() -> Realm {
    Realm::new().with_schema(Schema::new("public"))
}
