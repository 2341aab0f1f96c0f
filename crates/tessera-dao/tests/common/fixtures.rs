//! Fixture models and DTOs: authors and their books.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tessera_core::TesseraResult;
use tessera_dao::{
    Attribute, Column, Field, Model, ModelMeta, PgDao, Record, Related, Relation, Session,
    TransferObject, Unbound, Value, ValueKind,
};
use uuid::Uuid;

pub const SCHEMA: &str = r"
CREATE TABLE authors (
    id          BIGSERIAL PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT UNIQUE,
    external_id UUID NOT NULL
);

CREATE TABLE books (
    id         BIGSERIAL PRIMARY KEY,
    title      TEXT NOT NULL,
    pages      INTEGER NOT NULL,
    published  BOOLEAN NOT NULL DEFAULT FALSE,
    rating     DOUBLE PRECISION,
    tags       JSONB,
    author_id  BIGINT REFERENCES authors (id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE audit_entries (
    id      BIGSERIAL PRIMARY KEY,
    message TEXT NOT NULL
);
";

// ----------------------------------------------------------------------------
// Author
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub external_id: Uuid,
}

impl AuthorDto {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            email: Some(email.to_string()),
            external_id: Uuid::new_v4(),
        }
    }
}

impl TransferObject for AuthorDto {
    const NAME: &'static str = "AuthorDto";

    fn fields() -> &'static [Field] {
        const FIELDS: &[Field] = &[
            Field::value("id", ValueKind::Int),
            Field::value("name", ValueKind::Text),
            Field::value("email", ValueKind::Text),
            Field::value("external_id", ValueKind::Uuid),
        ];
        FIELDS
    }

    fn from_record(mut record: Record) -> TesseraResult<Self> {
        Ok(Self {
            id: record.take_value("id")?,
            name: record.take_value("name")?,
            email: record.take_value("email")?,
            external_id: record.take_value("external_id")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with_value("id", self.id)
            .with_value("name", self.name.as_str())
            .with_value("email", self.email.clone())
            .with_value("external_id", self.external_id)
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Author {
    pub id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub external_id: Uuid,
}

static AUTHOR_META: ModelMeta = ModelMeta {
    name: "Author",
    table: "authors",
    columns: &[
        Column::new("id").primary_key().generated(),
        Column::new("name"),
        Column::new("email"),
        Column::new("external_id"),
    ],
    relations: &[],
};

impl Model for Author {
    type Dto = AuthorDto;

    fn meta() -> &'static ModelMeta {
        &AUTHOR_META
    }

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        let value = match name {
            "id" => Value::from(self.id),
            "name" => Value::from(self.name.as_str()),
            "email" => Value::from(self.email.clone()),
            "external_id" => Value::from(self.external_id),
            _ => return None,
        };
        Some(Attribute::Value(value))
    }

    fn from_record(mut record: Record) -> TesseraResult<Self> {
        Ok(Self {
            id: record.take_value_or_default("id")?,
            name: record.take_value("name")?,
            email: record.take_value_or_default("email")?,
            external_id: record.take_value("external_id")?,
        })
    }
}

// ----------------------------------------------------------------------------
// Book
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub id: Option<i64>,
    pub title: String,
    pub pages: i32,
    pub published: bool,
    pub rating: Option<f64>,
    pub tags: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub author: Option<AuthorDto>,
}

impl BookDto {
    pub fn new(title: &str, pages: i32, author: Option<AuthorDto>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            pages,
            published: false,
            rating: None,
            tags: None,
            created_at: None,
            author,
        }
    }
}

impl TransferObject for BookDto {
    const NAME: &'static str = "BookDto";

    fn fields() -> &'static [Field] {
        const FIELDS: &[Field] = &[
            Field::value("id", ValueKind::Int),
            Field::value("title", ValueKind::Text),
            Field::value("pages", ValueKind::Int),
            Field::value("published", ValueKind::Bool),
            Field::value("rating", ValueKind::Float),
            Field::value("tags", ValueKind::Json),
            Field::value("created_at", ValueKind::Timestamp),
            Field::nested::<AuthorDto>("author"),
        ];
        FIELDS
    }

    fn from_record(mut record: Record) -> TesseraResult<Self> {
        Ok(Self {
            id: record.take_value("id")?,
            title: record.take_value("title")?,
            pages: record.take_value("pages")?,
            published: record.take_value("published")?,
            rating: record.take_value("rating")?,
            tags: record.take_value("tags")?,
            created_at: record.take_value("created_at")?,
            author: record.take_nested("author")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with_value("id", self.id)
            .with_value("title", self.title.as_str())
            .with_value("pages", self.pages)
            .with_value("published", self.published)
            .with_value("rating", self.rating)
            .with_value("tags", self.tags.clone())
            .with_value("created_at", self.created_at)
            .with_nested("author", self.author.as_ref().map(AuthorDto::to_record))
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Book {
    pub id: Option<i64>,
    pub title: String,
    pub pages: i32,
    pub published: bool,
    pub rating: Option<f64>,
    pub tags: Option<serde_json::Value>,
    pub author_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub author: Option<Author>,
}

static BOOK_META: ModelMeta = ModelMeta {
    name: "Book",
    table: "books",
    columns: &[
        Column::new("id").primary_key().generated(),
        Column::new("title"),
        Column::new("pages"),
        Column::new("published"),
        Column::new("rating"),
        Column::new("tags"),
        Column::new("author_id"),
        Column::new("created_at").generated(),
    ],
    relations: &[Relation::to::<Author>("author", "author_id")],
};

#[async_trait]
impl Model for Book {
    type Dto = BookDto;

    fn meta() -> &'static ModelMeta {
        &BOOK_META
    }

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        let value = match name {
            "id" => Value::from(self.id),
            "title" => Value::from(self.title.as_str()),
            "pages" => Value::from(self.pages),
            "published" => Value::from(self.published),
            "rating" => Value::from(self.rating),
            "tags" => Value::from(self.tags.clone()),
            "author_id" => Value::from(self.author_id),
            "created_at" => Value::from(self.created_at),
            "author" => {
                return Some(Attribute::Related(
                    self.author.as_ref().map(|a| a as &dyn Related),
                ))
            }
            _ => return None,
        };
        Some(Attribute::Value(value))
    }

    fn from_record(mut record: Record) -> TesseraResult<Self> {
        let author: Option<Author> = record.take_related("author")?;
        Ok(Self {
            id: record.take_value_or_default("id")?,
            title: record.take_value("title")?,
            pages: record.take_value("pages")?,
            published: record.take_value_or_default("published")?,
            rating: record.take_value_or_default("rating")?,
            tags: record.take_value_or_default("tags")?,
            author_id: record.take_value_or_default("author_id")?,
            created_at: record.take_value_or_default("created_at")?,
            author,
        })
    }

    async fn load_related(&mut self, session: &mut Session) -> TesseraResult<()> {
        self.author = PgDao::<Author>::new()
            .get_related(session, &*self, "author")
            .await?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// AuditEntry: persisted without a DTO
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AuditEntry {
    pub id: Option<i64>,
    pub message: String,
}

static AUDIT_META: ModelMeta = ModelMeta {
    name: "AuditEntry",
    table: "audit_entries",
    columns: &[
        Column::new("id").primary_key().generated(),
        Column::new("message"),
    ],
    relations: &[],
};

impl Model for AuditEntry {
    type Dto = Unbound;

    fn meta() -> &'static ModelMeta {
        &AUDIT_META
    }

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        match name {
            "id" => Some(Attribute::Value(Value::from(self.id))),
            "message" => Some(Attribute::Value(Value::from(self.message.as_str()))),
            _ => None,
        }
    }

    fn from_record(mut record: Record) -> TesseraResult<Self> {
        Ok(Self {
            id: record.take_value_or_default("id")?,
            message: record.take_value("message")?,
        })
    }
}
