//! Persistence models and the model ⇄ DTO mapping engine.

use crate::record::{Record, Slot};
use crate::session::Session;
use crate::transfer::{kind_mismatch, project, FieldKind, TransferObject};
use crate::value::Value;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use tessera_core::{TesseraError, TesseraResult};

/// A table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub primary_key: bool,
    /// Filled by the database when inserted as `NULL` (serials, defaults).
    pub generated: bool,
}

impl Column {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            primary_key: false,
            generated: false,
        }
    }

    #[must_use]
    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    #[must_use]
    pub const fn generated(self) -> Self {
        Self {
            generated: true,
            ..self
        }
    }
}

/// A named relationship to another model, joined through a local
/// foreign-key column that holds the target's primary key.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub name: &'static str,
    pub foreign_key: &'static str,
    pub target: fn() -> &'static ModelMeta,
}

impl Relation {
    #[must_use]
    pub const fn new(
        name: &'static str,
        foreign_key: &'static str,
        target: fn() -> &'static ModelMeta,
    ) -> Self {
        Self {
            name,
            foreign_key,
            target,
        }
    }

    /// Relationship to model `M`.
    #[must_use]
    pub const fn to<M: Model>(name: &'static str, foreign_key: &'static str) -> Self {
        Self::new(name, foreign_key, M::meta)
    }
}

/// Static table description of a model.
#[derive(Debug, Clone, Copy)]
pub struct ModelMeta {
    pub name: &'static str,
    pub table: &'static str,
    pub columns: &'static [Column],
    pub relations: &'static [Relation],
}

impl ModelMeta {
    /// The single primary-key column.
    ///
    /// Tables with no or with a composite primary key cannot be addressed
    /// by key.
    pub fn primary_key(&self) -> TesseraResult<&'static Column> {
        let mut keys = self.columns.iter().filter(|c| c.primary_key);
        match (keys.next(), keys.next()) {
            (Some(column), None) => Ok(column),
            (None, _) => Err(TesseraError::configuration(format!(
                "{} has no primary key column",
                self.name
            ))),
            (Some(_), Some(_)) => Err(TesseraError::configuration(format!(
                "{} has a composite primary key, only single-column keys are supported",
                self.name
            ))),
        }
    }

    /// Resolves a column by name.
    pub fn column(&self, name: &str) -> TesseraResult<&'static Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| {
                TesseraError::validation(format!("{} has no column '{}'", self.name, name))
            })
    }

    /// Resolves a relationship by name.
    pub fn relation(&self, name: &str) -> TesseraResult<&'static Relation> {
        self.relations.iter().find(|r| r.name == name).ok_or_else(|| {
            TesseraError::configuration(format!("{} has no relationship '{}'", self.name, name))
        })
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> {
        self.columns.iter().map(|c| c.name)
    }
}

/// What a model exposes under a field name.
pub enum Attribute<'a> {
    Value(Value),
    Related(Option<&'a dyn Related>),
}

/// Type-erased view of a related model, used while converting to DTOs.
pub trait Related {
    /// Name of the related model's DTO type.
    fn dto_name(&self) -> &'static str;

    /// The related model as a DTO-shaped record.
    fn dto_record(&self) -> TesseraResult<Record>;
}

impl<M: Model> Related for M {
    fn dto_name(&self) -> &'static str {
        M::Dto::NAME
    }

    fn dto_record(&self) -> TesseraResult<Record> {
        ensure_registered::<M>()?;
        dto_record(self)
    }
}

/// A database-backed entity.
///
/// Rows are decoded through `FromRow`; the field-level mapping to and from
/// the associated DTO goes through [`attribute`](Model::attribute) and
/// [`from_record`](Model::from_record).
#[async_trait]
pub trait Model: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    /// The associated transfer object, or [`Unbound`](crate::Unbound).
    type Dto: TransferObject;

    fn meta() -> &'static ModelMeta;

    /// Looks up a column value or relationship by name.
    fn attribute(&self, name: &str) -> Option<Attribute<'_>>;

    /// Builds a detached model from a DTO-shaped record.
    fn from_record(record: Record) -> TesseraResult<Self>;

    /// Populates relationships after the row was read.
    async fn load_related(&mut self, _session: &mut Session) -> TesseraResult<()> {
        Ok(())
    }

    /// Converts the model into its DTO.
    fn to_dto(&self) -> TesseraResult<Self::Dto> {
        ensure_registered::<Self>()?;
        Self::Dto::from_record(dto_record(self)?)
    }

    /// Builds a new, unattached model from a DTO.
    fn from_dto(dto: &Self::Dto) -> TesseraResult<Self> {
        ensure_registered::<Self>()?;
        let mut record = project(dto.to_record(), Self::Dto::fields())?;
        link_foreign_keys(Self::meta(), &mut record)?;
        Self::from_record(record)
    }
}

pub(crate) fn ensure_registered<M: Model>() -> TesseraResult<()> {
    if M::Dto::REGISTERED {
        Ok(())
    } else {
        Err(TesseraError::configuration(format!(
            "{} has no DTO registered",
            M::meta().name
        )))
    }
}

fn dto_record<M: Model>(model: &M) -> TesseraResult<Record> {
    let fields = M::Dto::fields();
    let mut record = Record::with_capacity(fields.len());

    for field in fields {
        let Some(attribute) = model.attribute(field.name) else {
            continue;
        };
        match (field.kind, attribute) {
            (FieldKind::Value(kind), Attribute::Value(value)) => {
                if !value.conforms_to(kind) {
                    return Err(kind_mismatch(field.name, kind, &value));
                }
                record.insert_value(field.name, value);
            }
            (FieldKind::Nested(nested), Attribute::Related(related)) => {
                let inner = match related {
                    None => None,
                    Some(related) if related.dto_name() != nested.name => {
                        return Err(TesseraError::mapping(format!(
                            "field '{}' of {} expects {}, related model maps to {}",
                            field.name,
                            M::meta().name,
                            nested.name,
                            related.dto_name()
                        )));
                    }
                    Some(related) => Some(related.dto_record()?),
                };
                record.insert_nested(field.name, inner);
            }
            (FieldKind::Value(_), Attribute::Related(_)) => {
                return Err(TesseraError::mapping(format!(
                    "field '{}' of {} is a value but the model exposes a relationship",
                    field.name,
                    M::meta().name
                )));
            }
            (FieldKind::Nested(nested), Attribute::Value(_)) => {
                return Err(TesseraError::mapping(format!(
                    "field '{}' of {} expects {} but the model exposes a value",
                    field.name,
                    M::meta().name,
                    nested.name
                )));
            }
        }
    }

    Ok(record)
}

/// Sets each relationship's foreign key from the nested record's primary
/// key. Relationships absent from the record are left alone.
pub(crate) fn link_foreign_keys(meta: &ModelMeta, record: &mut Record) -> TesseraResult<()> {
    for relation in meta.relations {
        let key = match record.get(relation.name) {
            Some(Slot::Nested(Some(related))) => {
                let target = (relation.target)().primary_key()?;
                match related.get(target.name) {
                    Some(Slot::Value(value)) => value.clone(),
                    _ => Value::Null,
                }
            }
            Some(Slot::Nested(None)) => Value::Null,
            _ => continue,
        };
        record.insert_value(relation.foreign_key, key);
    }
    Ok(())
}

/// The foreign-key value `owner` holds for `relation`, which must point
/// at `target`.
pub(crate) fn related_key<O: Model>(
    owner: &O,
    relation: &str,
    target: &ModelMeta,
) -> TesseraResult<Value> {
    let meta = O::meta();
    let relation = meta.relation(relation)?;
    let expected = (relation.target)();
    if expected.name != target.name {
        return Err(TesseraError::configuration(format!(
            "{}.{} relates to {}, not {}",
            meta.name, relation.name, expected.name, target.name
        )));
    }
    match owner.attribute(relation.foreign_key) {
        Some(Attribute::Value(value)) => Ok(value),
        _ => Err(TesseraError::mapping(format!(
            "{} exposes no value for foreign key '{}'",
            meta.name, relation.foreign_key
        ))),
    }
}

/// Column values of a model in declaration order.
pub(crate) fn column_values<M: Model>(model: &M) -> TesseraResult<Vec<Value>> {
    let meta = M::meta();
    meta.columns
        .iter()
        .map(|column| match model.attribute(column.name) {
            Some(Attribute::Value(value)) => Ok(value),
            _ => Err(TesseraError::mapping(format!(
                "{} exposes no value for column '{}'",
                meta.name, column.name
            ))),
        })
        .collect()
}
