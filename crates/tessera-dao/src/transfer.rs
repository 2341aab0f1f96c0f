//! Transfer objects: transport-facing records with a static field table.

use crate::record::{Record, Slot};
use crate::value::ValueKind;
use tessera_core::{TesseraError, TesseraResult};

/// A declared DTO field.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Declared type of a DTO field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Value(ValueKind),
    Nested(NestedDto),
}

/// Reference to the field table of a nested DTO type.
#[derive(Debug, Clone, Copy)]
pub struct NestedDto {
    pub name: &'static str,
    pub fields: fn() -> &'static [Field],
}

impl Field {
    /// A scalar field.
    #[must_use]
    pub const fn value(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind: FieldKind::Value(kind),
        }
    }

    /// A field holding another transfer object.
    #[must_use]
    pub const fn nested<D: TransferObject>(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Nested(NestedDto {
                name: D::NAME,
                fields: D::fields,
            }),
        }
    }

    #[must_use]
    pub const fn is_nested(&self) -> bool {
        matches!(self.kind, FieldKind::Nested(_))
    }
}

/// Transport-facing record with an ordered, introspectable field table.
///
/// Implementations are plain structs. `fields()` declares names and types in
/// order; `to_record`/`from_record` move values in and out by name.
///
/// ```ignore
/// impl TransferObject for AuthorDto {
///     const NAME: &'static str = "AuthorDto";
///
///     fn fields() -> &'static [Field] {
///         const FIELDS: &[Field] = &[
///             Field::value("id", ValueKind::Int),
///             Field::value("name", ValueKind::Text),
///         ];
///         FIELDS
///     }
///
///     fn from_record(mut record: Record) -> TesseraResult<Self> {
///         Ok(Self {
///             id: record.take_value("id")?,
///             name: record.take_value("name")?,
///         })
///     }
///
///     fn to_record(&self) -> Record {
///         Record::new()
///             .with_value("id", self.id)
///             .with_value("name", self.name.as_str())
///     }
/// }
/// ```
pub trait TransferObject: Sized + Send + Sync + 'static {
    /// Type name used in error messages.
    const NAME: &'static str;

    /// False only for [`Unbound`].
    const REGISTERED: bool = true;

    /// Declared fields in order.
    fn fields() -> &'static [Field];

    /// Constructs the DTO; missing required fields are mapping errors.
    fn from_record(record: Record) -> TesseraResult<Self>;

    /// Deconstructs the DTO into a record.
    fn to_record(&self) -> Record;

    /// Declared field names in order.
    #[must_use]
    fn field_names() -> Vec<&'static str> {
        Self::fields().iter().map(|f| f.name).collect()
    }
}

/// Marker DTO for models that have no transfer object registered.
///
/// It has no values, so DTO conversion of such models fails with a
/// configuration error instead of producing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unbound {}

impl TransferObject for Unbound {
    const NAME: &'static str = "Unbound";
    const REGISTERED: bool = false;

    fn fields() -> &'static [Field] {
        &[]
    }

    fn from_record(_record: Record) -> TesseraResult<Self> {
        Err(TesseraError::configuration("no DTO registered"))
    }

    fn to_record(&self) -> Record {
        match *self {}
    }
}

/// Keeps only the declared fields of `record`, in declaration order,
/// recursing into nested records and checking scalar kinds.
pub(crate) fn project(mut record: Record, fields: &'static [Field]) -> TesseraResult<Record> {
    let mut out = Record::with_capacity(fields.len());
    for field in fields {
        let Some(slot) = record.take(field.name) else {
            continue;
        };
        match (field.kind, slot) {
            (FieldKind::Value(kind), Slot::Value(value)) => {
                if !value.conforms_to(kind) {
                    return Err(kind_mismatch(field.name, kind, &value));
                }
                out.insert_value(field.name, value);
            }
            (FieldKind::Nested(nested), Slot::Nested(inner)) => {
                let inner = inner
                    .map(|inner| project(inner, (nested.fields)()))
                    .transpose()?;
                out.insert_nested(field.name, inner);
            }
            (FieldKind::Value(_), Slot::Nested(_)) => {
                return Err(TesseraError::mapping(format!(
                    "field '{}' is declared as a value but holds a nested object",
                    field.name
                )));
            }
            (FieldKind::Nested(nested), Slot::Value(_)) => {
                return Err(TesseraError::mapping(format!(
                    "field '{}' is declared as {} but holds a value",
                    field.name, nested.name
                )));
            }
        }
    }
    Ok(out)
}

pub(crate) fn kind_mismatch(field: &str, kind: ValueKind, value: &crate::Value) -> TesseraError {
    let found = value.kind().map_or_else(|| "null".to_string(), |k| k.to_string());
    TesseraError::mapping(format!(
        "field '{}' is declared as {} but holds {}",
        field, kind, found
    ))
}
