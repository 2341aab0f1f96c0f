//! PostgreSQL implementation of [`CrudDao`].

use crate::dao::{Changes, CrudDao, FetchOptions, Filters, OrderBy};
use crate::guard::guarded;
use crate::model::{column_values, ensure_registered, related_key, Model};
use crate::session::Session;
use crate::statements::{self, Statement};
use crate::value::Value;
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use tessera_core::{Page, PageRequest, TesseraError, TesseraResult};
use tracing::debug;

/// Generic DAO bound to model type `M`.
///
/// Zero-sized; create one wherever needed.
pub struct PgDao<M> {
    _model: PhantomData<fn() -> M>,
}

impl<M> PgDao<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _model: PhantomData,
        }
    }
}

impl<M> Default for PgDao<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for PgDao<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for PgDao<M> {}

impl<M: Model> fmt::Debug for PgDao<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgDao").field("model", &M::meta().name).finish()
    }
}

impl<M: Model> PgDao<M> {
    /// Inserts a model and returns it as persisted.
    pub async fn insert_model(&self, session: &mut Session, model: M) -> TesseraResult<M> {
        guarded("insert_model", M::meta().name, async {
            let mut rows = self.persist(session, vec![model]).await?;
            rows.pop()
                .ok_or_else(|| TesseraError::internal("insert returned no row"))
        })
        .await
    }

    /// Inserts models in one statement and returns them in input order.
    pub async fn insert_models(&self, session: &mut Session, models: Vec<M>) -> TesseraResult<Vec<M>> {
        guarded("insert_models", M::meta().name, self.persist(session, models)).await
    }

    /// Fetches a model by primary key, relationships loaded.
    ///
    /// Not logged on failure; meant as a building block for
    /// [`Model::load_related`] inside an operation that is.
    pub async fn get(&self, session: &mut Session, key: Value) -> TesseraResult<Option<M>> {
        let meta = M::meta();
        let filters = Filters::new().eq(meta.primary_key()?.name, key);
        let statement = statements::select(meta, &filters, None, Some(1), None)?;
        let mut rows = self.fetch_rows(session, statement).await?;
        Self::hydrate(session, &mut rows).await?;
        Ok(rows.pop())
    }

    /// Fetches the model `owner` points at through its `relation`.
    ///
    /// `None` when the foreign key is unset. Like [`get`](Self::get), not
    /// logged on failure.
    pub async fn get_related<O: Model>(
        &self,
        session: &mut Session,
        owner: &O,
        relation: &str,
    ) -> TesseraResult<Option<M>> {
        let key = related_key(owner, relation, M::meta())?;
        if key.is_null() {
            return Ok(None);
        }
        self.get(session, key).await
    }

    async fn persist(&self, session: &mut Session, models: Vec<M>) -> TesseraResult<Vec<M>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let meta = M::meta();
        let values = models
            .iter()
            .map(column_values)
            .collect::<TesseraResult<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(values.len());
        for batch in values.chunks(statements::insert_batch_size(meta)) {
            let statement = statements::insert(meta, batch)?;
            rows.extend(self.fetch_rows(session, statement).await?);
        }
        Self::hydrate(session, &mut rows).await?;
        Ok(rows)
    }

    async fn fetch_rows(&self, session: &mut Session, mut statement: Statement) -> TesseraResult<Vec<M>> {
        debug!("{} [session {}]: {}", M::meta().name, session.id(), statement.sql());
        let rows = statement
            .build_query_as::<M>()
            .fetch_all(session.connection())
            .await?;
        Ok(rows)
    }

    async fn hydrate(session: &mut Session, rows: &mut [M]) -> TesseraResult<()> {
        for row in rows.iter_mut() {
            row.load_related(session).await?;
        }
        Ok(())
    }

    async fn select(
        &self,
        session: &mut Session,
        filters: &Filters,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> TesseraResult<Vec<M>> {
        let statement = statements::select(M::meta(), filters, order_by, limit, offset)?;
        let mut rows = self.fetch_rows(session, statement).await?;
        Self::hydrate(session, &mut rows).await?;
        Ok(rows)
    }

    async fn count_rows(&self, session: &mut Session, filters: &Filters) -> TesseraResult<u64> {
        let mut statement = statements::count(M::meta(), filters)?;
        debug!("{} [session {}]: {}", M::meta().name, session.id(), statement.sql());
        let total: i64 = statement
            .build_query_scalar::<i64>()
            .fetch_one(session.connection())
            .await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    fn not_found(key: &Value) -> TesseraError {
        TesseraError::not_found(M::meta().name, key)
    }
}

fn to_dtos<M: Model>(models: &[M]) -> TesseraResult<Vec<M::Dto>> {
    models.iter().map(Model::to_dto).collect()
}

#[async_trait]
impl<M: Model> CrudDao<M> for PgDao<M> {
    async fn insert(&self, session: &mut Session, dto: &M::Dto) -> TesseraResult<M::Dto> {
        guarded("insert", M::meta().name, async {
            ensure_registered::<M>()?;
            let model = M::from_dto(dto)?;
            let rows = self.persist(session, vec![model]).await?;
            rows.first()
                .ok_or_else(|| TesseraError::internal("insert returned no row"))?
                .to_dto()
        })
        .await
    }

    async fn insert_many(&self, session: &mut Session, dtos: &[M::Dto]) -> TesseraResult<Vec<M::Dto>> {
        guarded("insert_many", M::meta().name, async {
            ensure_registered::<M>()?;
            if dtos.is_empty() {
                return Ok(Vec::new());
            }
            let models = dtos.iter().map(M::from_dto).collect::<TesseraResult<Vec<_>>>()?;
            let rows = self.persist(session, models).await?;
            to_dtos(&rows)
        })
        .await
    }

    async fn fetch_one(&self, session: &mut Session, filters: Filters) -> TesseraResult<Option<M::Dto>> {
        guarded("fetch_one", M::meta().name, async {
            ensure_registered::<M>()?;
            let statement = statements::select(M::meta(), &filters, None, Some(2), None)?;
            let mut rows = self.fetch_rows(session, statement).await?;
            if rows.len() > 1 {
                return Err(TesseraError::ambiguous(
                    M::meta().name,
                    format!("more than one row matches {:?}", filters),
                ));
            }
            Self::hydrate(session, &mut rows).await?;
            rows.first().map(Model::to_dto).transpose()
        })
        .await
    }

    async fn fetch_all(
        &self,
        session: &mut Session,
        options: FetchOptions,
        filters: Filters,
    ) -> TesseraResult<Vec<M::Dto>> {
        guarded("fetch_all", M::meta().name, async {
            ensure_registered::<M>()?;
            let rows = self
                .select(session, &filters, options.order_by.as_ref(), options.limit, options.offset)
                .await?;
            to_dtos(&rows)
        })
        .await
    }

    async fn fetch_first(
        &self,
        session: &mut Session,
        order_by: Option<OrderBy>,
        filters: Filters,
    ) -> TesseraResult<Option<M::Dto>> {
        guarded("fetch_first", M::meta().name, async {
            ensure_registered::<M>()?;
            let rows = self
                .select(session, &filters, order_by.as_ref(), Some(1), None)
                .await?;
            rows.first().map(Model::to_dto).transpose()
        })
        .await
    }

    async fn update(&self, session: &mut Session, key: Value, changes: Changes) -> TesseraResult<M::Dto> {
        guarded("update", M::meta().name, async {
            ensure_registered::<M>()?;
            let model = if changes.is_empty() {
                self.get(session, key.clone()).await?
            } else {
                let statement = statements::update(M::meta(), &key, &changes)?;
                let mut rows = self.fetch_rows(session, statement).await?;
                Self::hydrate(session, &mut rows).await?;
                rows.pop()
            };
            model.ok_or_else(|| Self::not_found(&key))?.to_dto()
        })
        .await
    }

    async fn delete(&self, session: &mut Session, key: Value) -> TesseraResult<M::Dto> {
        guarded("delete", M::meta().name, async {
            ensure_registered::<M>()?;
            let statement = statements::delete(M::meta(), &key)?;
            let mut rows = self.fetch_rows(session, statement).await?;
            Self::hydrate(session, &mut rows).await?;
            rows.pop().ok_or_else(|| Self::not_found(&key))?.to_dto()
        })
        .await
    }

    async fn count(&self, session: &mut Session, filters: Filters) -> TesseraResult<u64> {
        guarded("count", M::meta().name, self.count_rows(session, &filters)).await
    }

    async fn fetch_page(
        &self,
        session: &mut Session,
        page: PageRequest,
        order_by: Option<OrderBy>,
        filters: Filters,
    ) -> TesseraResult<Page<M::Dto>> {
        guarded("fetch_page", M::meta().name, async {
            ensure_registered::<M>()?;
            let total = self.count_rows(session, &filters).await?;
            let order_by = match order_by {
                Some(order_by) => Some(order_by),
                None => M::meta().primary_key().ok().map(|key| OrderBy::asc(key.name)),
            };
            let rows = self
                .select(
                    session,
                    &filters,
                    order_by.as_ref(),
                    Some(page.limit()),
                    Some(page.offset()),
                )
                .await?;
            Ok(Page::new(to_dtos(&rows)?, page, total))
        })
        .await
    }
}
