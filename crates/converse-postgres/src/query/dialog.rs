use std::future::Future;

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Dialog, NewDialog, UpdateDialog};
use crate::types::{
    DialogFilter, DialogSortBy, DialogSortField, OffsetPage, OffsetPagination, RecordStatus,
};
use crate::{PgConnection, PgError, PgResult, schema};

/// Dialog configuration storage.
pub trait DialogRepository {
    fn create_dialog(&mut self, dialog: NewDialog)
    -> impl Future<Output = PgResult<Dialog>> + Send;

    /// Finds a valid dialog owned by `tenant_id`.
    fn find_tenant_dialog(
        &mut self,
        tenant_id: Uuid,
        dialog_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Dialog>>> + Send;

    fn update_dialog(
        &mut self,
        dialog_id: Uuid,
        changes: UpdateDialog,
    ) -> impl Future<Output = PgResult<Dialog>> + Send;

    /// Marks the tenant's dialogs as deleted and returns how many changed.
    fn soft_delete_dialogs(
        &mut self,
        tenant_id: Uuid,
        dialog_ids: &[Uuid],
    ) -> impl Future<Output = PgResult<usize>> + Send;

    fn list_tenant_dialogs(
        &mut self,
        tenant_id: Uuid,
        filter: DialogFilter,
        sort: DialogSortBy,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<OffsetPage<Dialog>>> + Send;

    /// Returns `true` if a valid dialog of the tenant other than `excluding`
    /// already uses `name`.
    fn dialog_name_taken(
        &mut self,
        tenant_id: Uuid,
        name: &str,
        excluding: Option<Uuid>,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

fn filtered_dialogs<'a>(
    tenant_id: Uuid,
    filter: &'a DialogFilter,
) -> schema::dialogs::BoxedQuery<'a, Pg> {
    use schema::dialogs::{self, dsl};

    let mut query = dialogs::table
        .filter(dsl::tenant_id.eq(tenant_id))
        .filter(dsl::status.eq(RecordStatus::Valid))
        .into_boxed();

    if let Some(id) = filter.id {
        query = query.filter(dsl::id.eq(id));
    }
    if let Some(pattern) = filter.name_pattern() {
        query = query.filter(dsl::name.ilike(pattern));
    }

    query
}

impl DialogRepository for PgConnection {
    async fn create_dialog(&mut self, dialog: NewDialog) -> PgResult<Dialog> {
        use schema::dialogs;

        let dialog = diesel::insert_into(dialogs::table)
            .values(&dialog)
            .returning(Dialog::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(dialog)
    }

    async fn find_tenant_dialog(
        &mut self,
        tenant_id: Uuid,
        dialog_id: Uuid,
    ) -> PgResult<Option<Dialog>> {
        use schema::dialogs::{self, dsl};

        let dialog = dialogs::table
            .filter(dsl::id.eq(dialog_id))
            .filter(dsl::tenant_id.eq(tenant_id))
            .filter(dsl::status.eq(RecordStatus::Valid))
            .select(Dialog::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(dialog)
    }

    async fn update_dialog(&mut self, dialog_id: Uuid, changes: UpdateDialog) -> PgResult<Dialog> {
        use schema::dialogs::{self, dsl};

        let dialog = diesel::update(dialogs::table.filter(dsl::id.eq(dialog_id)))
            .set(&changes)
            .returning(Dialog::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(dialog)
    }

    async fn soft_delete_dialogs(&mut self, tenant_id: Uuid, dialog_ids: &[Uuid]) -> PgResult<usize> {
        use schema::dialogs::{self, dsl};

        if dialog_ids.is_empty() {
            return Ok(0);
        }

        let affected = diesel::update(
            dialogs::table
                .filter(dsl::tenant_id.eq(tenant_id))
                .filter(dsl::id.eq_any(dialog_ids))
                .filter(dsl::status.eq(RecordStatus::Valid)),
        )
        .set(dsl::status.eq(RecordStatus::Deleted))
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(affected)
    }

    async fn list_tenant_dialogs(
        &mut self,
        tenant_id: Uuid,
        filter: DialogFilter,
        sort: DialogSortBy,
        pagination: OffsetPagination,
    ) -> PgResult<OffsetPage<Dialog>> {
        use schema::dialogs::dsl;

        let query = filtered_dialogs(tenant_id, &filter);
        let query = match (sort.field, sort.is_desc()) {
            (DialogSortField::CreatedAt, true) => query.order(dsl::created_at.desc()),
            (DialogSortField::CreatedAt, false) => query.order(dsl::created_at.asc()),
            (DialogSortField::UpdatedAt, true) => query.order(dsl::updated_at.desc()),
            (DialogSortField::UpdatedAt, false) => query.order(dsl::updated_at.asc()),
        };

        let items = query
            .then_order_by(dsl::id.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Dialog::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        let total = if pagination.include_count {
            let total: i64 = filtered_dialogs(tenant_id, &filter)
                .count()
                .get_result(self)
                .await
                .map_err(PgError::from)?;
            Some(total)
        } else {
            None
        };

        Ok(OffsetPage::new(items, total))
    }

    async fn dialog_name_taken(
        &mut self,
        tenant_id: Uuid,
        name: &str,
        excluding: Option<Uuid>,
    ) -> PgResult<bool> {
        use schema::dialogs::{self, dsl};

        let mut query = dialogs::table
            .select(dsl::id)
            .filter(dsl::tenant_id.eq(tenant_id))
            .filter(dsl::name.eq(name))
            .filter(dsl::status.eq(RecordStatus::Valid))
            .into_boxed();

        if let Some(dialog_id) = excluding {
            query = query.filter(dsl::id.ne(dialog_id));
        }

        let existing: Option<Uuid> = query
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(existing.is_some())
    }
}
