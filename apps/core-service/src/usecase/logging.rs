//! # ログ出力デコレータ
//!
//! 任意の [`FamilyUseCase`] をラップし、操作ごとに tracing のスパンを張る。
//!
//! - 成功した変更操作: [`log_business_event!`] でビジネスイベントを出力
//! - 失敗: `error.category` / `error.kind` 付きで出力（永続化エラーは error、それ以外は warn）
//!
//! ラップされる側はログ出力を一切行わない。

use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use familia_shared::{
    event_log::{error as error_fields, event},
    log_business_event,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::{AddParentInput, CreateFamilyInput, DivorceInput, DivorceOutput, FamilyUseCase};
use crate::{
    dto::{FamilyDto, ImportReport, PersonDto},
    error::{CoreError, CoreErrorKind},
};

/// ログ出力を付与する FamilyUseCase のデコレータ
pub struct LoggingFamilyUseCase<U> {
    inner: U,
}

impl<U: FamilyUseCase> LoggingFamilyUseCase<U> {
    pub fn new(inner: U) -> Self {
        Self { inner }
    }
}

/// スパン内で操作を実行し、結果をログに残す
async fn observe<T>(
    span: tracing::Span,
    call: impl Future<Output = Result<T, CoreError>> + Send,
    on_success: impl FnOnce(&T) + Send,
) -> Result<T, CoreError> {
    async move {
        let result = call.await;
        match &result {
            Ok(value) => on_success(value),
            Err(e) => record_failure(e),
        }
        result
    }
    .instrument(span)
    .await
}

fn record_failure(error: &CoreError) {
    let (category, kind) = error_context(error);
    if error.is_database() {
        tracing::error!(
            error.category = category,
            error.kind = kind,
            use_case = error.use_case(),
            "{}",
            error
        );
    } else {
        tracing::warn!(
            error.category = category,
            error.kind = kind,
            use_case = error.use_case(),
            "{}",
            error
        );
    }
}

fn error_context(error: &CoreError) -> (&'static str, &'static str) {
    use error_fields::{category, kind};

    match error.kind() {
        CoreErrorKind::Validation { .. } => (category::DOMAIN, kind::VALIDATION),
        CoreErrorKind::Domain { .. } => (category::DOMAIN, kind::BUSINESS_RULE),
        CoreErrorKind::NotFound { .. } => (category::DOMAIN, kind::NOT_FOUND),
        CoreErrorKind::Database(_) => (category::INFRASTRUCTURE, kind::DATABASE),
        CoreErrorKind::Cancelled => (category::CANCELLATION, kind::CANCELLED),
    }
}

fn family_event(action: &'static str) -> impl FnOnce(&FamilyDto) + Send {
    move |family| {
        log_business_event!(
            event.category = event::category::FAMILY,
            event.action = action,
            event.entity_type = event::entity_type::FAMILY,
            event.entity_id = %family.id,
            family.status = %family.status,
            event.result = event::result::SUCCESS,
            "家族を更新"
        );
    }
}

#[async_trait]
impl<U: FamilyUseCase> FamilyUseCase for LoggingFamilyUseCase<U> {
    async fn create_family(
        &self,
        cancel: &CancellationToken,
        input: CreateFamilyInput,
    ) -> Result<FamilyDto, CoreError> {
        let span = tracing::info_span!("create_family", family.id = ?input.id);
        observe(
            span,
            self.inner.create_family(cancel, input),
            family_event(event::action::FAMILY_CREATED),
        )
        .await
    }

    async fn get_family(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<FamilyDto, CoreError> {
        let span = tracing::debug_span!("get_family", family.id = %id);
        observe(span, self.inner.get_family(cancel, id), |_| {}).await
    }

    async fn get_all_families(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<FamilyDto>, CoreError> {
        let span = tracing::debug_span!("get_all_families");
        observe(span, self.inner.get_all_families(cancel), |families| {
            tracing::debug!(count = families.len(), "家族一覧を取得");
        })
        .await
    }

    async fn add_parent(
        &self,
        cancel: &CancellationToken,
        input: AddParentInput,
    ) -> Result<FamilyDto, CoreError> {
        let span = tracing::info_span!(
            "add_parent",
            family.id = %input.family_id,
            parent.id = %input.parent.id
        );
        observe(
            span,
            self.inner.add_parent(cancel, input),
            family_event(event::action::PARENT_ADDED),
        )
        .await
    }

    async fn change_status(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        status: &str,
    ) -> Result<FamilyDto, CoreError> {
        let span = tracing::info_span!("change_status", family.id = %family_id, %status);
        observe(
            span,
            self.inner.change_status(cancel, family_id, status),
            family_event(event::action::STATUS_CHANGED),
        )
        .await
    }

    async fn add_child(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        child: PersonDto,
    ) -> Result<FamilyDto, CoreError> {
        let span = tracing::info_span!("add_child", family.id = %family_id, child.id = %child.id);
        observe(
            span,
            self.inner.add_child(cancel, family_id, child),
            family_event(event::action::CHILD_ADDED),
        )
        .await
    }

    async fn remove_child(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        child_id: &str,
    ) -> Result<FamilyDto, CoreError> {
        let span = tracing::info_span!("remove_child", family.id = %family_id, child.id = %child_id);
        observe(
            span,
            self.inner.remove_child(cancel, family_id, child_id),
            family_event(event::action::CHILD_REMOVED),
        )
        .await
    }

    async fn mark_parent_deceased(
        &self,
        cancel: &CancellationToken,
        family_id: &str,
        parent_id: &str,
        death_date: DateTime<Utc>,
    ) -> Result<FamilyDto, CoreError> {
        let span = tracing::info_span!(
            "mark_parent_deceased",
            family.id = %family_id,
            parent.id = %parent_id
        );
        observe(
            span,
            self.inner
                .mark_parent_deceased(cancel, family_id, parent_id, death_date),
            family_event(event::action::PARENT_DECEASED),
        )
        .await
    }

    async fn divorce(
        &self,
        cancel: &CancellationToken,
        input: DivorceInput,
    ) -> Result<DivorceOutput, CoreError> {
        let span = tracing::info_span!("divorce", family.id = %input.family_id);
        observe(span, self.inner.divorce(cancel, input), |output| {
            log_business_event!(
                event.category = event::category::FAMILY,
                event.action = event::action::FAMILY_DIVORCED,
                event.entity_type = event::entity_type::FAMILY,
                event.entity_id = %output.original.id,
                event.related_entity_id = %output.new_family.id,
                event.result = event::result::SUCCESS,
                "離婚により家族を分割"
            );
        })
        .await
    }

    async fn find_families_by_parent(
        &self,
        cancel: &CancellationToken,
        parent_id: &str,
    ) -> Result<Vec<FamilyDto>, CoreError> {
        let span = tracing::debug_span!("find_families_by_parent", parent.id = %parent_id);
        observe(
            span,
            self.inner.find_families_by_parent(cancel, parent_id),
            |_| {},
        )
        .await
    }

    async fn find_family_by_child(
        &self,
        cancel: &CancellationToken,
        child_id: &str,
    ) -> Result<FamilyDto, CoreError> {
        let span = tracing::debug_span!("find_family_by_child", child.id = %child_id);
        observe(span, self.inner.find_family_by_child(cancel, child_id), |_| {}).await
    }

    async fn import_families(
        &self,
        cancel: &CancellationToken,
        families: Vec<FamilyDto>,
    ) -> Result<ImportReport, CoreError> {
        let span = tracing::info_span!("import_families", total = families.len());
        observe(span, self.inner.import_families(cancel, families), |report| {
            for failure in &report.failed {
                tracing::warn!(
                    index = failure.index,
                    family.id = %failure.family_id,
                    error.kind = %failure.kind,
                    "インポートできなかったレコード: {}",
                    failure.message
                );
            }
            let result = if report.failed.is_empty() && !report.cancelled {
                event::result::SUCCESS
            } else {
                event::result::FAILURE
            };
            log_business_event!(
                event.category = event::category::IMPORT,
                event.action = event::action::FAMILIES_IMPORTED,
                event.entity_type = event::entity_type::FAMILY,
                imported = report.imported.len(),
                failed = report.failed.len(),
                cancelled = report.cancelled,
                event.result = result,
                "家族の一括インポート"
            );
        })
        .await
    }
}
