pub mod inventory;
pub mod notifications;
pub mod payments;
pub mod preturns;
pub mod products;
pub mod purchases;
pub mod receiving;
pub mod sales;

use crate::db::DbPool;
use crate::entities::image::{self, ImageOwner};
use crate::errors::ServiceError;
use crate::storage::{self, SharedObjectStore};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use tracing::warn;

/// Attachment bytes handed in by the API layer.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Uploads attachments and returns the stored keys. Storage failures
/// are logged and the attachment skipped; they never fail the caller.
pub(crate) async fn upload_attachments(
    store: &SharedObjectStore,
    attachments: &[AttachmentUpload],
) -> Vec<String> {
    let mut keys = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        let key = storage::unique_key(&attachment.filename);
        match store.put(attachment.bytes.clone(), &key).await {
            Ok(stored) => keys.push(stored.key),
            Err(err) => {
                warn!(filename = %attachment.filename, error = %err, "attachment upload failed; skipping");
            }
        }
    }
    keys
}

/// Inserts image rows for the given owner.
pub(crate) async fn insert_image_rows<C: ConnectionTrait>(
    conn: &C,
    owner_kind: ImageOwner,
    owner_id: i64,
    keys: &[String],
) -> Result<(), ServiceError> {
    for key in keys {
        image::ActiveModel {
            owner_kind: Set(owner_kind),
            owner_id: Set(owner_id),
            path: Set(key.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(ServiceError::db_error)?;
    }
    Ok(())
}

/// Loads the stored keys of an owner's images.
pub(crate) async fn image_paths<C: ConnectionTrait>(
    conn: &C,
    owner_kind: ImageOwner,
    owner_id: i64,
) -> Result<Vec<String>, ServiceError> {
    let rows = image::Entity::find()
        .filter(image::Column::OwnerKind.eq(owner_kind))
        .filter(image::Column::OwnerId.eq(owner_id))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(rows.into_iter().map(|row| row.path).collect())
}

/// Deletes an owner's image rows, returning the stored keys so the
/// caller can clean up the objects after commit.
pub(crate) async fn delete_image_rows<C: ConnectionTrait>(
    conn: &C,
    owner_kind: ImageOwner,
    owner_id: i64,
) -> Result<Vec<String>, ServiceError> {
    let paths = image_paths(conn, owner_kind, owner_id).await?;
    image::Entity::delete_many()
        .filter(image::Column::OwnerKind.eq(owner_kind))
        .filter(image::Column::OwnerId.eq(owner_id))
        .exec(conn)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(paths)
}

/// Removes stored objects after their rows are gone. Best-effort.
pub(crate) async fn delete_objects(store: &SharedObjectStore, keys: &[String]) {
    for key in keys {
        storage::delete_best_effort(store.as_ref(), key).await;
    }
}

/// Shared handle bundle passed to every service constructor.
#[derive(Clone)]
pub struct ServiceContext {
    pub db: std::sync::Arc<DbPool>,
    pub storage: SharedObjectStore,
    pub stock_policy: crate::config::StockPolicy,
}
