mod admin;
mod auth;
mod catalog;
mod media;

use crate::admin::AdminError;
use crate::api::response::ApiError;

pub use admin::{
    admin_list_content, admin_purge, create_category, create_content, delete_category,
    delete_content, health, update_category, update_content,
};
pub use auth::{me, my_purchases, sign_in, sign_out, sign_up};
pub use catalog::{list_categories, section_content, view_content};
pub use media::serve_object;

/// Map an AdminError to an ApiError
fn admin_error(e: AdminError) -> ApiError {
    match e {
        AdminError::NotFound(_) => ApiError::not_found(e.to_string()),
        AdminError::Invalid(msg) => ApiError::bad_request(msg),
        // Bucket-missing carries its remediation in the message
        AdminError::BucketMissing(_) | AdminError::Storage(_) | AdminError::Database(_) => {
            ApiError::internal(e.to_string())
        }
    }
}
