use base64ct::{Base64, Encoding};
use tracing::{error, info, instrument, warn};

use super::error::{StylingError, ValidationError};
use super::prompt::strip_data_url_prefix;
use super::types::{StylingRequest, StylingResult};
use crate::auth::dto::User;
use crate::session::state::Action;
use crate::state::AppState;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Form checks that must pass before the model is called.
pub fn validate_request(req: &StylingRequest) -> Result<(), ValidationError> {
    let payload = strip_data_url_prefix(&req.image);
    if payload.is_empty() {
        return Err(ValidationError::MissingImage);
    }
    let bytes = Base64::decode_vec(payload).map_err(|_| ValidationError::InvalidImage)?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge { bytes: bytes.len() });
    }
    if req.age.trim().is_empty() {
        return Err(ValidationError::MissingAge);
    }
    Ok(())
}

/// Validates, calls the model once, and records the result in the user's history.
#[instrument(skip(st, user, req), fields(user_id = %user.id))]
pub async fn generate_and_record(
    st: &AppState,
    user: &User,
    mut req: StylingRequest,
) -> Result<StylingResult, StylingError> {
    req.image = req.image.trim().to_string();
    if let Err(e) = validate_request(&req) {
        warn!(error = %e, "styling request rejected");
        return Err(e.into());
    }

    let result = match st.stylist.generate(&req).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "error calling styling model");
            return Err(e.into());
        }
    };

    st.store.append_history(user.id, &result).await?;
    st.dispatch(Action::SetResult(result.clone())).await;

    info!(result_id = %result.id, "styling result recorded");
    Ok(result)
}
