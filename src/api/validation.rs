use validator::Validate;

use crate::api::errors::ApiError;

/// Runs the derive-generated checks on a request payload and folds the
/// failures into one 400 message.
pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|errors| {
        let detail = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("invalid value for {field}"),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        ApiError::BadRequest(detail)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "name too short"))]
        name: String,
    }

    #[test]
    fn invalid_payload_reports_message() {
        let err = validate_payload(&Sample { name: "ab".to_string() });
        assert!(matches!(err, Err(ApiError::BadRequest(detail)) if detail == "name too short"));
    }

    #[test]
    fn valid_payload_passes() {
        assert!(validate_payload(&Sample { name: "abc".to_string() }).is_ok());
    }
}
