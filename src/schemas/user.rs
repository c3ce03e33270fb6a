use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::{HistoryEntry, User};
use crate::db::types::UserRole;

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryEntryResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) score: i32,
    pub(crate) passed: bool,
    pub(crate) submitted_at: String,
    pub(crate) time_taken_seconds: i64,
    pub(crate) certificate_generated: bool,
    pub(crate) certificate_url: Option<String>,
}

impl HistoryEntryResponse {
    pub(crate) fn from_db(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id,
            exam_id: entry.exam_id,
            score: entry.score,
            passed: entry.passed,
            submitted_at: format_primitive(entry.submitted_at),
            time_taken_seconds: entry.time_taken_seconds,
            certificate_generated: entry.certificate_generated,
            certificate_url: entry.certificate_url,
        }
    }
}
