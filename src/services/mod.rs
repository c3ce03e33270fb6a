pub(crate) mod certificates;
pub(crate) mod evaluation;
pub(crate) mod grading;
pub(crate) mod notifications;
pub(crate) mod storage;
