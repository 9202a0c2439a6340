pub(crate) mod selection;
pub(crate) mod report;
