/// This module provides a CSV item reader and writer implementation.
pub mod csv;

/// This module provides the item reader, processor and writer that connect the
/// product catalog to the batch steps.
pub mod catalog;
