//! Error policy around the end of a writer unit's lifecycle.
//!
//! `finish` and `close` fail differently: a failed flush is logged
//! and the unit still closes, while a failed close aborts the load. Keep the
//! two paths separate.

use factload_fact_writer::FactWriter;
use factload_result::{Error, Result};
use factload_types::WriterUnitId;

/// Flush `writer`. Failures are logged and swallowed; returns whether the
/// flush succeeded.
pub(crate) fn finish_writer(table_name: &str, unit: WriterUnitId, writer: &mut dyn FactWriter) -> bool {
    match writer.finish() {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(
                "[WRITER_STAGE] failed for table {table_name} while finishing data handler of {unit}: {err}"
            );
            false
        }
    }
}

/// Release `writer`. Failures are fatal.
pub(crate) fn close_writer(unit: WriterUnitId, writer: &mut dyn FactWriter) -> Result<()> {
    writer.close().map_err(|err| {
        tracing::error!("[WRITER_STAGE] closing data handler of {unit} failed: {err}");
        Error::writer_close(unit, err)
    })
}

/// Best-effort discard of a writer whose unit already failed, so no partial
/// fragment survives. The first failure is what the caller reports, so abort
/// errors are only logged.
pub(crate) fn abandon_writer(unit: WriterUnitId, writer: &mut dyn FactWriter) {
    if writer.state().is_closed() {
        return;
    }
    if let Err(err) = writer.abort() {
        tracing::warn!("[WRITER_STAGE] discarding aborted data handler of {unit} failed: {err}");
    }
}
