//! Deferred window positioning.
//!
//! Moving windows one by one makes every intermediate state visible. A
//! [`DeferredPositions`] collects every move of a layout pass and hands them to
//! [`NativeApi::set_window_positions`] in a single call when committed or dropped.

use super::{NativeApi, NativeError, WindowPosition, WindowSize};

/// RAII batch of window moves.
///
/// Minimized windows are issued before the others so that a window being restored
/// never flashes at its old position.
pub struct DeferredPositions<'a> {
    native: &'a dyn NativeApi,
    positions: Vec<WindowPosition>,
    minimized: Vec<WindowPosition>,
    committed: bool,
}

impl<'a> DeferredPositions<'a> {
    #[must_use]
    pub fn new(native: &'a dyn NativeApi) -> Self {
        Self { native, positions: Vec::new(), minimized: Vec::new(), committed: false }
    }

    /// Queues a window move. Nothing reaches the OS until [`Self::commit`].
    pub fn defer(&mut self, position: WindowPosition) {
        if position.size == WindowSize::Minimized {
            self.minimized.push(position);
        } else {
            self.positions.push(position);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.positions.len() + self.minimized.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Issues every queued move in one native call.
    ///
    /// Windows whose border offset can no longer be read have been destroyed in the
    /// meantime; they are dropped from the batch.
    ///
    /// # Errors
    ///
    /// Returns the native error if the batch could not be applied.
    pub fn commit(mut self) -> Result<usize, NativeError> { self.flush() }

    fn flush(&mut self) -> Result<usize, NativeError> {
        if self.committed {
            return Ok(0);
        }
        self.committed = true;

        if self.is_empty() {
            tracing::trace!("no window positions to set");
            return Ok(0);
        }

        let native = self.native;
        let batch: Vec<WindowPosition> = self
            .minimized
            .drain(..)
            .chain(self.positions.drain(..))
            .filter_map(|position| {
                let Some(offset) = native.window_offset(position.handle) else {
                    tracing::debug!(window = %position.handle, "window vanished before positioning");
                    return None;
                };
                Some(WindowPosition { rect: position.rect.offset_by(&offset), ..position })
            })
            .collect();

        if batch.is_empty() {
            return Ok(0);
        }

        tracing::debug!(count = batch.len(), "setting window positions");
        native.set_window_positions(&batch)?;
        Ok(batch.len())
    }
}

impl Drop for DeferredPositions<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::warn!(error = %err, "failed to apply deferred window positions");
        }
    }
}
