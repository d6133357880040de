//! Result classification and rendering.
//!
//! Every evaluated value passes through [`handle_result`], which decides
//! whether it is a cursor, a write acknowledgement, or an opaque value,
//! renders it accordingly and maintains the well-known result bindings
//! (`_`, `it`, `res`).

use crate::error::Result;
use crate::formatter;
use crate::output::OutputSink;
use crate::session::page::{self, PageSettings};
use crate::session::{SessionState, Value};

/// Render one evaluated value and update the result bindings.
///
/// The unit sentinel is ignored entirely. Cursors are paginated (or, with
/// `DISPLAY_RESULTS` off, shown as a placeholder) and bound to `it`; write
/// acknowledgements render their summary and are bound to `res`; anything
/// else goes through the generic renderer. `_` always ends up holding the
/// value itself.
///
/// Rendering errors propagate to the caller's error path; bindings made
/// before the failure are left in place.
pub async fn handle_result(
    state: &mut SessionState,
    value: Value,
    out: &mut dyn OutputSink,
) -> Result<()> {
    if value.is_unit() {
        return Ok(());
    }

    // Clear the last-result slot so rendering cannot observe its own
    // prior output if it recurses into evaluation.
    state.set("_", Value::Unit);

    match &value {
        Value::Cursor(cursor) => {
            if state.display_results() {
                let settings = PageSettings {
                    max_page_size: state.max_page_size(),
                    output_format: state.output_format(),
                    json_options: state.json_options(),
                    json_indent: state.json_indent(),
                };
                page::paginate(cursor, settings, out).await?;
            } else {
                let rendered = formatter::render_value(
                    &value,
                    state.output_format(),
                    state.json_options(),
                    state.json_indent(),
                )?;
                out.print(&rendered);
            }
            state.set("it", value.clone());
        }
        Value::WriteAck(ack) => {
            state.set("res", value.clone());
            let rendered = formatter::render_document(
                &ack.summary(),
                state.output_format(),
                state.json_options(),
                state.json_indent(),
            )?;
            out.print(&rendered);
        }
        _ => {
            let rendered = formatter::render_value(
                &value,
                state.output_format(),
                state.json_options(),
                state.json_indent(),
            )?;
            out.print(&rendered);
        }
    }

    state.set("_", value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayDefaults;
    use crate::driver::{CursorHandle, DocumentStream, WriteAck};
    use crate::output::MemorySink;
    use async_trait::async_trait;
    use bson::{doc, Bson, Document};

    struct VecStream {
        docs: Vec<Document>,
        pos: usize,
        done: bool,
    }

    #[async_trait]
    impl DocumentStream for VecStream {
        async fn try_next(&mut self) -> Result<Option<Document>> {
            if self.pos < self.docs.len() {
                let doc = self.docs[self.pos].clone();
                self.pos += 1;
                Ok(Some(doc))
            } else {
                self.done = true;
                Ok(None)
            }
        }

        fn alive(&self) -> bool {
            !self.done
        }
    }

    fn cursor_of(n: usize) -> CursorHandle {
        let docs = (0..n).map(|i| doc! { "i": i as i32 }).collect();
        CursorHandle::new(Box::new(VecStream {
            docs,
            pos: 0,
            done: false,
        }))
    }

    fn state() -> SessionState {
        SessionState::new(DisplayDefaults::default())
    }

    #[test]
    fn test_unit_touches_nothing() {
        tokio_test::block_on(async {
            let mut state = state();
            let mut out = MemorySink::new();
            handle_result(&mut state, Value::Unit, &mut out).await.unwrap();
            assert!(out.contents().is_empty());
            assert!(state.get("_").is_none());
        });
    }

    #[test]
    fn test_cursor_binds_it_and_last_result() {
        tokio_test::block_on(async {
            let mut state = state();
            let mut out = MemorySink::new();
            handle_result(&mut state, Value::Cursor(cursor_of(2)), &mut out)
                .await
                .unwrap();
            assert!(out.contents().contains("(Returned 2 documents)"));
            assert!(matches!(state.get("it"), Some(Value::Cursor(_))));
            assert!(matches!(state.get("_"), Some(Value::Cursor(_))));
        });
    }

    #[test]
    fn test_cursor_with_display_off_prints_placeholder() {
        tokio_test::block_on(async {
            let mut state = state();
            state.set("DISPLAY_RESULTS", Value::Bool(false));
            let mut out = MemorySink::new();
            handle_result(&mut state, Value::Cursor(cursor_of(3)), &mut out)
                .await
                .unwrap();
            assert!(!out.contents().contains("Returned"));
            assert!(out.contents().contains("Cursor"));
            // it is still bound for manual iteration.
            assert!(matches!(state.get("it"), Some(Value::Cursor(_))));
        });
    }

    #[test]
    fn test_write_ack_binds_res_and_renders_summary() {
        tokio_test::block_on(async {
            let mut state = state();
            let mut out = MemorySink::new();
            let ack = WriteAck::InsertOne {
                acknowledged: true,
                inserted_id: Bson::Int32(9),
            };
            handle_result(&mut state, Value::WriteAck(ack), &mut out)
                .await
                .unwrap();
            assert!(out.contents().contains("acknowledged: true"));
            assert!(out.contents().contains("inserted_id: 9"));
            assert!(matches!(state.get("res"), Some(Value::WriteAck(_))));
            assert!(matches!(state.get("_"), Some(Value::WriteAck(_))));
        });
    }

    #[test]
    fn test_other_value_renders_generically() {
        tokio_test::block_on(async {
            let mut state = state();
            let mut out = MemorySink::new();
            handle_result(&mut state, Value::Document(doc! { "a": 1 }), &mut out)
                .await
                .unwrap();
            assert!(out.contents().contains("a: 1"));
            assert!(matches!(state.get("_"), Some(Value::Document(_))));
            assert!(state.get("it").is_none());
            assert!(state.get("res").is_none());
        });
    }

    #[test]
    fn test_shared_cursor_pages_continue_across_displays() {
        tokio_test::block_on(async {
            let mut state = state();
            state.set("MAX_PAGE_SIZE", Value::Int(2));
            let mut out = MemorySink::new();
            handle_result(&mut state, Value::Cursor(cursor_of(3)), &mut out)
                .await
                .unwrap();
            assert!(out.contents().contains("(Returned 2 documents)"));

            // Re-displaying `it` fetches the rest of the stream.
            let it = state.get("it").unwrap();
            let mut out = MemorySink::new();
            handle_result(&mut state, it, &mut out).await.unwrap();
            assert!(out.contents().contains("(Returned 1 documents)"));
            assert!(out.contents().contains("(Cursor exhausted)"));
        });
    }
}
