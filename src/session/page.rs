//! Cursor pagination.
//!
//! A page pulls at most `MAX_PAGE_SIZE` documents from a live cursor,
//! renders each one under the active output format, and reports how many
//! were shown. The cursor is never closed here; whatever remains is
//! available to the next `it` request.

use crate::config::{JsonOptions, OutputFormat};
use crate::driver::CursorHandle;
use crate::error::Result;
use crate::formatter;
use crate::output::OutputSink;

/// Display settings captured for one pagination pass.
#[derive(Debug, Clone, Copy)]
pub struct PageSettings {
    pub max_page_size: i64,
    pub output_format: OutputFormat,
    pub json_options: JsonOptions,
    pub json_indent: Option<usize>,
}

/// What a pagination pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageReport {
    /// Documents rendered in this pass.
    pub rendered: usize,

    /// Whether the cursor was observed to be exhausted.
    pub exhausted: bool,
}

/// Render one page from `cursor` into `out`.
///
/// Prints each fetched document, then a `(Returned N documents)` line,
/// then `(Cursor exhausted)` when nothing is left server-side. A
/// non-positive page size renders zero documents but still reports.
pub async fn paginate(
    cursor: &CursorHandle,
    settings: PageSettings,
    out: &mut dyn OutputSink,
) -> Result<PageReport> {
    let mut stream = cursor.stream().await;

    let mut count: i64 = 0;
    while count < settings.max_page_size {
        let Some(doc) = stream.try_next().await? else {
            break;
        };
        count += 1;

        let rendered = formatter::render_document(
            &doc,
            settings.output_format,
            settings.json_options,
            settings.json_indent,
        )?;
        out.print(&rendered);
    }

    out.print(&format!("(Returned {count} documents)"));

    let exhausted = !stream.alive();
    if exhausted {
        out.print("(Cursor exhausted)");
    }

    Ok(PageReport {
        rendered: count as usize,
        exhausted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DocumentStream;
    use crate::output::MemorySink;
    use async_trait::async_trait;
    use bson::{doc, Document};

    /// In-memory stand-in for a server cursor.
    struct VecStream {
        docs: Vec<Document>,
        pos: usize,
        done: bool,
    }

    impl VecStream {
        fn new(docs: Vec<Document>) -> Self {
            Self {
                docs,
                pos: 0,
                done: false,
            }
        }
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
        CursorHandle::new(Box::new(VecStream::new(docs)))
    }

    fn settings(max: i64) -> PageSettings {
        PageSettings {
            max_page_size: max,
            output_format: OutputFormat::Repr,
            json_options: JsonOptions::default(),
            json_indent: None,
        }
    }

    #[test]
    fn test_page_renders_min_of_remaining_and_max() {
        tokio_test::block_on(async {
            let cursor = cursor_of(5);
            let mut out = MemorySink::new();
            let report = paginate(&cursor, settings(3), &mut out).await.unwrap();
            assert_eq!(report.rendered, 3);
            assert!(!report.exhausted);
            assert!(out.contents().contains("(Returned 3 documents)"));
            assert!(!out.contents().contains("(Cursor exhausted)"));
        });
    }

    #[test]
    fn test_short_final_page_reports_exhaustion() {
        tokio_test::block_on(async {
            let cursor = cursor_of(2);
            let mut out = MemorySink::new();
            let report = paginate(&cursor, settings(5), &mut out).await.unwrap();
            assert_eq!(report.rendered, 2);
            assert!(report.exhausted);
            assert!(out.contents().contains("(Returned 2 documents)"));
            assert!(out.contents().contains("(Cursor exhausted)"));
        });
    }

    #[test]
    fn test_exact_fit_page_leaves_cursor_alive() {
        tokio_test::block_on(async {
            let cursor = cursor_of(3);
            let mut out = MemorySink::new();
            let report = paginate(&cursor, settings(3), &mut out).await.unwrap();
            assert_eq!(report.rendered, 3);
            // End of stream has not been observed yet.
            assert!(!report.exhausted);

            // The next page drains the stream and says so.
            let mut out = MemorySink::new();
            let report = paginate(&cursor, settings(3), &mut out).await.unwrap();
            assert_eq!(report.rendered, 0);
            assert!(report.exhausted);
            assert!(out.contents().contains("(Returned 0 documents)"));
            assert!(out.contents().contains("(Cursor exhausted)"));
        });
    }

    #[test]
    fn test_nonpositive_page_size_renders_nothing() {
        tokio_test::block_on(async {
            let cursor = cursor_of(4);
            let mut out = MemorySink::new();
            let report = paginate(&cursor, settings(0), &mut out).await.unwrap();
            assert_eq!(report.rendered, 0);
            assert!(!report.exhausted);
            assert!(out.contents().contains("(Returned 0 documents)"));
        });
    }

    #[test]
    fn test_json_format_page() {
        tokio_test::block_on(async {
            let cursor = cursor_of(2);
            let mut out = MemorySink::new();
            let mut s = settings(2);
            s.output_format = OutputFormat::Json;
            paginate(&cursor, s, &mut out).await.unwrap();
            assert!(out.contents().contains(r#"{"i":0}"#));
            assert!(out.contents().contains(r#"{"i":1}"#));
        });
    }
}
