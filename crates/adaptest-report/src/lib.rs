//! adaptest-report: Session report rendering.

pub mod html;

pub use html::{format_elapsed, generate_html, write_html_report};
