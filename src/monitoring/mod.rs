/*!
 * Monitoring Module
 * Tracing setup and spans
 */

pub mod tracer;

pub use tracer::{init_tracing, span_process_create, span_scheduler};
