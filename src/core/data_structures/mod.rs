/*!
 * Data Structures
 *
 * Specialized data structures for kernel operations:
 * - Inline strings for stack-allocated process names and error messages
 */

mod inline_string;

pub use inline_string::InlineString;
