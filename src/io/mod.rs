pub mod output;
pub mod tree_view;
pub mod writers;

pub use output::{create_file_writer, create_writer, save_report_in_dataset, OutputFormat, OutputWriter};
pub use tree_view::render_tree;
